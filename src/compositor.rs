use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageError, ImageReader, Rgb, RgbaImage};
use imageproc::drawing::Blend;
use tracing::*;

use crate::drawing::{with_opacity, Drawable, GridLines, Ink, LabelOverlay, Watermark};
use crate::{CompositorConfig, GridError, GridLayout, LabelPosition, RenderSettings, TextPolarity};

/// A fully decoded bitmap. Never modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    /// Decodes an encoded image (PNG, JPEG, ...) from memory, upright.
    ///
    /// An EXIF orientation tag is applied, so the pixels are the way a viewer
    /// shows them.
    pub fn decode(bytes: &[u8]) -> Result<Self, GridError> {
        let decode_error = |e: ImageError| GridError::Decode(e.to_string());
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_decoder()
            .map_err(decode_error)?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut image = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
        if orientation != Orientation::NoTransforms {
            debug!("Applying EXIF orientation {:?}", orientation);
            image.apply_orientation(orientation);
        }
        Self::try_from(image)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl TryFrom<RgbaImage> for DecodedImage {
    type Error = GridError;

    fn try_from(pixels: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            error!(
                "Invalid image dimensions: width={}, height={}",
                width, height
            );
            return Err(GridError::InvalidDimensions { width, height });
        }
        Ok(Self { pixels })
    }
}

impl TryFrom<DynamicImage> for DecodedImage {
    type Error = GridError;

    fn try_from(image: DynamicImage) -> Result<Self, Self::Error> {
        trace!("Converting {:?} image to RGBA", image.color());
        Self::try_from(image.to_rgba8())
    }
}

/// The full-resolution composited image; what gets exported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSurface {
    buffer: RgbaImage,
}

impl WorkingSurface {
    /// A surface holding a plain copy of `image`.
    pub fn for_image(image: &DecodedImage) -> Self {
        Self {
            buffer: image.pixels().clone(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }
}

/// The downscaled copy of a [`WorkingSurface`] shown on screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewSurface {
    buffer: RgbaImage,
}

impl PreviewSurface {
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }
}

/// Size of the preview of a `width` x `height` surface.
///
/// The scale is `min(1, max_width / width)`; aspect ratio is kept and the
/// height is rounded.
///
/// # Example
/// ```
/// use addgrid::compositor::preview_dimensions;
///
/// assert_eq!(preview_dimensions(1000, 750, 400), (400, 300));
/// assert_eq!(preview_dimensions(1001, 333, 400), (400, 133));
/// assert_eq!(preview_dimensions(320, 240, 400), (320, 240));
/// ```
pub fn preview_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round() as u32;
    (max_width, scaled.max(1))
}

/// Paints grid lines, labels and the watermark at full resolution, and
/// projects the result onto the preview.
#[derive(Debug, Clone, Default)]
pub struct GridCompositor {
    config: CompositorConfig,
}

impl GridCompositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Repaints `target` from scratch: a copy of `image`, then the overlay
    /// that `settings` asks for.
    ///
    /// The result depends only on `image` and `settings`; painting twice gives
    /// the same pixels.
    pub fn paint(&self, image: &DecodedImage, settings: &RenderSettings, target: &mut WorkingSurface) {
        let (width, height) = image.dimensions();
        let mut canvas = Blend(image.pixels().clone());

        if settings.is_passthrough() {
            debug!("Nothing to draw, working surface is a plain copy");
            target.buffer = canvas.0;
            return;
        }

        let draws_overlay =
            settings.show_grid() || settings.label_position() != LabelPosition::None;
        if draws_overlay {
            let layout = GridLayout::new(width, height, settings);
            if settings.show_grid() {
                GridLines {
                    layout: &layout,
                    color: with_opacity(Rgb([255, 255, 255]), self.config.grid_line_opacity),
                }
                .draw(&mut canvas);
            }
            if settings.label_position() != LabelPosition::None {
                LabelOverlay {
                    layout: &layout,
                    ink: Ink::new(settings.polarity(), self.config.label_opacity),
                }
                .draw(&mut canvas);
            }
        }

        if settings.add_watermark() {
            if draws_overlay || !self.config.watermark_needs_overlay {
                self.draw_watermark(&mut canvas, settings.polarity());
            } else {
                debug!("Watermark skipped, it only accompanies a grid or labels");
            }
        }

        target.buffer = canvas.0;
        info!(
            "Painted {}x{} surface ({} columns, {} rows, labels {})",
            width,
            height,
            settings.columns(),
            settings.rows(),
            settings.label_position()
        );
    }

    /// Stamps the watermark onto an already painted surface.
    pub fn stamp_watermark(&self, polarity: TextPolarity, target: &mut WorkingSurface) {
        let mut canvas = Blend(std::mem::take(&mut target.buffer));
        self.draw_watermark(&mut canvas, polarity);
        target.buffer = canvas.0;
    }

    fn draw_watermark(&self, canvas: &mut Blend<RgbaImage>, polarity: TextPolarity) {
        Watermark {
            text: &self.config.watermark_text,
            inset: self.config.watermark_inset,
            ink: Ink::new(polarity, self.config.watermark_opacity),
        }
        .draw(canvas);
    }

    /// Replaces `target` with a scaled copy of `source`; never redraws the overlay.
    pub fn to_preview(&self, source: &WorkingSurface, target: &mut PreviewSurface) {
        let (width, height) = source.dimensions();
        let (preview_width, preview_height) =
            preview_dimensions(width, height, self.config.max_preview_width);
        debug!(
            "Preview {}x{} -> {}x{}",
            width, height, preview_width, preview_height
        );

        target.buffer = if (preview_width, preview_height) == (width, height) {
            source.buffer.clone()
        } else {
            imageops::resize(
                &source.buffer,
                preview_width,
                preview_height,
                FilterType::Triangle,
            )
        };
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn gray_image(width: u32, height: u32) -> DecodedImage {
        DecodedImage::try_from(RgbaImage::from_pixel(width, height, GRAY)).unwrap()
    }

    fn painted(image: &DecodedImage, settings: &RenderSettings) -> WorkingSurface {
        let mut surface = WorkingSurface::default();
        GridCompositor::default().paint(image, settings, &mut surface);
        surface
    }

    /// A JPEG whose left half is red and right half blue, tagged with EXIF `orientation`.
    pub(crate) fn oriented_jpeg(width: u32, height: u32, orientation: u16) -> Vec<u8> {
        let pixels = image::RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let mut jpeg = Vec::new();
        pixels
            .write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 95))
            .unwrap();

        // APP1 segment: "Exif\0\0", big-endian TIFF header, one IFD entry (0x0112 SHORT)
        let [hi, lo] = orientation.to_be_bytes();
        let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
        app1.extend_from_slice(b"Exif\0\0");
        app1.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
        app1.extend_from_slice(&[0x00, 0x01]);
        app1.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, hi, lo, 0x00, 0x00]);
        app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        // Right after SOI
        jpeg.splice(2..2, app1);
        jpeg
    }

    #[test]
    fn test_decode_applies_exif_orientation() {
        // Orientation 6: rotate 90 degrees clockwise to display
        let image = DecodedImage::decode(&oriented_jpeg(40, 20, 6)).unwrap();
        assert_eq!(image.dimensions(), (20, 40));

        // The left (red) half of the stored pixels ends up on top
        let top = image.pixels().get_pixel(10, 5);
        let bottom = image.pixels().get_pixel(10, 35);
        assert!(top[0] > 200 && top[2] < 60, "{top:?}");
        assert!(bottom[2] > 200 && bottom[0] < 60, "{bottom:?}");
    }

    #[test]
    fn test_decode_without_rotation_keeps_layout() {
        let image = DecodedImage::decode(&oriented_jpeg(40, 20, 1)).unwrap();
        assert_eq!(image.dimensions(), (40, 20));
        assert!(image.pixels().get_pixel(5, 10)[0] > 200);
    }

    #[test]
    fn test_rejects_empty_image() {
        let err = DecodedImage::try_from(RgbaImage::new(0, 10)).unwrap_err();
        assert!(matches!(err, GridError::InvalidDimensions { width: 0, height: 10 }));
    }

    #[test]
    fn test_passthrough_is_plain_copy() {
        let image = gray_image(50, 40);
        let mut settings = RenderSettings::default();
        settings.set_label_position(LabelPosition::None);

        let surface = painted(&image, &settings);
        assert_eq!(surface.as_image(), image.pixels());
    }

    #[test]
    fn test_paint_resizes_target() {
        let image = gray_image(64, 32);
        let mut surface = WorkingSurface::for_image(&gray_image(10, 10));
        GridCompositor::default().paint(&image, &RenderSettings::default(), &mut surface);
        assert_eq!(surface.dimensions(), (64, 32));
    }

    #[test]
    fn test_repaint_does_not_accumulate() {
        let image = gray_image(300, 200);
        let mut settings = RenderSettings::default();
        settings.set_show_grid(true);
        settings.set_label_position(LabelPosition::All);
        settings.set_add_watermark(true);

        let compositor = GridCompositor::default();
        let mut surface = WorkingSurface::for_image(&image);
        compositor.paint(&image, &settings, &mut surface);
        let first = surface.clone();
        compositor.paint(&image, &settings, &mut surface);
        assert_eq!(surface, first);
    }

    #[test]
    fn test_grid_lines_at_cell_boundaries() {
        let image = gray_image(600, 600);
        let mut settings = RenderSettings::default();
        settings.set_show_grid(true);
        settings.set_label_position(LabelPosition::None);
        let surface = painted(&image, &settings);
        let pixels = surface.as_image();

        // Lines are 1.5px wide: boundary 100 covers pixels 99 and 100
        for boundary in [100, 200, 300, 400, 500] {
            assert!(pixels.get_pixel(boundary, 50)[0] > 200);
            assert!(pixels.get_pixel(boundary - 1, 50)[0] > 200);
            assert!(pixels.get_pixel(50, boundary)[0] > 200);
        }
        assert!(pixels.get_pixel(0, 50)[0] > 200);
        assert!(pixels.get_pixel(599, 50)[0] > 200);
        assert_eq!(*pixels.get_pixel(50, 50), GRAY);
        assert_eq!(*pixels.get_pixel(150, 250), GRAY);
    }

    #[test]
    fn test_grid_ink_ignores_polarity() {
        let image = gray_image(200, 200);
        let mut settings = RenderSettings::default();
        settings.set_show_grid(true);
        settings.set_label_position(LabelPosition::None);
        let light = painted(&image, &settings);
        settings.set_dark_text(true);
        let dark = painted(&image, &settings);
        assert_eq!(light, dark);
    }

    #[test]
    fn test_label_polarity() {
        let image = gray_image(600, 600);
        let mut settings = RenderSettings::default();
        settings.set_label_position(LabelPosition::TopLeft);

        // Centre of the crossbar of the "A" anchored at (50, 15)
        let light = painted(&image, &settings);
        let fill = light.as_image().get_pixel(50, 14);
        assert!(fill[0] > 240, "{fill:?}");

        settings.set_dark_text(true);
        let dark = painted(&image, &settings);
        let fill = dark.as_image().get_pixel(50, 14);
        assert!(fill[0] < 15, "{fill:?}");
    }

    #[test]
    fn test_watermark_without_grid() {
        let image = gray_image(400, 300);
        let mut settings = RenderSettings::default();
        settings.set_label_position(LabelPosition::None);
        settings.set_add_watermark(true);

        let surface = painted(&image, &settings);
        assert_ne!(surface.as_image(), image.pixels());
    }

    #[test]
    fn test_watermark_coupled_to_overlay_when_configured() {
        let image = gray_image(400, 300);
        let mut settings = RenderSettings::default();
        settings.set_label_position(LabelPosition::None);
        settings.set_add_watermark(true);

        let compositor = GridCompositor::new(CompositorConfig {
            watermark_needs_overlay: true,
            ..CompositorConfig::default()
        });
        let mut surface = WorkingSurface::default();
        compositor.paint(&image, &settings, &mut surface);
        assert_eq!(surface.as_image(), image.pixels());

        compositor.stamp_watermark(settings.polarity(), &mut surface);
        assert_ne!(surface.as_image(), image.pixels());
    }

    #[test]
    fn test_watermark_polarity_swaps() {
        let image = gray_image(400, 300);
        let mut settings = RenderSettings::default();
        settings.set_label_position(LabelPosition::None);
        settings.set_add_watermark(true);
        let light = painted(&image, &settings);
        settings.set_dark_text(true);
        let dark = painted(&image, &settings);

        // Solid fill darkens and solid outline brightens when the polarity flips
        let mut fill_pixels = 0;
        let mut outline_pixels = 0;
        for (l, d) in light.as_image().pixels().zip(dark.as_image().pixels()) {
            if l[0] > 180 {
                assert!(d[0] < l[0]);
                fill_pixels += 1;
            } else if l[0] < 60 {
                assert!(d[0] > l[0]);
                outline_pixels += 1;
            }
        }
        assert!(fill_pixels > 0);
        assert!(outline_pixels > 0);
    }

    #[test]
    fn test_preview_of_wide_surface() {
        let image = gray_image(1000, 750);
        let compositor = GridCompositor::default();
        let surface = WorkingSurface::for_image(&image);
        let mut preview = PreviewSurface::default();
        compositor.to_preview(&surface, &mut preview);
        assert_eq!(preview.dimensions(), (400, 300));
    }

    #[test]
    fn test_preview_of_small_surface_is_exact_copy() {
        let image = gray_image(400, 900);
        let compositor = GridCompositor::default();
        let mut settings = RenderSettings::default();
        settings.set_show_grid(true);
        let mut surface = WorkingSurface::default();
        compositor.paint(&image, &settings, &mut surface);

        let mut preview = PreviewSurface::default();
        compositor.to_preview(&surface, &mut preview);
        assert_eq!(preview.as_image(), surface.as_image());
    }

    proptest! {
        #[test]
        fn test_preview_dimensions_proptest(width in 1..3000u32, height in 1..3000u32) {
            let (w, h) = preview_dimensions(width, height, 400);
            if width > 400 {
                prop_assert_eq!(w, 400);
                let expected = (height as f64 * 400.0 / width as f64).round().max(1.0) as u32;
                prop_assert_eq!(h, expected);
            } else {
                prop_assert_eq!((w, h), (width, height));
            }
        }

        #[test]
        fn test_paint_is_idempotent_proptest(
            width in 8..120u32,
            height in 8..120u32,
            columns in 2..=26u32,
            rows in 2..=99u32,
            dark in any::<bool>(),
        ) {
            let image = DecodedImage::try_from(RgbaImage::from_fn(width, height, |_, _| {
                Rgba([rand::random::<u8>(), rand::random::<u8>(), rand::random::<u8>(), 255])
            }))
            .unwrap();
            let mut settings = RenderSettings::default();
            settings.set_columns(columns);
            settings.set_rows(rows);
            settings.set_show_grid(true);
            settings.set_label_position(LabelPosition::All);
            settings.set_dark_text(dark);
            settings.set_add_watermark(true);

            let once = painted(&image, &settings);
            let twice = painted(&image, &settings);
            prop_assert_eq!(once, twice);
        }
    }
}
