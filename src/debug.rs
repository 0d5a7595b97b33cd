use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::*;

use super::*;

/// Saves the image with the grid, labels and watermark drawn on it.
///
/// This function paints the overlay described by `settings` on a copy of the
/// provided image and saves the result to the specified path. The format is
/// picked from the path's extension.
///
/// # Arguments
/// * `image` - The input image.
/// * `settings` - The overlay to draw.
/// * `output_path` - The path to save the output image.
/// * `config` - The compositor configuration.
///
/// # Errors
/// Returns [`GridError`] if the image is empty or saving fails.
///
/// # Examples
///
/// ```rust,no_run
/// use addgrid::*;
/// use image::open;
///
/// let img = open("photo.jpg").unwrap();
/// let mut settings = RenderSettings::default();
/// settings.set_show_grid(true);
///
/// debug::save_image_with_grid(&img, &settings, "photo_with_grid.png", &CompositorConfig::default()).unwrap();
/// ```
pub fn save_image_with_grid(
    image: &DynamicImage,
    settings: &RenderSettings,
    output_path: impl AsRef<Path>,
    config: &CompositorConfig,
) -> Result<(), GridError> {
    let image = DecodedImage::try_from(image.clone())?;
    let compositor = GridCompositor::new(config.clone());
    let mut working = WorkingSurface::for_image(&image);
    compositor.paint(&image, settings, &mut working);
    save_rgba(working.as_image(), output_path.as_ref())
}

/// Saves the on-screen preview, as the user would see it.
pub fn save_preview(preview: &PreviewSurface, output_path: impl AsRef<Path>) -> Result<(), GridError> {
    save_rgba(preview.as_image(), output_path.as_ref())
}

fn save_rgba(image: &RgbaImage, output_path: &Path) -> Result<(), GridError> {
    debug!("Saving {}x{} image to {}", image.width(), image.height(), output_path.display());
    let result = match ImageFormat::from_path(output_path) {
        // JPEG has no alpha channel
        Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgba8(image.clone())
            .into_rgb8()
            .save(output_path),
        _ => image.save(output_path),
    };
    result.map_err(|e| GridError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    fn output_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("addgrid_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_save_image_with_grid() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(120, 80, |x, y| {
            Rgba([(x * 2) as u8, (y * 3) as u8, 60, 255])
        }));
        let mut settings = RenderSettings::default();
        settings.set_show_grid(true);
        settings.set_label_position(LabelPosition::All);

        let output_path = output_path("with_grid.png");
        save_image_with_grid(&img, &settings, &output_path, &CompositorConfig::default()).unwrap();

        // The saved file holds exactly what a session paints
        let saved = image::open(&output_path).unwrap().to_rgba8();
        let decoded = DecodedImage::try_from(img).unwrap();
        let mut expected = WorkingSurface::default();
        GridCompositor::default().paint(&decoded, &settings, &mut expected);
        assert_eq!(&saved, expected.as_image());

        std::fs::remove_file(output_path).unwrap();
    }

    #[test]
    fn test_save_preview_as_jpeg() {
        let mut session = Session::default();
        session
            .load(ImageSource::new(
                Some("wide.png".to_string()),
                Some("image/png".to_string()),
                ExportFormat::Png
                    .encode(&RgbaImage::from_pixel(800, 200, Rgba([30, 90, 150, 255])))
                    .unwrap(),
            ))
            .unwrap();

        let output_path = output_path("preview.jpg");
        save_preview(session.preview().unwrap(), &output_path).unwrap();

        let saved = image::open(&output_path).unwrap();
        assert_eq!((saved.width(), saved.height()), (400, 100));

        std::fs::remove_file(output_path).unwrap();
    }

    #[test]
    fn test_save_rejects_empty_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        let result = save_image_with_grid(
            &img,
            &RenderSettings::default(),
            output_path("empty.png"),
            &CompositorConfig::default(),
        );
        assert!(matches!(result, Err(GridError::InvalidDimensions { .. })));
    }
}
