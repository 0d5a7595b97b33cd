use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};
use tracing::*;

use crate::{CompositorConfig, GridError, WorkingSurface};

/// Encoding used for the exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Lossy, quality out of 100. Alpha is dropped.
    Jpeg { quality: u8 },
    /// Lossless.
    Png,
}

impl ExportFormat {
    /// JPEG when the source was a JPEG, by media type or file extension; PNG otherwise.
    ///
    /// # Example
    /// ```
    /// use addgrid::ExportFormat;
    ///
    /// let format = ExportFormat::for_source(Some("photo.JPG"), None, 92);
    /// assert_eq!(format, ExportFormat::Jpeg { quality: 92 });
    ///
    /// let format = ExportFormat::for_source(Some("scan"), Some("image/webp"), 92);
    /// assert_eq!(format, ExportFormat::Png);
    /// ```
    pub fn for_source(name: Option<&str>, media_type: Option<&str>, jpeg_quality: u8) -> Self {
        let jpeg_type = media_type.is_some_and(|media_type| {
            let media_type = media_type.to_ascii_lowercase();
            media_type.contains("jpeg") || media_type.contains("jpg")
        });
        let jpeg_extension = name
            .and_then(extension)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));

        if jpeg_type || jpeg_extension {
            ExportFormat::Jpeg {
                quality: jpeg_quality,
            }
        } else {
            ExportFormat::Png
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "jpg",
            ExportFormat::Png => "png",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }

    /// Encodes `image` into an in-memory file.
    pub fn encode(self, image: &RgbaImage) -> Result<Vec<u8>, GridError> {
        let mut bytes = Vec::new();
        let result = match self {
            ExportFormat::Jpeg { quality } => {
                let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))
            }
            ExportFormat::Png => image.write_with_encoder(PngEncoder::new(&mut bytes)),
        };
        result.map_err(|e| GridError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// The final extension of a file name, if it has one.
fn extension(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => Some(ext),
        _ => None,
    }
}

/// A file name with its final extension removed.
///
/// # Example
/// ```
/// use addgrid::export::file_stem;
///
/// assert_eq!(file_stem("holiday.photo.jpeg"), "holiday.photo");
/// assert_eq!(file_stem("README"), "README");
/// ```
pub fn file_stem(name: &str) -> &str {
    match extension(name) {
        Some(ext) => &name[..name.len() - ext.len() - 1],
        None => name,
    }
}

/// `<stem><suffix>.<ext>`, falling back to `image` for the stem.
pub fn export_file_name(name: Option<&str>, suffix: &str, format: ExportFormat) -> String {
    let stem = name.map(file_stem).filter(|stem| !stem.is_empty()).unwrap_or("image");
    format!("{}{}.{}", stem, suffix, format.extension())
}

/// An encoded image ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

/// Encodes the working surface in the source's format.
pub fn export(
    surface: &WorkingSurface,
    name: Option<&str>,
    media_type: Option<&str>,
    config: &CompositorConfig,
) -> Result<ExportedImage, GridError> {
    let format = ExportFormat::for_source(name, media_type, config.jpeg_quality);
    let file_name = export_file_name(name, &config.export_suffix, format);
    debug!("Encoding {:?} as {:?}", file_name, format);
    let bytes = format.encode(surface.as_image())?;
    info!("Exported {} ({} bytes)", file_name, bytes.len());
    Ok(ExportedImage {
        file_name,
        format,
        bytes,
    })
}
