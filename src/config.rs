use crate::{
    DEFAULT_EXPORT_SUFFIX, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_PREVIEW_WIDTH,
    DEFAULT_WATERMARK_TEXT,
};

/// Opacity of the outline and fill passes of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOpacity {
    pub outline: f32,
    pub fill: f32,
}

/// Configuration for compositing and export.
///
/// # Example
/// ```
/// use addgrid::CompositorConfig;
///
/// let config = CompositorConfig::default();
/// assert_eq!(config.max_preview_width, 400);
/// assert_eq!(config.jpeg_quality, 92);
/// assert_eq!(config.watermark_text, "addgrid.org");
/// assert!(!config.watermark_needs_overlay);
/// ```
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Upper bound on the preview width in pixels (default: 400)
    pub max_preview_width: u32,
    /// JPEG export quality out of 100 (default: 92)
    pub jpeg_quality: u8,
    /// Caption drawn when the watermark is on (default: "addgrid.org")
    pub watermark_text: String,
    /// Distance of the caption's bottom-right corner from the image's (default: 20, 50)
    pub watermark_inset: (u32, u32),
    /// Only draw the watermark when grid lines or labels are drawn too (default: false)
    pub watermark_needs_overlay: bool,
    /// Opacity of grid lines (default: 0.9)
    pub grid_line_opacity: f32,
    /// Label ink (default: outline 0.8, fill 0.95)
    pub label_opacity: TextOpacity,
    /// Watermark ink (default: outline 0.6, fill 0.7)
    pub watermark_opacity: TextOpacity,
    /// Appended to the source file stem on export (default: "_addgrid_org")
    pub export_suffix: String,
}

impl CompositorConfig {
    /// Creates a new `CompositorConfig` with the given preview bound and JPEG
    /// quality, leaving everything else at its default.
    ///
    /// # Example
    /// ```
    /// use addgrid::CompositorConfig;
    ///
    /// let config = CompositorConfig::new(0, 150);
    /// assert_eq!(config.max_preview_width, 1);
    /// assert_eq!(config.jpeg_quality, 100);
    /// ```
    pub fn new(max_preview_width: u32, jpeg_quality: u8) -> Self {
        Self {
            max_preview_width: max_preview_width.max(1),
            jpeg_quality: jpeg_quality.clamp(1, 100),
            watermark_text: DEFAULT_WATERMARK_TEXT.to_string(),
            watermark_inset: (20, 50),
            watermark_needs_overlay: false,
            grid_line_opacity: 0.9,
            label_opacity: TextOpacity {
                outline: 0.8,
                fill: 0.95,
            },
            watermark_opacity: TextOpacity {
                outline: 0.6,
                fill: 0.7,
            },
            export_suffix: DEFAULT_EXPORT_SUFFIX.to_string(),
        }
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        CompositorConfig::new(DEFAULT_MAX_PREVIEW_WIDTH, DEFAULT_JPEG_QUALITY)
    }
}
