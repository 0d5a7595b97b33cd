//! This crate overlays a labeled grid on raster images.
//! Columns are lettered A–Z and rows are numbered. The composited result is
//! painted at full resolution, projected onto a bounded preview, and exported
//! in the source format. It uses the `image` and `imageproc` crates for pixel
//! work and `insta` for snapshot testing.

/// Render settings chosen by the user: grid density, label placement, ink.
///
/// # Example
/// ```
/// use addgrid::{LabelPosition, RenderSettings};
///
/// let mut settings = RenderSettings::default();
/// settings.adjust_columns(100);
/// settings.set_label_position(LabelPosition::All);
/// assert_eq!(settings.columns(), 26);
/// ```
pub mod settings;
/// Fixed constants of the compositor, gathered in [`CompositorConfig`].
pub mod config;
/// Pure grid geometry: line positions, stroke width, font size and label anchors.
///
/// # Example
/// ```
/// use addgrid::{GridLayout, RenderSettings};
///
/// let layout = GridLayout::new(600, 600, &RenderSettings::default());
/// assert_eq!(layout.vertical.len(), 7);
/// ```
pub mod grid;
/// Built-in bitmap glyph font and fill/outline coverage masks.
pub mod text;
/// Drawing grid lines, outlined text and the watermark onto a blending canvas.
///
/// The main components of this module are:
/// - [`Ink`](drawing::Ink): colours and opacities for one text pass.
/// - [`Drawable`](drawing::Drawable): implemented by everything the compositor paints.
pub mod drawing;
/// Full-resolution painting and the preview projection.
///
/// # Example
/// ```
/// use addgrid::{DecodedImage, GridCompositor, PreviewSurface, RenderSettings, WorkingSurface};
/// use image::{Rgba, RgbaImage};
///
/// let image = DecodedImage::try_from(RgbaImage::from_pixel(800, 600, Rgba([90, 90, 90, 255]))).unwrap();
/// let compositor = GridCompositor::default();
/// let mut working = WorkingSurface::for_image(&image);
/// let mut preview = PreviewSurface::default();
///
/// compositor.paint(&image, &RenderSettings::default(), &mut working);
/// compositor.to_preview(&working, &mut preview);
/// assert_eq!(preview.dimensions(), (400, 300));
/// ```
pub mod compositor;
/// Output format selection, file naming and encoding.
pub mod export;
/// The stateful owner of settings, loaded image and both surfaces.
pub mod session;
/// Helpers for writing surfaces to disk while inspecting output.
pub mod debug;

pub use compositor::{DecodedImage, GridCompositor, PreviewSurface, WorkingSurface};
pub use config::CompositorConfig;
pub use export::{ExportFormat, ExportedImage};
pub use grid::{Edge, GridLayout, Label};
pub use session::{Control, ImageSource, Session};
pub use settings::{LabelPosition, RenderSettings, TextPolarity};

use smallvec::SmallVec;
use thiserror::Error;

// Inline capacity covers the 99-row maximum plus the closing line
const DEFAULT_SMALLVEC_SIZE: usize = 128;
const DEFAULT_MAX_PREVIEW_WIDTH: u32 = 400;
const DEFAULT_JPEG_QUALITY: u8 = 92;
const DEFAULT_WATERMARK_TEXT: &str = "addgrid.org";
const DEFAULT_EXPORT_SUFFIX: &str = "_addgrid_org";

pub const MIN_COLUMNS: u32 = 2;
pub const MAX_COLUMNS: u32 = 26;
pub const MIN_ROWS: u32 = 2;
pub const MAX_ROWS: u32 = 99;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Not an image file: {media_type}")]
    NotAnImage { media_type: String },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid image dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Unknown label position: {0}")]
    InvalidLabelPosition(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A type alias for SmallVec with an optimized stack-allocated buffer size.
pub type SmallVecLine<T> = SmallVec<[T; DEFAULT_SMALLVEC_SIZE]>;
