use std::fs;
use std::path::Path;

use image::ImageFormat;
use tracing::*;

use crate::export::{export, ExportedImage};
use crate::{
    CompositorConfig, DecodedImage, GridCompositor, GridError, LabelPosition, PreviewSurface,
    RenderSettings, WorkingSurface,
};

/// A user-supplied file, as handed over by whatever picked it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub name: Option<String>,
    /// Declared media type, e.g. `image/jpeg`.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageSource {
    pub fn new(name: Option<String>, media_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name,
            media_type,
            bytes,
        }
    }

    /// Reads a file, declaring its media type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let media_type = ImageFormat::from_path(path)
            .ok()
            .map(|format| format.to_mime_type().to_string());
        Ok(Self::new(name, media_type, bytes))
    }

    /// The declared media type, or the one sniffed from the bytes when none was declared.
    fn resolve_media_type(&self) -> Result<String, GridError> {
        let media_type = match &self.media_type {
            Some(declared) => declared.clone(),
            None => image::guess_format(&self.bytes)
                .map(|format| format.to_mime_type().to_string())
                .unwrap_or_else(|_| "application/octet-stream".to_string()),
        };
        if media_type.starts_with("image/") {
            Ok(media_type)
        } else {
            Err(GridError::NotAnImage { media_type })
        }
    }
}

/// A discrete event from the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ToggleGrid,
    SelectLabels(LabelPosition),
    AdjustColumns(i32),
    AdjustRows(i32),
    SetColumns(u32),
    SetRows(u32),
    ToggleDarkText,
    ToggleWatermark,
}

#[derive(Debug)]
struct LoadedImage {
    name: Option<String>,
    media_type: String,
    source: DecodedImage,
    working: WorkingSurface,
    preview: PreviewSurface,
}

/// Owns the only mutable [`RenderSettings`], the loaded image and both surfaces.
///
/// Every settings change repaints the working surface and the preview when an
/// image is loaded; before that it only updates the settings.
///
/// # Example
/// ```
/// use addgrid::{Control, ImageSource, Session};
/// use image::{Rgba, RgbaImage};
///
/// let png = addgrid::ExportFormat::Png
///     .encode(&RgbaImage::from_pixel(800, 400, Rgba([20, 60, 90, 255])))
///     .unwrap();
///
/// let mut session = Session::default();
/// session.apply(Control::ToggleGrid);
/// session.load(ImageSource::new(Some("map.png".into()), Some("image/png".into()), png)).unwrap();
///
/// assert_eq!(session.preview().unwrap().dimensions(), (400, 200));
/// assert_eq!(session.export().unwrap().file_name, "map_addgrid_org.png");
/// ```
#[derive(Debug, Default)]
pub struct Session {
    compositor: GridCompositor,
    settings: RenderSettings,
    loaded: Option<LoadedImage>,
}

impl Session {
    pub fn new(config: CompositorConfig) -> Self {
        Self {
            compositor: GridCompositor::new(config),
            settings: RenderSettings::default(),
            loaded: None,
        }
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn working(&self) -> Option<&WorkingSurface> {
        self.loaded.as_ref().map(|loaded| &loaded.working)
    }

    pub fn preview(&self) -> Option<&PreviewSurface> {
        self.loaded.as_ref().map(|loaded| &loaded.preview)
    }

    /// Accepts a new image, replacing any previous one and both surfaces.
    ///
    /// Non-image media types and undecodable bytes are rejected and leave the
    /// session as it was.
    pub fn load(&mut self, source: ImageSource) -> Result<(), GridError> {
        let media_type = source.resolve_media_type().inspect_err(|e| {
            warn!("Rejected {:?}: {}", source.name, e);
        })?;
        let decoded = DecodedImage::decode(&source.bytes).inspect_err(|e| {
            warn!("Could not decode {:?}: {}", source.name, e);
        })?;
        info!(
            "Loaded {:?} ({}, {}x{})",
            source.name,
            media_type,
            decoded.width(),
            decoded.height()
        );

        self.loaded = Some(LoadedImage {
            name: source.name,
            media_type,
            working: WorkingSurface::for_image(&decoded),
            preview: PreviewSurface::default(),
            source: decoded,
        });
        self.repaint();
        Ok(())
    }

    /// Applies one control event, then repaints if an image is loaded.
    pub fn apply(&mut self, control: Control) {
        debug!("Control {:?}", control);
        let settings = &mut self.settings;
        match control {
            Control::ToggleGrid => settings.set_show_grid(!settings.show_grid()),
            Control::SelectLabels(position) => settings.set_label_position(position),
            Control::AdjustColumns(delta) => settings.adjust_columns(delta),
            Control::AdjustRows(delta) => settings.adjust_rows(delta),
            Control::SetColumns(columns) => settings.set_columns(columns),
            Control::SetRows(rows) => settings.set_rows(rows),
            Control::ToggleDarkText => settings.set_dark_text(!settings.dark_text()),
            Control::ToggleWatermark => settings.set_add_watermark(!settings.add_watermark()),
        }
        self.repaint();
    }

    /// Replaces all settings at once, then repaints if an image is loaded.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
        self.repaint();
    }

    /// Encodes the working surface in the loaded file's format.
    pub fn export(&self) -> Result<ExportedImage, GridError> {
        let loaded = self.loaded.as_ref().ok_or(GridError::NoImageLoaded)?;
        export(
            &loaded.working,
            loaded.name.as_deref(),
            Some(&loaded.media_type),
            self.compositor.config(),
        )
    }

    fn repaint(&mut self) {
        let Some(loaded) = self.loaded.as_mut() else {
            trace!("No image loaded, settings updated only");
            return;
        };
        self.compositor
            .paint(&loaded.source, &self.settings, &mut loaded.working);
        self.compositor
            .to_preview(&loaded.working, &mut loaded.preview);
    }
}
