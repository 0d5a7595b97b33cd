use std::fmt;
use std::str::FromStr;

use image::Rgb;
use tracing::*;

use crate::{GridError, MAX_COLUMNS, MAX_ROWS, MIN_COLUMNS, MIN_ROWS};

/// Which edges of the image receive axis labels.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum LabelPosition {
    None,
    #[default]
    TopLeft,
    BottomRight,
    All,
}

impl LabelPosition {
    /// Column labels along the top edge, row labels along the left edge.
    pub fn shows_top_left(self) -> bool {
        matches!(self, LabelPosition::TopLeft | LabelPosition::All)
    }

    /// Column labels along the bottom edge, row labels along the right edge.
    pub fn shows_bottom_right(self) -> bool {
        matches!(self, LabelPosition::BottomRight | LabelPosition::All)
    }
}

impl fmt::Display for LabelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelPosition::None => "none",
            LabelPosition::TopLeft => "top-left",
            LabelPosition::BottomRight => "bottom-right",
            LabelPosition::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for LabelPosition {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(LabelPosition::None),
            "top-left" | "topLeft" => Ok(LabelPosition::TopLeft),
            "bottom-right" | "bottomRight" => Ok(LabelPosition::BottomRight),
            "all" => Ok(LabelPosition::All),
            other => Err(GridError::InvalidLabelPosition(other.to_string())),
        }
    }
}

/// Ink choice shared by labels and the watermark.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextPolarity {
    /// White fill, black outline.
    Light,
    /// Black fill, white outline.
    Dark,
}

impl TextPolarity {
    pub fn fill(self) -> Rgb<u8> {
        match self {
            TextPolarity::Light => Rgb([255, 255, 255]),
            TextPolarity::Dark => Rgb([0, 0, 0]),
        }
    }

    pub fn outline(self) -> Rgb<u8> {
        match self {
            TextPolarity::Light => Rgb([0, 0, 0]),
            TextPolarity::Dark => Rgb([255, 255, 255]),
        }
    }
}

/// The display parameters of one render.
///
/// Column and row counts can only be changed through the setters, which
/// saturate at the legal bounds, so every value handed to the compositor is
/// already in range.
///
/// # Example
/// ```
/// use addgrid::RenderSettings;
///
/// let mut settings = RenderSettings::default();
/// assert_eq!((settings.columns(), settings.rows()), (6, 6));
///
/// settings.adjust_rows(-10);
/// assert_eq!(settings.rows(), 2);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RenderSettings {
    columns: u32,
    rows: u32,
    show_grid: bool,
    label_position: LabelPosition,
    dark_text: bool,
    add_watermark: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            columns: 6,
            rows: 6,
            show_grid: false,
            label_position: LabelPosition::TopLeft,
            dark_text: false,
            add_watermark: false,
        }
    }
}

impl RenderSettings {
    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn label_position(&self) -> LabelPosition {
        self.label_position
    }

    pub fn dark_text(&self) -> bool {
        self.dark_text
    }

    pub fn add_watermark(&self) -> bool {
        self.add_watermark
    }

    pub fn polarity(&self) -> TextPolarity {
        if self.dark_text {
            TextPolarity::Dark
        } else {
            TextPolarity::Light
        }
    }

    /// True when the render draws nothing beyond the base copy.
    pub fn is_passthrough(&self) -> bool {
        !self.show_grid && self.label_position == LabelPosition::None && !self.add_watermark
    }

    pub fn set_columns(&mut self, columns: u32) {
        self.columns = columns.clamp(MIN_COLUMNS, MAX_COLUMNS);
        trace!("columns set to {}", self.columns);
    }

    pub fn set_rows(&mut self, rows: u32) {
        self.rows = rows.clamp(MIN_ROWS, MAX_ROWS);
        trace!("rows set to {}", self.rows);
    }

    /// Moves the column count by `delta`, saturating at 2 and 26.
    pub fn adjust_columns(&mut self, delta: i32) {
        self.set_columns(saturating_offset(self.columns, delta));
    }

    /// Moves the row count by `delta`, saturating at 2 and 99.
    pub fn adjust_rows(&mut self, delta: i32) {
        self.set_rows(saturating_offset(self.rows, delta));
    }

    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.show_grid = show_grid;
    }

    pub fn set_label_position(&mut self, label_position: LabelPosition) {
        self.label_position = label_position;
    }

    pub fn set_dark_text(&mut self, dark_text: bool) {
        self.dark_text = dark_text;
    }

    pub fn set_add_watermark(&mut self, add_watermark: bool) {
        self.add_watermark = add_watermark;
    }
}

fn saturating_offset(value: u32, delta: i32) -> u32 {
    if delta >= 0 {
        value.saturating_add(delta.unsigned_abs())
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}
