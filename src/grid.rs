mod labels;
mod lines;

pub use labels::{column_letter, Edge, Label, LABEL_INSET};
pub use lines::{boundaries, StrokeSpan};

use crate::{LabelPosition, RenderSettings, SmallVecLine, MAX_COLUMNS};
use tracing::*;

/// Grid line stroke width for an image: `max(1, min(width, height) / 400)`.
pub fn line_width(width: u32, height: u32) -> f32 {
    (width.min(height) as f32 / 400.0).max(1.0)
}

/// Label font size for an image: `max(10, min(width, height) / 25)`.
pub fn label_font_size(width: u32, height: u32) -> f32 {
    (width.min(height) as f32 / 25.0).max(10.0)
}

/// Watermark font size for an image: `max(12, min(width, height) / 25)`.
pub fn watermark_font_size(width: u32, height: u32) -> f32 {
    (width.min(height) as f32 / 25.0).max(12.0)
}

/// Outline stroke width for text of the given size: `max(2, font_size / 8)`.
pub fn outline_width(font_size: f32) -> f32 {
    (font_size / 8.0).max(2.0)
}

/// Everything the compositor needs to know about where to draw, for one
/// image size and one set of settings.
///
/// Cell sizes and positions are fractional; snapping to pixels happens at
/// draw time.
///
/// # Example
/// ```
/// use addgrid::{Edge, GridLayout, LabelPosition};
///
/// let layout = GridLayout::with_counts(600, 600, 6, 6, LabelPosition::All);
/// assert_eq!(layout.vertical[1], 100.0);
///
/// let top: Vec<&str> = layout.labels_on(Edge::Top).map(|l| l.text.as_str()).collect();
/// assert_eq!(top, ["A", "B", "C", "D", "E", "F"]);
/// ```
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridLayout {
    pub width: u32,
    pub height: u32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub line_width: f32,
    pub font_size: f32,
    /// x positions of the vertical lines.
    pub vertical: SmallVecLine<f32>,
    /// y positions of the horizontal lines.
    pub horizontal: SmallVecLine<f32>,
    pub labels: Vec<Label>,
}

impl GridLayout {
    /// Creates the layout for an image of `width` x `height` under `settings`.
    pub fn new(width: u32, height: u32, settings: &RenderSettings) -> Self {
        Self::with_counts(
            width,
            height,
            settings.columns(),
            settings.rows(),
            settings.label_position(),
        )
    }

    /// Creates a layout from raw counts.
    ///
    /// Counts are not clamped to the settings bounds here, but column labels
    /// stop after `Z` and a zero count is treated as one.
    pub fn with_counts(
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
        label_position: LabelPosition,
    ) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let cell_width = width as f32 / columns as f32;
        let cell_height = height as f32 / rows as f32;
        if columns > MAX_COLUMNS {
            debug!(
                "{} columns requested, labelling only the first {}",
                columns, MAX_COLUMNS
            );
        }

        let labels = labels::column_labels(columns, cell_width, cell_height, height, label_position)
            .chain(labels::row_labels(
                rows,
                cell_width,
                cell_height,
                width,
                label_position,
            ))
            .collect();

        let layout = Self {
            width,
            height,
            cell_width,
            cell_height,
            line_width: line_width(width, height),
            font_size: label_font_size(width, height),
            vertical: boundaries(columns, width),
            horizontal: boundaries(rows, height),
            labels,
        };
        debug!(
            "Layout {}x{}: cell={}x{}, line_width={}, font_size={}, labels={}",
            width,
            height,
            layout.cell_width,
            layout.cell_height,
            layout.line_width,
            layout.font_size,
            layout.labels.len()
        );
        layout
    }

    /// Returns an iterator over the labels anchored to `edge`.
    pub fn labels_on(&self, edge: Edge) -> impl Iterator<Item = &Label> {
        self.labels.iter().filter(move |label| label.edge == edge)
    }
}
