use super::*;

/// Distance of a label from its edge, as a fraction of the cell's thickness.
pub const LABEL_INSET: f32 = 0.15;

/// The image edge a label is anchored to.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// An axis label centred on `(x, y)`.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub edge: Edge,
}

impl Label {
    pub fn new(text: impl Into<String>, x: f32, y: f32, edge: Edge) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            edge,
        }
    }
}

/// Letter for the column at `index`, or `None` past `Z`.
///
/// # Example
/// ```
/// use addgrid::grid::column_letter;
///
/// assert_eq!(column_letter(0), Some('A'));
/// assert_eq!(column_letter(25), Some('Z'));
/// assert_eq!(column_letter(26), None);
/// ```
pub fn column_letter(index: u32) -> Option<char> {
    (index < MAX_COLUMNS).then(|| char::from(b'A' + index as u8))
}

pub(super) fn column_labels(
    columns: u32,
    cell_width: f32,
    cell_height: f32,
    height: u32,
    position: LabelPosition,
) -> impl Iterator<Item = Label> {
    let top_y = cell_height * LABEL_INSET;
    let bottom_y = height as f32 - cell_height * LABEL_INSET;

    (0..columns).map_while(column_letter).enumerate().flat_map(
        move |(i, letter)| {
            let x = (i as f32 + 0.5) * cell_width;
            let top = position
                .shows_top_left()
                .then(|| Label::new(letter, x, top_y, Edge::Top));
            let bottom = position
                .shows_bottom_right()
                .then(|| Label::new(letter, x, bottom_y, Edge::Bottom));
            top.into_iter().chain(bottom)
        },
    )
}

pub(super) fn row_labels(
    rows: u32,
    cell_width: f32,
    cell_height: f32,
    width: u32,
    position: LabelPosition,
) -> impl Iterator<Item = Label> {
    let left_x = cell_width * LABEL_INSET;
    let right_x = width as f32 - cell_width * LABEL_INSET;

    (0..rows).flat_map(move |i| {
        let number = (i + 1).to_string();
        let y = (i as f32 + 0.5) * cell_height;
        let left = position
            .shows_top_left()
            .then(|| Label::new(number.clone(), left_x, y, Edge::Left));
        let right = position
            .shows_bottom_right()
            .then(|| Label::new(number, right_x, y, Edge::Right));
        left.into_iter().chain(right)
    })
}
