//! A small built-in bitmap font, scaled to any size by sampling each pixel on a
//! 4x4 grid, so glyph edges that fall inside a pixel get partial coverage.
//! Text is rasterized into two coverage masks: the fill, and the fill dilated
//! by half the outline width.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use tracing::*;

const GLYPH_COLUMNS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
/// Horizontal advance in glyph cells, one blank column included.
const ADVANCE_CELLS: u32 = 6;
/// Size of one glyph cell relative to the font size; caps end up 0.7em tall.
const CELL_PER_EM: f32 = 0.1;
/// Samples per pixel along each axis; coverage is the inked fraction.
const SUBSAMPLES: u32 = 4;

/// Each glyph: 7 rows, low 5 bits per row, MSB on the left. ASCII 32..=126.
#[rustfmt::skip]
const GLYPHS: [[u8; 7]; 95] = [
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00], // ' '
    [0x04,0x04,0x04,0x04,0x04,0x00,0x04], // '!'
    [0x0A,0x0A,0x0A,0x00,0x00,0x00,0x00], // '"'
    [0x0A,0x0A,0x1F,0x0A,0x1F,0x0A,0x0A], // '#'
    [0x04,0x0F,0x14,0x0E,0x05,0x1E,0x04], // '$'
    [0x18,0x19,0x02,0x04,0x08,0x13,0x03], // '%'
    [0x0C,0x12,0x14,0x08,0x15,0x12,0x0D], // '&'
    [0x04,0x04,0x08,0x00,0x00,0x00,0x00], // '''
    [0x02,0x04,0x08,0x08,0x08,0x04,0x02], // '('
    [0x08,0x04,0x02,0x02,0x02,0x04,0x08], // ')'
    [0x00,0x04,0x15,0x0E,0x15,0x04,0x00], // '*'
    [0x00,0x04,0x04,0x1F,0x04,0x04,0x00], // '+'
    [0x00,0x00,0x00,0x00,0x00,0x04,0x08], // ','
    [0x00,0x00,0x00,0x1F,0x00,0x00,0x00], // '-'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x04], // '.'
    [0x00,0x01,0x02,0x04,0x08,0x10,0x00], // '/'
    [0x0E,0x11,0x13,0x15,0x19,0x11,0x0E], // '0'
    [0x04,0x0C,0x04,0x04,0x04,0x04,0x0E], // '1'
    [0x0E,0x11,0x01,0x02,0x04,0x08,0x1F], // '2'
    [0x1F,0x02,0x04,0x02,0x01,0x11,0x0E], // '3'
    [0x02,0x06,0x0A,0x12,0x1F,0x02,0x02], // '4'
    [0x1F,0x10,0x1E,0x01,0x01,0x11,0x0E], // '5'
    [0x06,0x08,0x10,0x1E,0x11,0x11,0x0E], // '6'
    [0x1F,0x01,0x02,0x04,0x08,0x08,0x08], // '7'
    [0x0E,0x11,0x11,0x0E,0x11,0x11,0x0E], // '8'
    [0x0E,0x11,0x11,0x0F,0x01,0x02,0x0C], // '9'
    [0x00,0x00,0x04,0x00,0x00,0x04,0x00], // ':'
    [0x00,0x00,0x04,0x00,0x00,0x04,0x08], // ';'
    [0x02,0x04,0x08,0x10,0x08,0x04,0x02], // '<'
    [0x00,0x00,0x1F,0x00,0x1F,0x00,0x00], // '='
    [0x08,0x04,0x02,0x01,0x02,0x04,0x08], // '>'
    [0x0E,0x11,0x01,0x02,0x04,0x00,0x04], // '?'
    [0x0E,0x11,0x17,0x15,0x17,0x10,0x0E], // '@'
    [0x0E,0x11,0x11,0x1F,0x11,0x11,0x11], // 'A'
    [0x1E,0x11,0x11,0x1E,0x11,0x11,0x1E], // 'B'
    [0x0E,0x11,0x10,0x10,0x10,0x11,0x0E], // 'C'
    [0x1C,0x12,0x11,0x11,0x11,0x12,0x1C], // 'D'
    [0x1F,0x10,0x10,0x1E,0x10,0x10,0x1F], // 'E'
    [0x1F,0x10,0x10,0x1E,0x10,0x10,0x10], // 'F'
    [0x0E,0x11,0x10,0x17,0x11,0x11,0x0F], // 'G'
    [0x11,0x11,0x11,0x1F,0x11,0x11,0x11], // 'H'
    [0x0E,0x04,0x04,0x04,0x04,0x04,0x0E], // 'I'
    [0x07,0x02,0x02,0x02,0x02,0x12,0x0C], // 'J'
    [0x11,0x12,0x14,0x18,0x14,0x12,0x11], // 'K'
    [0x10,0x10,0x10,0x10,0x10,0x10,0x1F], // 'L'
    [0x11,0x1B,0x15,0x15,0x11,0x11,0x11], // 'M'
    [0x11,0x11,0x19,0x15,0x13,0x11,0x11], // 'N'
    [0x0E,0x11,0x11,0x11,0x11,0x11,0x0E], // 'O'
    [0x1E,0x11,0x11,0x1E,0x10,0x10,0x10], // 'P'
    [0x0E,0x11,0x11,0x11,0x15,0x12,0x0D], // 'Q'
    [0x1E,0x11,0x11,0x1E,0x14,0x12,0x11], // 'R'
    [0x0F,0x10,0x10,0x0E,0x01,0x01,0x1E], // 'S'
    [0x1F,0x04,0x04,0x04,0x04,0x04,0x04], // 'T'
    [0x11,0x11,0x11,0x11,0x11,0x11,0x0E], // 'U'
    [0x11,0x11,0x11,0x11,0x11,0x0A,0x04], // 'V'
    [0x11,0x11,0x11,0x15,0x15,0x1B,0x11], // 'W'
    [0x11,0x11,0x0A,0x04,0x0A,0x11,0x11], // 'X'
    [0x11,0x11,0x0A,0x04,0x04,0x04,0x04], // 'Y'
    [0x1F,0x01,0x02,0x04,0x08,0x10,0x1F], // 'Z'
    [0x0E,0x08,0x08,0x08,0x08,0x08,0x0E], // '['
    [0x00,0x10,0x08,0x04,0x02,0x01,0x00], // '\'
    [0x0E,0x02,0x02,0x02,0x02,0x02,0x0E], // ']'
    [0x04,0x0A,0x11,0x00,0x00,0x00,0x00], // '^'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x1F], // '_'
    [0x08,0x04,0x02,0x00,0x00,0x00,0x00], // '`'
    [0x00,0x00,0x0E,0x01,0x0F,0x11,0x0F], // 'a'
    [0x10,0x10,0x16,0x19,0x11,0x11,0x1E], // 'b'
    [0x00,0x00,0x0E,0x10,0x10,0x11,0x0E], // 'c'
    [0x01,0x01,0x0D,0x13,0x11,0x11,0x0F], // 'd'
    [0x00,0x00,0x0E,0x11,0x1F,0x10,0x0E], // 'e'
    [0x06,0x09,0x08,0x1C,0x08,0x08,0x08], // 'f'
    [0x00,0x00,0x0F,0x11,0x0F,0x01,0x0E], // 'g'
    [0x10,0x10,0x16,0x19,0x11,0x11,0x11], // 'h'
    [0x04,0x00,0x0C,0x04,0x04,0x04,0x0E], // 'i'
    [0x02,0x00,0x06,0x02,0x02,0x12,0x0C], // 'j'
    [0x10,0x10,0x12,0x14,0x18,0x14,0x12], // 'k'
    [0x0C,0x04,0x04,0x04,0x04,0x04,0x0E], // 'l'
    [0x00,0x00,0x1A,0x15,0x15,0x11,0x11], // 'm'
    [0x00,0x00,0x16,0x19,0x11,0x11,0x11], // 'n'
    [0x00,0x00,0x0E,0x11,0x11,0x11,0x0E], // 'o'
    [0x00,0x00,0x1E,0x11,0x1E,0x10,0x10], // 'p'
    [0x00,0x00,0x0D,0x13,0x0F,0x01,0x01], // 'q'
    [0x00,0x00,0x16,0x19,0x10,0x10,0x10], // 'r'
    [0x00,0x00,0x0E,0x10,0x0E,0x01,0x1E], // 's'
    [0x08,0x08,0x1C,0x08,0x08,0x09,0x06], // 't'
    [0x00,0x00,0x11,0x11,0x11,0x13,0x0D], // 'u'
    [0x00,0x00,0x11,0x11,0x11,0x0A,0x04], // 'v'
    [0x00,0x00,0x11,0x11,0x15,0x15,0x0A], // 'w'
    [0x00,0x00,0x11,0x0A,0x04,0x0A,0x11], // 'x'
    [0x00,0x00,0x11,0x11,0x0F,0x01,0x0E], // 'y'
    [0x00,0x00,0x1F,0x02,0x04,0x08,0x1F], // 'z'
    [0x02,0x04,0x04,0x08,0x04,0x04,0x02], // '{'
    [0x04,0x04,0x04,0x04,0x04,0x04,0x04], // '|'
    [0x08,0x04,0x04,0x02,0x04,0x04,0x08], // '}'
    [0x00,0x00,0x08,0x15,0x02,0x00,0x00], // '~'
];

/// Whether the point `(u, v)`, in glyph cells from the inked box's corner, is inked.
fn is_inked(glyphs: &[Option<&[u8; 7]>], u: f32, v: f32) -> bool {
    if u < 0.0 || v < 0.0 {
        return false;
    }
    let (cell_x, row) = (u as u32, v as u32);
    let column = cell_x % ADVANCE_CELLS;
    row < GLYPH_ROWS
        && column < GLYPH_COLUMNS
        && glyphs
            .get((cell_x / ADVANCE_CELLS) as usize)
            .copied()
            .flatten()
            .is_some_and(|rows| rows[row as usize] & (0x10 >> column) != 0)
}

fn glyph(ch: char) -> Option<&'static [u8; 7]> {
    let code = ch as u32;
    (32..=126)
        .contains(&code)
        .then(|| &GLYPHS[(code - 32) as usize])
}

/// Width and height of the inked box of `text` at `font_size`.
///
/// # Example
/// ```
/// use addgrid::text::measure;
///
/// assert_eq!(measure("AB", 10.0), (11.0, 7.0));
/// assert_eq!(measure("", 10.0), (0.0, 0.0));
/// ```
pub fn measure(text: &str, font_size: f32) -> (f32, f32) {
    let count = text.chars().count() as u32;
    if count == 0 {
        return (0.0, 0.0);
    }
    let cell = font_size * CELL_PER_EM;
    let columns = count * ADVANCE_CELLS - (ADVANCE_CELLS - GLYPH_COLUMNS);
    (columns as f32 * cell, GLYPH_ROWS as f32 * cell)
}

/// Fill and outline coverage for one piece of text.
///
/// Both masks have the same size. The inked box starts at `(pad, pad)`.
#[derive(Debug, Clone)]
pub struct TextMasks {
    pub fill: GrayImage,
    pub outline: GrayImage,
    pub pad: u32,
    pub ink_width: f32,
    pub ink_height: f32,
}

/// Rasterizes `text` at `font_size` with an outline stroke of `outline_width`.
///
/// # Example
/// ```
/// use addgrid::text::rasterize;
///
/// let masks = rasterize("A", 20.0, 4.0);
/// assert_eq!(masks.pad, 2);
/// assert_eq!(masks.fill.dimensions(), (14, 18));
/// ```
pub fn rasterize(text: &str, font_size: f32, outline_width: f32) -> TextMasks {
    let cell = (font_size * CELL_PER_EM).max(f32::EPSILON);
    let (ink_width, ink_height) = measure(text, font_size);
    let pad = (outline_width / 2.0).ceil().clamp(0.0, u8::MAX as f32) as u32;
    let width = ink_width.ceil() as u32 + 2 * pad;
    let height = ink_height.ceil() as u32 + 2 * pad;
    trace!(
        "Rasterizing {:?} at {}px into {}x{} masks",
        text,
        font_size,
        width,
        height
    );

    let glyphs: Vec<Option<&[u8; 7]>> = text.chars().map(glyph).collect();
    let fill = GrayImage::from_fn(width, height, |x, y| {
        let mut hits = 0u32;
        for sy in 0..SUBSAMPLES {
            for sx in 0..SUBSAMPLES {
                let u = (x as f32 - pad as f32 + (sx as f32 + 0.5) / SUBSAMPLES as f32) / cell;
                let v = (y as f32 - pad as f32 + (sy as f32 + 0.5) / SUBSAMPLES as f32) / cell;
                if is_inked(&glyphs, u, v) {
                    hits += 1;
                }
            }
        }
        Luma([(hits * 255 / (SUBSAMPLES * SUBSAMPLES)) as u8])
    });

    let outline = if pad == 0 {
        fill.clone()
    } else {
        dilate(&fill, Norm::LInf, pad as u8)
    };

    TextMasks {
        fill,
        outline,
        pad,
        ink_width,
        ink_height,
    }
}
