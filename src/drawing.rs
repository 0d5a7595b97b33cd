//! This module draws grid lines, outlined text and the watermark.
//! Everything is alpha-blended onto an [`imageproc::drawing::Blend`] canvas
//! wrapping the working buffer.
//!
//! # Examples
//!
//! ```rust
//! use addgrid::{drawing::*, GridLayout, RenderSettings, TextPolarity};
//! use addgrid::config::TextOpacity;
//! use image::{Rgba, RgbaImage};
//! use imageproc::drawing::Blend;
//!
//! let mut canvas = Blend(RgbaImage::from_pixel(300, 300, Rgba([40, 40, 40, 255])));
//! let layout = GridLayout::new(300, 300, &RenderSettings::default());
//!
//! GridLines { layout: &layout, color: Rgba([255, 255, 255, 230]) }.draw(&mut canvas);
//! let ink = Ink::new(TextPolarity::Light, TextOpacity { outline: 0.8, fill: 0.95 });
//! LabelOverlay { layout: &layout, ink }.draw(&mut canvas);
//! ```

use image::{GrayImage, Rgb, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, Blend, Canvas};
use imageproc::rect::Rect;
use tracing::*;

use crate::config::TextOpacity;
use crate::grid::{outline_width, watermark_font_size, GridLayout, StrokeSpan};
use crate::text::rasterize;
use crate::TextPolarity;

/// Colours of the two text passes, alpha included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ink {
    pub fill: Rgba<u8>,
    pub outline: Rgba<u8>,
}

impl Ink {
    /// Builds the ink for `polarity`; fill and outline always come from the same polarity.
    pub fn new(polarity: TextPolarity, opacity: TextOpacity) -> Self {
        Self {
            fill: with_opacity(polarity.fill(), opacity.fill),
            outline: with_opacity(polarity.outline(), opacity.outline),
        }
    }
}

/// Turns an opaque colour and a 0..=1 opacity into an RGBA colour.
pub fn with_opacity(color: Rgb<u8>, opacity: f32) -> Rgba<u8> {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([color[0], color[1], color[2], alpha])
}

/// Where a piece of text sits relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The inked box is centred on the point.
    Center,
    /// The inked box's bottom-right corner is on the point.
    BottomRight,
}

/// Trait for things the compositor paints onto the working canvas.
///
/// Implemented by [`GridLines`], [`LabelOverlay`], [`Watermark`] and [`TextRun`].
pub trait Drawable {
    /// Draws the object, blending it over what is already on `canvas`.
    fn draw(&self, canvas: &mut Blend<RgbaImage>);
}

/// All vertical and horizontal lines of a layout, at the layout's stroke width.
pub struct GridLines<'a> {
    pub layout: &'a GridLayout,
    pub color: Rgba<u8>,
}

impl Drawable for GridLines<'_> {
    fn draw(&self, canvas: &mut Blend<RgbaImage>) {
        let (width, height) = canvas.dimensions();
        let stroke = self.layout.line_width;

        // Draw vertical grid lines
        for &x in &self.layout.vertical {
            let span = StrokeSpan::snap(x, stroke, width);
            trace!("Vertical line at x={} -> {:?}", x, span);
            let rect = Rect::at(span.start as i32, 0).of_size(span.length, height);
            draw_filled_rect_mut(canvas, rect, self.color);
        }

        // Draw horizontal grid lines
        for &y in &self.layout.horizontal {
            let span = StrokeSpan::snap(y, stroke, height);
            trace!("Horizontal line at y={} -> {:?}", y, span);
            let rect = Rect::at(0, span.start as i32).of_size(width, span.length);
            draw_filled_rect_mut(canvas, rect, self.color);
        }
    }
}

/// One piece of outlined text.
#[derive(Debug, Clone)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub x: f32,
    pub y: f32,
    pub anchor: Anchor,
    pub font_size: f32,
    pub outline_width: f32,
    pub ink: Ink,
}

impl Drawable for TextRun<'_> {
    fn draw(&self, canvas: &mut Blend<RgbaImage>) {
        let masks = rasterize(self.text, self.font_size, self.outline_width);
        let (left, top) = match self.anchor {
            Anchor::Center => (
                self.x - masks.ink_width / 2.0,
                self.y - masks.ink_height / 2.0,
            ),
            Anchor::BottomRight => (self.x - masks.ink_width, self.y - masks.ink_height),
        };
        let origin = (
            left.floor() as i64 - i64::from(masks.pad),
            top.floor() as i64 - i64::from(masks.pad),
        );

        // Outline first, then the fill on top of it
        blend_mask(canvas, &masks.outline, origin, self.ink.outline);
        blend_mask(canvas, &masks.fill, origin, self.ink.fill);
    }
}

/// Blends `color` through `mask` onto `canvas`, with the mask's top-left at `origin`.
fn blend_mask(canvas: &mut Blend<RgbaImage>, mask: &GrayImage, origin: (i64, i64), color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    for (mx, my, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        let x = origin.0 + i64::from(mx);
        let y = origin.1 + i64::from(my);
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            continue;
        }
        let mut ink = color;
        ink[3] = ((u16::from(color[3]) * u16::from(coverage[0])) / 255) as u8;
        canvas.draw_pixel(x as u32, y as u32, ink);
    }
}

/// Every label of a layout, outlined and filled with `ink`.
pub struct LabelOverlay<'a> {
    pub layout: &'a GridLayout,
    pub ink: Ink,
}

impl Drawable for LabelOverlay<'_> {
    fn draw(&self, canvas: &mut Blend<RgbaImage>) {
        let font_size = self.layout.font_size;
        let outline_width = outline_width(font_size);
        for label in &self.layout.labels {
            TextRun {
                text: &label.text,
                x: label.x,
                y: label.y,
                anchor: Anchor::Center,
                font_size,
                outline_width,
                ink: self.ink,
            }
            .draw(canvas);
        }
    }
}

/// A caption in the bottom-right corner of the canvas.
pub struct Watermark<'a> {
    pub text: &'a str,
    /// Distance of the caption's bottom-right corner from the canvas corner.
    pub inset: (u32, u32),
    pub ink: Ink,
}

impl Watermark<'_> {
    pub const OUTLINE_WIDTH: f32 = 1.0;
}

impl Drawable for Watermark<'_> {
    fn draw(&self, canvas: &mut Blend<RgbaImage>) {
        let (width, height) = canvas.dimensions();
        let run = TextRun {
            text: self.text,
            x: width as f32 - self.inset.0 as f32,
            y: height as f32 - self.inset.1 as f32,
            anchor: Anchor::BottomRight,
            font_size: watermark_font_size(width, height),
            outline_width: Self::OUTLINE_WIDTH,
            ink: self.ink,
        };
        debug!("Watermark {:?} at ({}, {})", run.text, run.x, run.y);
        run.draw(canvas);
    }
}
