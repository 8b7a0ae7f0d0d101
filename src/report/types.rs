//! Page model produced by the layout engine.
//!
//! A `Document` is plain data: pages of draw operations positioned in
//! millimetres from the top-left corner of the page. The PDF writer is the
//! only consumer that knows about PDF coordinates and fonts.

use image::DynamicImage;

/// RGB color, 0-255 per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const ERROR_RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    pub const RULE_GRAY: Rgb = Rgb { r: 200, g: 200, b: 200 };

    /// Channels scaled to the 0.0-1.0 range
    pub fn unit(&self) -> (f32, f32, f32) {
        (self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0)
    }
}

/// Font face within the report's single font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// `x` is where the text starts
    Left,
    /// `x` is where the text ends
    Right,
}

/// One drawing primitive. All positions are millimetres from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Single line of text; `y` is the baseline
    Text { x: f32, y: f32, text: String, size: f32, style: FontStyle, color: Rgb, align: Align },
    /// Image box with its top-left corner at (`x`, `y`); `image` indexes `Document::images`
    Image { x: f32, y: f32, width: f32, height: f32, image: usize },
    /// Clickable area opening `url`
    Link { x: f32, y: f32, width: f32, height: f32, url: String },
    /// Horizontal line from `x1` to `x2`
    Rule { x1: f32, x2: f32, y: f32, color: Rgb },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text drawn on this page, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Finished report layout
#[derive(Debug, Clone)]
pub struct Document {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub pages: Vec<Page>,
    pub images: Vec<DynamicImage>,
    /// Data rows laid out
    pub entries: usize,
    /// Images that could not be fetched or decoded
    pub failed_images: usize,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every text op across all pages, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| p.texts())
    }
}
