//! Text shape.

use super::Geometry;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Default font family for new text objects.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.6;
/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.16;

/// A block of (possibly multi-line) text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// Top-left corner of the text box.
    pub position: Point,
    pub content: String,
    /// Font size in logical pixels.
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

impl Text {
    pub fn new(position: Point, content: impl Into<String>, font_size: f64) -> Self {
        Self {
            position,
            content: content.into(),
            font_size,
            font_family: default_font_family(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT
    }

    /// Approximate layout size without a font shaper.
    pub fn approx_size(&self) -> (f64, f64) {
        let longest = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_count = self.lines().count().max(1);
        // Keep an empty text box clickable.
        let width = (longest.max(1) as f64) * self.font_size * CHAR_WIDTH_FACTOR;
        (width, line_count as f64 * self.line_height())
    }

    /// Baseline of each line, top to bottom.
    pub fn baselines(&self) -> impl Iterator<Item = (Point, &str)> {
        let x = self.position.x;
        let top = self.position.y;
        let lh = self.line_height();
        let ascent = self.font_size;
        self.lines()
            .enumerate()
            .map(move |(i, line)| (Point::new(x, top + ascent + i as f64 * lh), line))
    }
}

impl Geometry for Text {
    fn bounds(&self) -> Rect {
        let (w, h) = self.approx_size();
        Rect::from_origin_size(self.position, (w, h))
    }

    fn to_path(&self) -> BezPath {
        self.bounds().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
