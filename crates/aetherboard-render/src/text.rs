//! Text layout and glyph outlines for rasterized output.
//!
//! Each line is shaped with parley against the embedded sans-serif face and
//! every positioned glyph is turned into a path with skrifa, so the CPU
//! rasterizer fills real letterforms.

use kurbo::{BezPath, Point};
use log::warn;
use parley::fontique::Blob;
use parley::layout::PositionedLayoutItem;
use parley::{Alignment, AlignmentOptions, FontContext, FontFamily, FontStack, LayoutContext, StyleProperty};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};
use std::borrow::Cow;
use std::sync::Arc;

/// Sans-serif face for canvas text.
static CANVAS_FONT: &[u8] = epaint_default_fonts::UBUNTU_LIGHT;

/// Font and layout contexts, kept across lines so the face is registered once.
pub struct TextShaper {
    font_cx: FontContext,
    layout_cx: LayoutContext<()>,
    /// Family name of the registered face; `None` if registration failed.
    family: Option<String>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        let mut font_cx = FontContext::new();
        let registered = font_cx
            .collection
            .register_fonts(Blob::new(Arc::new(CANVAS_FONT)), None);
        let family = match registered.first() {
            Some((id, _)) => font_cx.collection.family_name(*id).map(str::to_owned),
            None => None,
        };
        if family.is_none() {
            warn!("canvas font could not be registered; text will not be drawn");
        }
        Self {
            font_cx,
            layout_cx: LayoutContext::new(),
            family,
        }
    }

    /// Append the outlines of one line of text whose baseline starts at
    /// `baseline` (y grows downward). Returns the number of glyphs drawn.
    pub fn append_line(&mut self, path: &mut BezPath, line: &str, baseline: Point, font_size: f64) -> usize {
        let Some(family) = self.family.as_deref() else {
            return 0;
        };
        if line.trim().is_empty() {
            return 0;
        }

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, line, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size as f32));
        builder.push_default(StyleProperty::FontStack(FontStack::Single(FontFamily::Named(
            Cow::Borrowed(family),
        ))));
        let mut layout = builder.build(line);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let mut drawn = 0;
        for layout_line in layout.lines() {
            for item in layout_line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let run = glyph_run.run();
                let font = run.font();
                let Ok(font_ref) = FontRef::from_index(font.data.data(), font.index) else {
                    continue;
                };
                let outlines = font_ref.outline_glyphs();
                let size = Size::new(run.font_size());
                let mut x = glyph_run.offset();
                for glyph in glyph_run.glyphs() {
                    let origin = Point::new(
                        baseline.x + (x + glyph.x) as f64,
                        baseline.y - glyph.y as f64,
                    );
                    x += glyph.advance;
                    let Some(outline) = outlines.get(GlyphId::new(glyph.id)) else {
                        continue;
                    };
                    let mut pen = PathPen {
                        path: &mut *path,
                        origin,
                    };
                    let settings = DrawSettings::unhinted(size, LocationRef::default());
                    if outline.draw(settings, &mut pen).is_ok() {
                        drawn += 1;
                    }
                }
            }
        }
        drawn
    }
}

/// Receives font-unit outlines (y up) and writes them y-down at `origin`.
struct PathPen<'a> {
    path: &'a mut BezPath,
    origin: Point,
}

impl PathPen<'_> {
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(self.origin.x + x as f64, self.origin.y - y as f64)
    }
}

impl OutlinePen for PathPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (c, p) = (self.point(cx0, cy0), self.point(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (c0, c1, p) = (self.point(cx0, cy0), self.point(cx1, cy1), self.point(x, y));
        self.path.curve_to(c0, c1, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    fn outline(shaper: &mut TextShaper, line: &str) -> (usize, BezPath) {
        let mut path = BezPath::new();
        let glyphs = shaper.append_line(&mut path, line, Point::new(10.0, 100.0), 40.0);
        (glyphs, path)
    }

    #[test]
    fn test_glyphs_sit_on_baseline() {
        let mut shaper = TextShaper::new();
        let (glyphs, path) = outline(&mut shaper, "Hi");
        assert_eq!(glyphs, 2);
        let bounds = path.bounding_box();
        assert!(bounds.y1 <= 100.5, "{bounds:?}");
        assert!(bounds.y0 >= 60.0, "{bounds:?}");
        assert!(bounds.x0 >= 10.0, "{bounds:?}");
    }

    #[test]
    fn test_advances_are_proportional() {
        let mut shaper = TextShaper::new();
        let (_, narrow) = outline(&mut shaper, "il");
        let (_, wide) = outline(&mut shaper, "WM");
        assert!(wide.bounding_box().width() > 2.0 * narrow.bounding_box().width());
    }

    #[test]
    fn test_blank_line_draws_nothing() {
        let mut shaper = TextShaper::new();
        let (glyphs, path) = outline(&mut shaper, "   ");
        assert_eq!(glyphs, 0);
        assert!(path.elements().is_empty());
    }
}
