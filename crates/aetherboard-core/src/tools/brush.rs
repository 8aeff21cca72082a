//! Freehand brushes for the pen, highlighter and eraser tools.

use super::{DrawStyle, ToolKind};
use crate::shapes::{PathShape, SerializableColor, Shape, ShapeStyle};
use kurbo::Point;

/// Alpha applied to the active color by the highlighter.
pub const HIGHLIGHTER_ALPHA: u8 = 0x50;
/// Highlighter width relative to the stroke width.
pub const HIGHLIGHTER_WIDTH_FACTOR: f64 = 8.0;
/// Eraser width relative to the stroke width.
pub const ERASER_WIDTH_FACTOR: f64 = 5.0;

/// Color and width of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: SerializableColor,
    pub width: f64,
}

impl Brush {
    /// Brush for a freehand tool, or `None` for other tools.
    ///
    /// The eraser paints with the canvas background, so strokes cover what
    /// is underneath rather than removing objects.
    pub fn for_tool(tool: ToolKind, style: &DrawStyle, background: SerializableColor) -> Option<Self> {
        let brush = match tool {
            ToolKind::Pen => Self {
                color: style.color,
                width: style.stroke_width,
            },
            ToolKind::Highlighter => Self {
                color: style.color.with_alpha(HIGHLIGHTER_ALPHA),
                width: style.stroke_width * HIGHLIGHTER_WIDTH_FACTOR,
            },
            ToolKind::Eraser => Self {
                color: background,
                width: style.stroke_width * ERASER_WIDTH_FACTOR,
            },
            _ => return None,
        };
        Some(brush)
    }

    /// Turn sampled points into a smoothed stroke. Needs at least two points.
    pub fn stroke(&self, points: &[Point]) -> Option<Shape> {
        if points.len() < 2 {
            return None;
        }
        Some(Shape::with_style(
            PathShape::freehand(points),
            ShapeStyle {
                stroke_color: self.color,
                stroke_width: self.width,
                fill_color: None,
                opacity: 1.0,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_per_tool() {
        let style = DrawStyle::default();
        let background = SerializableColor::new(0xFA, 0xFA, 0xFA, 255);

        let pen = Brush::for_tool(ToolKind::Pen, &style, background).unwrap();
        assert_eq!(pen.color, style.color);
        assert!((pen.width - 2.0).abs() < f64::EPSILON);

        let highlighter = Brush::for_tool(ToolKind::Highlighter, &style, background).unwrap();
        assert_eq!(highlighter.color.a, HIGHLIGHTER_ALPHA);
        assert_eq!(highlighter.color.r, style.color.r);
        assert!((highlighter.width - 16.0).abs() < f64::EPSILON);

        let eraser = Brush::for_tool(ToolKind::Eraser, &style, background).unwrap();
        assert_eq!(eraser.color, background);
        assert!((eraser.width - 10.0).abs() < f64::EPSILON);

        assert!(Brush::for_tool(ToolKind::Rectangle, &style, background).is_none());
    }

    #[test]
    fn test_stroke_needs_two_points() {
        let brush = Brush {
            color: SerializableColor::black(),
            width: 3.0,
        };
        assert!(brush.stroke(&[Point::new(1.0, 1.0)]).is_none());
        let shape = brush
            .stroke(&[Point::new(0.0, 0.0), Point::new(10.0, 5.0), Point::new(20.0, 0.0)])
            .unwrap();
        assert_eq!(shape.kind.name(), "freehand");
        assert!(shape.style.fill_color.is_none());
        assert!(!shape.is_closed());
    }
}
