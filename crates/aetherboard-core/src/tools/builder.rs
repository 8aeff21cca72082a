//! Shape construction for the drawing tools.
//!
//! Every shape tool turns a start point and a current/end point into a
//! [`Shape`]. Previews and committed shapes use the same geometry; previews
//! are additionally faded and flagged so they never behave like scene
//! objects.

use super::{DrawStyle, ToolKind};
use crate::shapes::{
    Circle, Ellipse, Line, PathShape, Polygon, Rectangle, SerializableColor, Shape, ShapeStyle,
    Text, Triangle,
};
use crate::snap;
use kurbo::{Point, Rect};

/// Drags smaller than this on both axes show no preview.
pub const PREVIEW_THRESHOLD: f64 = 3.0;
/// Gestures smaller than this on both axes count as a click.
pub const CLICK_THRESHOLD: f64 = 10.0;
/// Size of the shape created by a click.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;
/// Opacity multiplier applied to previews.
pub const PREVIEW_OPACITY: f64 = 0.6;

pub const TEXT_PLACEHOLDER: &str = "Click to edit";
pub const TEXT_FONT_SIZE: f64 = 18.0;

pub const STICKY_WIDTH: f64 = 180.0;
pub const STICKY_HEIGHT: f64 = 140.0;
pub const STICKY_CORNER_RADIUS: f64 = 8.0;
pub const STICKY_BORDER_WIDTH: f64 = 2.0;
pub const STICKY_TEXT_INSET: f64 = 12.0;
pub const STICKY_FONT_SIZE: f64 = 14.0;
pub const STICKY_PLACEHOLDER: &str = "Note...";
pub const STICKY_TEXT_COLOR: SerializableColor = SerializableColor::new(0x37, 0x41, 0x51, 255);

/// Note background / border pairs, used in rotation.
pub const STICKY_COLORS: [(SerializableColor, SerializableColor); 6] = [
    (
        SerializableColor::new(0xFE, 0xF3, 0xC7, 255),
        SerializableColor::new(0xF5, 0x9E, 0x0B, 255),
    ),
    (
        SerializableColor::new(0xDC, 0xFC, 0xE7, 255),
        SerializableColor::new(0x22, 0xC5, 0x5E, 255),
    ),
    (
        SerializableColor::new(0xDB, 0xEA, 0xFE, 255),
        SerializableColor::new(0x3B, 0x82, 0xF6, 255),
    ),
    (
        SerializableColor::new(0xFC, 0xE7, 0xF3, 255),
        SerializableColor::new(0xEC, 0x48, 0x99, 255),
    ),
    (
        SerializableColor::new(0xF3, 0xE8, 0xFF, 255),
        SerializableColor::new(0xA8, 0x55, 0xF7, 255),
    ),
    (
        SerializableColor::new(0xFE, 0xE2, 0xE2, 255),
        SerializableColor::new(0xEF, 0x44, 0x44, 255),
    ),
];

/// Normalized box spanned by two points.
pub fn drag_box(start: Point, current: Point) -> Rect {
    Rect::from_points(start, current)
}

/// Final placement of a drawn shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Box used by box-anchored and center-anchored shapes.
    pub rect: Rect,
    /// Endpoints used by line-like shapes.
    pub start: Point,
    pub end: Point,
}

/// Resolve the committed geometry for a gesture.
///
/// A click becomes a [`DEFAULT_SHAPE_SIZE`] box centered on the start point
/// (line-like shapes run corner to corner across it). With `snap_grid`, the
/// box snaps to whole cells and the endpoints to grid intersections.
pub fn placement(start: Point, end: Point, snap_grid: Option<f64>) -> Placement {
    let mut rect = drag_box(start, end);
    let (mut p0, mut p1) = (start, end);
    if rect.width() < CLICK_THRESHOLD && rect.height() < CLICK_THRESHOLD {
        let half = DEFAULT_SHAPE_SIZE / 2.0;
        rect = Rect::new(start.x - half, start.y - half, start.x + half, start.y + half);
        p0 = Point::new(rect.x0, rect.y0);
        p1 = Point::new(rect.x1, rect.y1);
    }
    if let Some(grid) = snap_grid {
        rect = snap::snap_box(rect, grid);
        p0 = snap::snap_to_grid(p0, grid);
        p1 = snap::snap_to_grid(p1, grid);
    }
    Placement {
        rect,
        start: p0,
        end: p1,
    }
}

/// Build the shape a tool produces for the given placement.
///
/// Returns `None` for tools that do not draw by dragging.
pub fn build_shape(tool: ToolKind, placement: &Placement, style: &DrawStyle) -> Option<Shape> {
    let rect = placement.rect;
    let (w, h) = (rect.width(), rect.height());
    let center = rect.center();
    let filled = style.filled_style();
    let outline = style.outline_style();
    let shape = match tool {
        ToolKind::Rectangle => Shape::with_style(
            Rectangle::from_rect(rect).with_corner_radius(style.corner_radius),
            filled,
        ),
        ToolKind::Circle => Shape::with_style(Circle::from_drag_box(rect.x0, rect.y0, w, h), filled),
        ToolKind::Ellipse => Shape::with_style(Ellipse::from_rect(rect), filled),
        ToolKind::Triangle => Shape::with_style(Triangle::new(Point::new(rect.x0, rect.y0), w, h), filled),
        ToolKind::Line | ToolKind::Connector => {
            Shape::with_style(Line::new(placement.start, placement.end), outline)
        }
        ToolKind::Arrow => Shape::with_style(PathShape::arrow(placement.start, placement.end), outline),
        ToolKind::Diamond => Shape::with_style(Polygon::diamond(center, w, h), filled),
        ToolKind::Star => Shape::with_style(Polygon::star(center, w, h), filled),
        ToolKind::Hexagon => Shape::with_style(Polygon::hexagon(center, w, h), filled),
        ToolKind::Pentagon => Shape::with_style(Polygon::pentagon(center, w, h), filled),
        ToolKind::Heart => Shape::with_style(Polygon::heart(center, w, h), filled),
        ToolKind::Cloud => Shape::with_style(PathShape::cloud(rect.x0, rect.y0, w, h), filled),
        ToolKind::Select
        | ToolKind::Hand
        | ToolKind::Pen
        | ToolKind::Highlighter
        | ToolKind::Eraser
        | ToolKind::Text
        | ToolKind::Sticky => return None,
    };
    Some(shape)
}

/// Faded, non-interactive stand-in shown while dragging.
///
/// Returns `None` while the pointer is still within [`PREVIEW_THRESHOLD`]
/// of the start on both axes.
pub fn build_preview(tool: ToolKind, start: Point, current: Point, style: &DrawStyle) -> Option<Shape> {
    let rect = drag_box(start, current);
    if rect.width() < PREVIEW_THRESHOLD && rect.height() < PREVIEW_THRESHOLD {
        return None;
    }
    let placement = Placement {
        rect,
        start,
        end: current,
    };
    let mut shape = build_shape(tool, &placement, style)?;
    mark_as_preview(&mut shape);
    Some(shape)
}

/// Fade a shape and take it out of hit testing, selection and export.
pub fn mark_as_preview(shape: &mut Shape) {
    shape.style.opacity *= PREVIEW_OPACITY;
    shape.selectable = false;
    shape.evented = false;
    shape.exclude_from_export = true;
}

/// Editable text placed by the text tool.
pub fn text_shape(point: Point, style: &DrawStyle) -> Shape {
    let text_style = ShapeStyle {
        stroke_color: SerializableColor::transparent(),
        stroke_width: 0.0,
        fill_color: Some(style.color),
        opacity: style.opacity,
    };
    Shape::with_style(Text::new(point, TEXT_PLACEHOLDER, TEXT_FONT_SIZE), text_style)
}

/// Note rectangle and its text, in stacking order.
pub fn sticky_shapes(point: Point, palette_index: usize) -> (Shape, Shape) {
    let (background, border) = STICKY_COLORS[palette_index % STICKY_COLORS.len()];
    let note = Shape::with_style(
        Rectangle::new(point, STICKY_WIDTH, STICKY_HEIGHT).with_corner_radius(STICKY_CORNER_RADIUS),
        ShapeStyle {
            stroke_color: border,
            stroke_width: STICKY_BORDER_WIDTH,
            fill_color: Some(background),
            opacity: 1.0,
        },
    );
    let text = Shape::with_style(
        Text::new(
            Point::new(point.x + STICKY_TEXT_INSET, point.y + STICKY_TEXT_INSET),
            STICKY_PLACEHOLDER,
            STICKY_FONT_SIZE,
        ),
        ShapeStyle {
            stroke_color: SerializableColor::transparent(),
            stroke_width: 0.0,
            fill_color: Some(STICKY_TEXT_COLOR),
            opacity: 1.0,
        },
    );
    (note, text)
}
