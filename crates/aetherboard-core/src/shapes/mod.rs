//! Drawable object definitions for the whiteboard.
//!
//! Every drawable is a [`Shape`]: a shared envelope (identity, style,
//! rotation, flip flags, interaction flags) around a variant-specific
//! [`ShapeKind`] payload.

mod ellipse;
mod group;
mod image;
mod line;
mod path;
mod polygon;
mod rectangle;
mod text;
mod triangle;

pub use ellipse::{Circle, Ellipse};
pub use group::Group;
pub use image::{Image, ImageFormat};
pub use line::Line;
pub use path::{ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, PathKind, PathShape};
pub use polygon::{HEART_SAMPLES, Polygon, PolygonKind};
pub use rectangle::Rectangle;
pub use text::Text;
pub use triangle::Triangle;

use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape as KurboShape, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Same color with a different alpha channel.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. Returns `None` for anything else.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// `#rrggbb` (opaque colors) or `#rrggbbaa`.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Alpha as a fraction in `[0, 1]`.
    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties shared by every drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width in logical pixels.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn scale_alpha(color: Color, opacity: f64) -> Color {
    let rgba = color.to_rgba8();
    let alpha = (rgba.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, alpha)
}

impl ShapeStyle {
    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        scale_alpha(self.stroke_color.into(), self.opacity)
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| scale_alpha(c.into(), self.opacity))
    }

    /// Whether the outline is drawn at all.
    pub fn has_stroke(&self) -> bool {
        self.stroke_width > 0.0 && self.stroke_color.a > 0
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

/// Variant-specific geometry, expressed in logical (world) coordinates
/// before the envelope's flip and rotation are applied.
pub trait Geometry {
    /// Axis-aligned bounds of the untransformed geometry.
    fn bounds(&self) -> Rect;

    /// Outline used for rendering and hit testing.
    fn to_path(&self) -> BezPath;

    /// Move the geometry by a delta.
    fn translate(&mut self, delta: Vec2);

    /// Whether the outline encloses an area that a fill can cover.
    fn is_closed(&self) -> bool {
        true
    }
}

/// Variant payload of a drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle(Rectangle),
    Circle(Circle),
    Ellipse(Ellipse),
    Triangle(Triangle),
    Line(Line),
    Polygon(Polygon),
    Path(PathShape),
    Text(Text),
    Image(Image),
    Group(Group),
}

impl ShapeKind {
    fn geometry(&self) -> &dyn Geometry {
        match self {
            ShapeKind::Rectangle(s) => s,
            ShapeKind::Circle(s) => s,
            ShapeKind::Ellipse(s) => s,
            ShapeKind::Triangle(s) => s,
            ShapeKind::Line(s) => s,
            ShapeKind::Polygon(s) => s,
            ShapeKind::Path(s) => s,
            ShapeKind::Text(s) => s,
            ShapeKind::Image(s) => s,
            ShapeKind::Group(s) => s,
        }
    }

    fn geometry_mut(&mut self) -> &mut dyn Geometry {
        match self {
            ShapeKind::Rectangle(s) => s,
            ShapeKind::Circle(s) => s,
            ShapeKind::Ellipse(s) => s,
            ShapeKind::Triangle(s) => s,
            ShapeKind::Line(s) => s,
            ShapeKind::Polygon(s) => s,
            ShapeKind::Path(s) => s,
            ShapeKind::Text(s) => s,
            ShapeKind::Image(s) => s,
            ShapeKind::Group(s) => s,
        }
    }

    /// Short lowercase name, as used in serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle(_) => "rectangle",
            ShapeKind::Circle(_) => "circle",
            ShapeKind::Ellipse(_) => "ellipse",
            ShapeKind::Triangle(_) => "triangle",
            ShapeKind::Line(_) => "line",
            ShapeKind::Polygon(p) => p.kind.name(),
            ShapeKind::Path(p) => p.kind.name(),
            ShapeKind::Text(_) => "text",
            ShapeKind::Image(_) => "image",
            ShapeKind::Group(_) => "group",
        }
    }
}

macro_rules! impl_into_kind {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ShapeKind {
                fn from(value: $ty) -> Self {
                    ShapeKind::$variant(value)
                }
            }
        )*
    };
}

impl_into_kind! {
    Rectangle => Rectangle,
    Circle => Circle,
    Ellipse => Ellipse,
    Triangle => Triangle,
    Line => Line,
    Polygon => Polygon,
    Path => PathShape,
    Text => Text,
    Image => Image,
    Group => Group,
}

/// A drawable object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub(crate) id: ShapeId,
    /// Variant payload.
    pub kind: ShapeKind,
    /// Style properties.
    pub style: ShapeStyle,
    /// Rotation in radians around the geometry center.
    #[serde(default)]
    pub rotation: f64,
    /// Mirror around the vertical axis through the center.
    #[serde(default)]
    pub flip_x: bool,
    /// Mirror around the horizontal axis through the center.
    #[serde(default)]
    pub flip_y: bool,
    /// Whether the object can become part of a selection.
    #[serde(default = "default_true")]
    pub selectable: bool,
    /// Whether the object receives pointer hits.
    #[serde(default = "default_true")]
    pub evented: bool,
    /// Set on transient preview objects; never serialized or exported.
    #[serde(skip)]
    pub exclude_from_export: bool,
}

impl Shape {
    /// Create a shape with the default style.
    pub fn new(kind: impl Into<ShapeKind>) -> Self {
        Self::with_style(kind, ShapeStyle::default())
    }

    /// Create a shape with a specific style.
    pub fn with_style(kind: impl Into<ShapeKind>, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            style,
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
            selectable: true,
            evented: true,
            exclude_from_export: false,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Bounds of the untransformed geometry.
    pub fn geometry_bounds(&self) -> Rect {
        self.kind.geometry().bounds()
    }

    /// Pivot for flips and rotation.
    pub fn center(&self) -> Point {
        self.geometry_bounds().center()
    }

    /// Untransformed outline.
    pub fn to_path(&self) -> BezPath {
        self.kind.geometry().to_path()
    }

    /// Flip and rotation around the geometry center.
    pub fn render_transform(&self) -> Affine {
        if !self.flip_x && !self.flip_y && self.rotation == 0.0 {
            return Affine::IDENTITY;
        }
        let center = self.center().to_vec2();
        let sx = if self.flip_x { -1.0 } else { 1.0 };
        let sy = if self.flip_y { -1.0 } else { 1.0 };
        Affine::translate(center)
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate(-center)
    }

    /// Outline with flip and rotation applied.
    pub fn visual_path(&self) -> BezPath {
        let mut path = self.to_path();
        path.apply_affine(self.render_transform());
        path
    }

    /// Axis-aligned bounds as the object appears on the canvas.
    pub fn bounds(&self) -> Rect {
        self.render_transform()
            .transform_rect_bbox(self.geometry_bounds())
    }

    /// Whether the outline encloses an area.
    pub fn is_closed(&self) -> bool {
        self.kind.geometry().is_closed()
    }

    /// Check if a point (in world coordinates) hits this shape.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if !self.evented {
            return false;
        }
        let local = self.render_transform().inverse() * point;
        match &self.kind {
            ShapeKind::Group(group) => group
                .children
                .iter()
                .any(|child| child.hit_test(local, tolerance)),
            ShapeKind::Text(_) | ShapeKind::Image(_) => self
                .geometry_bounds()
                .inflate(tolerance, tolerance)
                .contains(local),
            _ => {
                let path = self.to_path();
                if self.style.fill_color.is_some()
                    && self.is_closed()
                    && path.contains(local)
                {
                    return true;
                }
                let reach = tolerance + self.style.stroke_width / 2.0;
                point_to_path_dist(local, &path) <= reach
            }
        }
    }

    /// Test if this shape intersects a selection rectangle.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        let bounds = self.bounds();
        rect.intersect(bounds.inflate(1.0, 1.0)).area() > 0.0
    }

    /// Move the shape by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.kind.geometry_mut().translate(delta);
    }

    /// Move the shape so its visual top-left corner lands on `(left, top)`.
    pub fn set_position(&mut self, left: f64, top: f64) {
        let bounds = self.bounds();
        self.translate(Vec2::new(left - bounds.x0, top - bounds.y0));
    }

    /// Give the shape (and, for groups, every descendant) a fresh id.
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
        if let ShapeKind::Group(group) = &mut self.kind {
            for child in &mut group.children {
                child.regenerate_id();
            }
        }
    }

    /// Check if this shape is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ShapeKind::Group(_))
    }

    /// Get the group if this shape is a group.
    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            ShapeKind::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Get the text if this shape is a text object.
    pub fn as_text(&self) -> Option<&Text> {
        match &self.kind {
            ShapeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get mutable text if this shape is a text object.
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match &mut self.kind {
            ShapeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Fold a parent group's flip and rotation into this child so that it
    /// keeps its on-canvas appearance once the group is dissolved.
    pub(crate) fn bake_parent_transform(&mut self, parent: Affine, flip_x: bool, flip_y: bool, rotation: f64) {
        let center = self.center();
        let new_center = parent * center;
        self.translate(new_center - center);
        // An odd number of mirror axes reverses the sense of rotation.
        let mirrored = flip_x != flip_y;
        self.rotation = if mirrored {
            rotation - self.rotation
        } else {
            rotation + self.rotation
        };
        self.flip_x ^= flip_x;
        self.flip_y ^= flip_y;
        if self.flip_x && self.flip_y {
            // Flipping both axes is a half-turn.
            self.flip_x = false;
            self.flip_y = false;
            self.rotation += std::f64::consts::PI;
        }
        self.rotation = normalize_angle(self.rotation);
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    if a.abs() < 1e-12 { 0.0 } else { a }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to the flattened outline of a path.
pub fn point_to_path_dist(point: Point, path: &BezPath) -> f64 {
    let mut best = f64::INFINITY;
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(path.iter(), 0.25, |el| match el {
        PathEl::MoveTo(p) => {
            start = p;
            last = p;
        }
        PathEl::LineTo(p) => {
            best = best.min(point_to_segment_dist(point, last, p));
            last = p;
        }
        PathEl::ClosePath => {
            best = best.min(point_to_segment_dist(point, last, start));
            last = start;
        }
        _ => {}
    });
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_hex_roundtrip() {
        let c = SerializableColor::from_hex("#C6A667").unwrap();
        assert_eq!(c, SerializableColor::new(0xC6, 0xA6, 0x67, 255));
        assert_eq!(c.to_hex(), "#c6a667");
        let short = SerializableColor::from_hex("#fff").unwrap();
        assert_eq!(short, SerializableColor::white());
        let with_alpha = SerializableColor::from_hex("#11223350").unwrap();
        assert_eq!(with_alpha.a, 0x50);
        assert!(SerializableColor::from_hex("red").is_none());
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let style = ShapeStyle {
            opacity: 0.5,
            fill_color: Some(SerializableColor::white()),
            ..ShapeStyle::default()
        };
        let fill = SerializableColor::from(style.fill_with_opacity().unwrap());
        assert_eq!(fill.a, 128);
    }

    #[test]
    fn test_flip_keeps_bounds() {
        let mut shape = Shape::new(Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0));
        let before = shape.bounds();
        shape.flip_x = true;
        shape.flip_y = true;
        let after = shape.bounds();
        assert!((before.x0 - after.x0).abs() < 1e-9);
        assert!((before.y1 - after.y1).abs() < 1e-9);
        assert_eq!(shape.geometry_bounds(), before);
    }

    #[test]
    fn test_rotation_changes_visual_bounds() {
        let mut shape = Shape::new(Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0));
        shape.rotation = FRAC_PI_2;
        let bounds = shape.bounds();
        assert!((bounds.width() - 50.0).abs() < 1e-9);
        assert!((bounds.height() - 100.0).abs() < 1e-9);
        assert!((bounds.center().x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_outline_and_fill() {
        let mut shape = Shape::new(Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0));
        assert!(shape.hit_test(Point::new(0.0, 50.0), 1.0));
        assert!(!shape.hit_test(Point::new(50.0, 50.0), 1.0));
        shape.style.fill_color = Some(SerializableColor::white());
        assert!(shape.hit_test(Point::new(50.0, 50.0), 1.0));
        shape.evented = false;
        assert!(!shape.hit_test(Point::new(50.0, 50.0), 1.0));
    }

    #[test]
    fn test_set_position_moves_visual_corner() {
        let mut shape = Shape::new(Circle::new(Point::new(40.0, 40.0), 25.0));
        shape.set_position(0.0, 10.0);
        let bounds = shape.bounds();
        assert!(bounds.x0.abs() < 1e-9);
        assert!((bounds.y0 - 10.0).abs() < 1e-9);
        assert!((bounds.width() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_serde_tagged_kind() {
        let shape = Shape::new(Line::new(Point::new(0.0, 0.0), Point::new(5.0, 5.0)));
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"type\":\"line\""));
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn test_normalize_angle() {
        use std::f64::consts::PI;
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-9);
        assert_eq!(normalize_angle(2.0 * PI), 0.0);
    }
}
