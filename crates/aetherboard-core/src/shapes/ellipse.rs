//! Ellipse and circle shapes.

use super::Geometry;
use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned ellipse anchored at the top-left of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    /// Top-left corner of the bounding box.
    pub position: Point,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
}

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(position: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            position,
            radius_x,
            radius_y,
        }
    }

    /// Create an ellipse inscribed in a rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(
            Point::new(rect.x0, rect.y0),
            rect.width() / 2.0,
            rect.height() / 2.0,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.radius_x,
            self.position.y + self.radius_y,
        )
    }

    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::new(self.center(), (self.radius_x, self.radius_y), 0.0)
    }
}

impl Geometry for Ellipse {
    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + 2.0 * self.radius_x,
            self.position.y + 2.0 * self.radius_y,
        )
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

/// A circle anchored at the top-left of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Top-left corner of the bounding box.
    pub position: Point,
    /// Radius.
    pub radius: f64,
}

impl Circle {
    pub fn new(position: Point, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Circle for a dragged box: the radius follows the longer side so the
    /// circle stays round from any drag direction.
    pub fn from_drag_box(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(left, top), width.max(height) / 2.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.position.x + self.radius, self.position.y + self.radius)
    }
}

impl Geometry for Circle {
    fn bounds(&self) -> Rect {
        let diameter = 2.0 * self.radius;
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + diameter,
            self.position.y + diameter,
        )
    }

    fn to_path(&self) -> BezPath {
        kurbo::Circle::new(self.center(), self.radius).to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
