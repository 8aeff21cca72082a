//! Center-anchored polygons: diamond, star, regular N-gons and heart.

use super::Geometry;
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Number of samples taken along the heart curve.
pub const HEART_SAMPLES: usize = 30;

/// Which tool produced a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolygonKind {
    Diamond,
    Star,
    Hexagon,
    Pentagon,
    Heart,
}

impl PolygonKind {
    pub fn name(&self) -> &'static str {
        match self {
            PolygonKind::Diamond => "diamond",
            PolygonKind::Star => "star",
            PolygonKind::Hexagon => "hexagon",
            PolygonKind::Pentagon => "pentagon",
            PolygonKind::Heart => "heart",
        }
    }
}

/// A closed polygon whose vertices are stored relative to its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub kind: PolygonKind,
    /// Anchor point; vertex offsets are relative to it.
    pub center: Point,
    /// Vertex offsets from the center.
    pub points: Vec<Vec2>,
}

impl Polygon {
    pub fn new(kind: PolygonKind, center: Point, points: Vec<Vec2>) -> Self {
        Self {
            kind,
            center,
            points,
        }
    }

    /// Rhombus through the edge midpoints of a `width` × `height` box.
    pub fn diamond(center: Point, width: f64, height: f64) -> Self {
        Self::new(PolygonKind::Diamond, center, diamond_points(width, height))
    }

    /// Five-point star fitted to the smaller side of the drag box.
    pub fn star(center: Point, width: f64, height: f64) -> Self {
        let outer = width.min(height) / 2.0;
        Self::new(PolygonKind::Star, center, star_points(5, outer, outer / 2.0))
    }

    pub fn hexagon(center: Point, width: f64, height: f64) -> Self {
        let radius = width.min(height) / 2.0;
        Self::new(PolygonKind::Hexagon, center, regular_polygon_points(6, radius))
    }

    pub fn pentagon(center: Point, width: f64, height: f64) -> Self {
        let radius = width.min(height) / 2.0;
        Self::new(PolygonKind::Pentagon, center, regular_polygon_points(5, radius))
    }

    pub fn heart(center: Point, width: f64, height: f64) -> Self {
        let size = width.min(height) / 2.0;
        Self::new(PolygonKind::Heart, center, heart_points(size, HEART_SAMPLES))
    }

    /// Vertices in world coordinates.
    pub fn world_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(|offset| self.center + *offset)
    }
}

impl Geometry for Polygon {
    fn bounds(&self) -> Rect {
        let mut points = self.world_points();
        let Some(first) = points.next() else {
            return Rect::from_origin_size(self.center, (0.0, 0.0));
        };
        points.fold(Rect::from_points(first, first), |rect, p| {
            rect.union_pt(p)
        })
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.world_points();
        if let Some(first) = points.next() {
            path.move_to(first);
            for p in points {
                path.line_to(p);
            }
            path.close_path();
        }
        path
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }
}

/// Alternating outer/inner vertices, starting straight up.
pub fn star_points(points: usize, outer: f64, inner: f64) -> Vec<Vec2> {
    let step = PI / points as f64;
    (0..2 * points)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = i as f64 * step - FRAC_PI_2;
            Vec2::new(r * a.cos(), r * a.sin())
        })
        .collect()
}

/// Evenly spaced vertices on a circle, starting straight up.
pub fn regular_polygon_points(sides: usize, radius: f64) -> Vec<Vec2> {
    (0..sides)
        .map(|i| {
            let a = i as f64 * TAU / sides as f64 - FRAC_PI_2;
            Vec2::new(radius * a.cos(), radius * a.sin())
        })
        .collect()
}

pub fn diamond_points(width: f64, height: f64) -> Vec<Vec2> {
    let (hw, hh) = (width / 2.0, height / 2.0);
    vec![
        Vec2::new(0.0, -hh),
        Vec2::new(hw, 0.0),
        Vec2::new(0.0, hh),
        Vec2::new(-hw, 0.0),
    ]
}

/// Classic parametric heart:
/// `x = 16 sin³t`, `y = -(13 cos t - 5 cos 2t - 2 cos 3t - cos 4t)`, scaled by `size / 16`.
pub fn heart_points(size: f64, samples: usize) -> Vec<Vec2> {
    (0..samples)
        .map(|i| {
            let t = i as f64 / samples as f64 * TAU;
            let x = size * t.sin().powi(3);
            let y = -size
                * (13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos())
                / 16.0;
            Vec2::new(x, y)
        })
        .collect()
}
