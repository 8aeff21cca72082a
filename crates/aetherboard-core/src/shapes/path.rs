//! Path-backed shapes: arrows, clouds and freehand strokes.

use super::Geometry;
use kurbo::{Affine, Arc, BezPath, Point, Rect, Shape as KurboShape, SvgArc, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_6;

/// Length of each arrow-head barb in logical pixels.
pub const ARROW_HEAD_LENGTH: f64 = 14.0;
/// Angle between the shaft and each barb.
pub const ARROW_HEAD_ANGLE: f64 = FRAC_PI_6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Arrow,
    Cloud,
    Freehand,
}

impl PathKind {
    pub fn name(&self) -> &'static str {
        match self {
            PathKind::Arrow => "arrow",
            PathKind::Cloud => "cloud",
            PathKind::Freehand => "freehand",
        }
    }
}

/// A shape described by an arbitrary Bézier path in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    pub kind: PathKind,
    pub path: BezPath,
}

impl PathShape {
    pub fn new(kind: PathKind, path: BezPath) -> Self {
        Self { kind, path }
    }

    /// Shaft from `start` to `end` plus a two-barb head at `end`.
    pub fn arrow(start: Point, end: Point) -> Self {
        let dir = end - start;
        let angle = dir.y.atan2(dir.x);
        let barb = |offset: f64| {
            let a = angle + offset;
            Point::new(
                end.x - ARROW_HEAD_LENGTH * a.cos(),
                end.y - ARROW_HEAD_LENGTH * a.sin(),
            )
        };
        let mut path = BezPath::new();
        path.move_to(start);
        path.line_to(end);
        path.move_to(barb(-ARROW_HEAD_ANGLE));
        path.line_to(end);
        path.line_to(barb(ARROW_HEAD_ANGLE));
        Self::new(PathKind::Arrow, path)
    }

    /// Four-lobed cloud filling the drag box at `(left, top)`.
    pub fn cloud(left: f64, top: f64, width: f64, height: f64) -> Self {
        let (w, h) = (width, height);
        let origin = Vec2::new(left, top);
        let start = Point::new(0.25 * w, 0.6 * h) + origin;
        // Relative end point and radii for each lobe, clockwise from bottom-left.
        let lobes = [
            (Vec2::new(0.15 * w, -0.15 * h), Vec2::new(0.15 * w, 0.15 * h)),
            (Vec2::new(0.35 * w, 0.0), Vec2::new(0.2 * w, 0.2 * h)),
            (Vec2::new(0.15 * w, 0.15 * h), Vec2::new(0.15 * w, 0.15 * h)),
            (Vec2::new(0.0, 0.15 * h), Vec2::new(0.1 * w, 0.1 * h)),
        ];
        let mut path = BezPath::new();
        path.move_to(start);
        let mut current = start;
        for (delta, radii) in lobes {
            let to = current + delta;
            let svg_arc = SvgArc {
                from: current,
                to,
                radii,
                x_rotation: 0.0,
                large_arc: true,
                sweep: true,
            };
            match Arc::from_svg_arc(&svg_arc) {
                Some(arc) => path.extend(arc.append_iter(0.1)),
                None => path.line_to(to),
            }
            current = to;
        }
        path.close_path();
        Self::new(PathKind::Cloud, path)
    }

    /// Smoothed stroke through the sampled pointer positions.
    ///
    /// Interior samples become quadratic control points with the curve
    /// passing through the midpoints between them. A single sample becomes
    /// a zero-length segment so that a click still leaves a dot.
    pub fn freehand(points: &[Point]) -> Self {
        let mut path = BezPath::new();
        match points {
            [] => {}
            [only] => {
                path.move_to(*only);
                path.line_to(*only);
            }
            [first, rest @ ..] => {
                path.move_to(*first);
                for pair in points.windows(2).skip(1) {
                    path.quad_to(pair[0], pair[0].midpoint(pair[1]));
                }
                if let Some(last) = rest.last() {
                    path.line_to(*last);
                }
            }
        }
        Self::new(PathKind::Freehand, path)
    }
}

impl Geometry for PathShape {
    fn bounds(&self) -> Rect {
        self.path.bounding_box()
    }

    fn to_path(&self) -> BezPath {
        self.path.clone()
    }

    fn translate(&mut self, delta: Vec2) {
        self.path.apply_affine(Affine::translate(delta));
    }

    fn is_closed(&self) -> bool {
        self.kind == PathKind::Cloud
    }
}
