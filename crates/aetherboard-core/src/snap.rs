//! Grid snapping for committed shapes.

use kurbo::{Point, Rect};

/// Default grid cell size in logical pixels (matches the visual grid).
pub const GRID_SIZE: f64 = 40.0;

/// Round a coordinate to the nearest grid line.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Round an extent to whole cells, never collapsing below one cell.
pub fn snap_extent(extent: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return extent;
    }
    snap_value(extent, grid_size).max(grid_size)
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

/// Snap a shape's placement box: left/top to grid lines, width/height to
/// whole cells (at least one).
pub fn snap_box(rect: Rect, grid_size: f64) -> Rect {
    let left = snap_value(rect.x0, grid_size);
    let top = snap_value(rect.y0, grid_size);
    Rect::from_origin_size(
        (left, top),
        (
            snap_extent(rect.width(), grid_size),
            snap_extent(rect.height(), grid_size),
        ),
    )
}
