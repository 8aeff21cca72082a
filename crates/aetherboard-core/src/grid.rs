//! Adaptive infinite background grid.
//!
//! The grid is computed in screen space from the viewport: the logical cell
//! doubles until adjacent lines are at least [`MIN_LINE_SPACING`] pixels
//! apart, so it never becomes a solid wash when zoomed out.

use crate::viewport::Viewport;
use kurbo::{Size, Vec2};

/// Minimum distance between adjacent minor lines on screen.
pub const MIN_LINE_SPACING: f64 = 10.0;
/// The logical cell stops doubling once it reaches this size.
pub const MAX_CELL_SIZE: f64 = 10_000.0;
/// Every n-th line is a major line.
pub const MAJOR_EVERY: f64 = 5.0;
/// Major lines are drawn only if they are at least this far apart on screen.
pub const MIN_MAJOR_SPACING: f64 = 20.0;

/// One family of parallel lines in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLines {
    /// Distance between adjacent lines in device pixels.
    pub spacing: f64,
    /// Position of the first line on each axis, in `[0, spacing)`.
    pub offset: Vec2,
}

impl GridLines {
    fn new(spacing: f64, pan: Vec2) -> Self {
        Self {
            spacing,
            offset: Vec2::new(positive_mod(pan.x, spacing), positive_mod(pan.y, spacing)),
        }
    }

    /// X coordinates of vertical lines across `width`.
    pub fn xs(&self, width: f64) -> impl Iterator<Item = f64> {
        line_positions(self.offset.x, self.spacing, width)
    }

    /// Y coordinates of horizontal lines across `height`.
    pub fn ys(&self, height: f64) -> impl Iterator<Item = f64> {
        line_positions(self.offset.y, self.spacing, height)
    }
}

/// Everything needed to draw the grid for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Effective logical cell size after adaptive doubling.
    pub cell_size: f64,
    pub minor: GridLines,
    pub major: Option<GridLines>,
    /// Area covered, in device pixels.
    pub size: Size,
}

impl GridLayout {
    /// Compute the grid for a base cell size and the current viewport.
    pub fn compute(base_cell: f64, viewport: &Viewport) -> Self {
        let zoom = viewport.zoom();
        let mut cell_size = base_cell.max(f64::MIN_POSITIVE);
        while cell_size * zoom < MIN_LINE_SPACING && cell_size < MAX_CELL_SIZE {
            cell_size *= 2.0;
        }
        let spacing = cell_size * zoom;
        let major_spacing = spacing * MAJOR_EVERY;
        let major = (major_spacing >= MIN_MAJOR_SPACING)
            .then(|| GridLines::new(major_spacing, viewport.pan));
        Self {
            cell_size,
            minor: GridLines::new(spacing, viewport.pan),
            major,
            size: viewport.size,
        }
    }
}

/// Remainder with the sign of the divisor, so offsets are never negative.
fn positive_mod(value: f64, modulus: f64) -> f64 {
    ((value % modulus) + modulus) % modulus
}

fn line_positions(offset: f64, spacing: f64, extent: f64) -> impl Iterator<Item = f64> {
    let count = if spacing > 0.0 && extent > offset {
        ((extent - offset) / spacing).ceil() as usize
    } else {
        0
    };
    (0..count).map(move |i| offset + i as f64 * spacing)
}
