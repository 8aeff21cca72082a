//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor reachable by any control.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor reachable by any control.
pub const MAX_ZOOM: f64 = 5.0;
/// Bounds of the percentage shown by the zoom buttons.
pub const MIN_ZOOM_PERCENT: i32 = 10;
pub const MAX_ZOOM_PERCENT: i32 = 500;
/// Step applied by the zoom buttons and their shortcuts.
pub const ZOOM_STEP_PERCENT: i32 = 25;
/// Base of the exponential wheel zoom (`zoom * WHEEL_ZOOM_BASE^delta_y`).
pub const WHEEL_ZOOM_BASE: f64 = 0.999;
/// Total margin (both sides) left around content by fit-to-screen.
pub const FIT_MARGIN: f64 = 100.0;
/// Fit-to-screen never magnifies beyond this factor.
pub const FIT_MAX_ZOOM: f64 = 2.0;

/// Viewport manages the view transform for the canvas.
///
/// A screen point is `logical * zoom + pan`. Pan is unconstrained; zoom
/// stays within [`MIN_ZOOM`, `MAX_ZOOM`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Translation in device pixels.
    pub pan: Vec2,
    /// Scale factor (1.0 = 100%).
    zoom: f64,
    /// Size of the visible container in device pixels.
    pub size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0))
    }
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            size,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom rounded to a whole percentage, as shown in the zoom control.
    pub fn zoom_percent(&self) -> i32 {
        (self.zoom * 100.0).round() as i32
    }

    /// Logical → screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen → logical transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// The logical-space region currently visible in the container.
    pub fn visible_rect(&self) -> Rect {
        let origin = self.screen_to_world(Point::ZERO);
        Rect::from_origin_size(
            origin,
            (self.size.width / self.zoom, self.size.height / self.zoom),
        )
    }

    /// Pan by a delta in device pixels. Zoom is unchanged.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom, keeping the given screen point fixed.
    ///
    /// Values outside [`MIN_ZOOM`, `MAX_ZOOM`] are clamped; non-finite
    /// values are ignored.
    pub fn zoom_to_point(&mut self, screen_point: Point, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let new_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        let new_screen = self.world_to_screen(world_point);
        self.pan += screen_point - new_screen;
    }

    /// Exponential wheel zoom toward the pointer.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64) {
        let factor = WHEEL_ZOOM_BASE.powf(delta_y);
        self.zoom_to_point(screen_point, self.zoom * factor);
    }

    /// Step the zoom percentage by `delta` (clamped to 10–500 %) around the
    /// screen origin. Returns the new percentage.
    pub fn step_zoom(&mut self, delta: i32) -> i32 {
        let percent = (self.zoom_percent() + delta).clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT);
        self.zoom_to_point(Point::ZERO, percent as f64 / 100.0);
        percent
    }

    pub fn zoom_in(&mut self) -> i32 {
        self.step_zoom(ZOOM_STEP_PERCENT)
    }

    pub fn zoom_out(&mut self) -> i32 {
        self.step_zoom(-ZOOM_STEP_PERCENT)
    }

    /// Zoom 100%, no pan.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Fit and center the given logical bounds in the container.
    ///
    /// `None` (an empty scene) resets the view instead.
    pub fn fit_to_bounds(&mut self, bounds: Option<Rect>) {
        let Some(bounds) = bounds else {
            self.reset();
            return;
        };
        let scale_x = (self.size.width - FIT_MARGIN) / bounds.width();
        let scale_y = (self.size.height - FIT_MARGIN) / bounds.height();
        let mut zoom = scale_x.min(scale_y).min(FIT_MAX_ZOOM);
        if !zoom.is_finite() || zoom <= 0.0 {
            zoom = MIN_ZOOM;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = Vec2::new(
            (self.size.width - bounds.width() * self.zoom) / 2.0 - bounds.x0 * self.zoom,
            (self.size.height - bounds.height() * self.zoom) / 2.0 - bounds.y0 * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::default();
        assert_eq!(viewport.pan, Vec2::ZERO);
        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);
        assert_eq!(viewport.zoom_percent(), 100);
    }

    #[test]
    fn test_screen_to_world_with_pan_and_zoom() {
        let mut viewport = Viewport::default();
        viewport.pan = Vec2::new(50.0, 100.0);
        viewport.zoom_to_point(Point::new(50.0, 100.0), 2.0);
        let world = viewport.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < 1e-10);
        assert!((world.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::default();
        viewport.pan = Vec2::new(30.0, -20.0);
        viewport.zoom_to_point(Point::ZERO, 1.5);
        let original = Point::new(123.0, 456.0);
        let back = viewport.world_to_screen(viewport.screen_to_world(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_wheel_zoom_keeps_pointer_fixed() {
        let mut viewport = Viewport::default();
        let pointer = Point::new(200.0, 150.0);
        let before = viewport.screen_to_world(pointer);
        viewport.wheel_zoom(pointer, -300.0);
        assert!(viewport.zoom() > 1.0);
        let after = viewport.screen_to_world(pointer);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_always_within_bounds() {
        let mut viewport = Viewport::default();
        for delta in [-100_000.0, -500.0, 0.0, 500.0, 100_000.0, f64::MAX] {
            viewport.wheel_zoom(Point::new(10.0, 10.0), delta);
            assert!(viewport.zoom() >= MIN_ZOOM && viewport.zoom() <= MAX_ZOOM);
        }
        for _ in 0..40 {
            viewport.zoom_in();
            assert!(viewport.zoom_percent() <= MAX_ZOOM_PERCENT);
        }
        for _ in 0..40 {
            viewport.zoom_out();
            assert!(viewport.zoom_percent() >= MIN_ZOOM_PERCENT);
        }
        viewport.zoom_to_point(Point::ZERO, f64::NAN);
        assert!(viewport.zoom() >= MIN_ZOOM);
    }

    #[test]
    fn test_button_steps() {
        let mut viewport = Viewport::default();
        assert_eq!(viewport.zoom_in(), 125);
        assert_eq!(viewport.zoom_out(), 100);
        for _ in 0..20 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.zoom_percent(), 10);
    }

    #[test]
    fn test_zoom_500_then_reset() {
        let mut viewport = Viewport::default();
        viewport.pan_by(Vec2::new(123.0, -45.0));
        for _ in 0..16 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom_percent(), 500);
        viewport.reset();
        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);
        assert_eq!(viewport.pan, Vec2::ZERO);
    }

    #[test]
    fn test_pan_keeps_zoom() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        viewport.pan_by(Vec2::new(10.0, 20.0));
        assert_eq!(viewport.pan, Vec2::new(10.0, 20.0));
        assert_eq!(viewport.zoom_percent(), 125);
    }

    #[test]
    fn test_fit_to_bounds() {
        let mut viewport = Viewport::new(Size::new(800.0, 600.0));
        viewport.fit_to_bounds(Some(Rect::new(0.0, 0.0, 350.0, 250.0)));
        // min(700/350, 500/250, 2) = 2
        assert!((viewport.zoom() - 2.0).abs() < 1e-9);
        let center = viewport.world_to_screen(Point::new(175.0, 125.0));
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);

        viewport.fit_to_bounds(Some(Rect::new(100.0, 100.0, 1500.0, 600.0)));
        assert!((viewport.zoom() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fit_empty_resets() {
        let mut viewport = Viewport::default();
        viewport.pan_by(Vec2::new(5.0, 5.0));
        viewport.zoom_in();
        viewport.fit_to_bounds(None);
        assert_eq!(viewport.zoom_percent(), 100);
        assert_eq!(viewport.pan, Vec2::ZERO);
    }

    #[test]
    fn test_visible_rect() {
        let mut viewport = Viewport::new(Size::new(400.0, 200.0));
        viewport.pan = Vec2::new(-100.0, 0.0);
        let visible = viewport.visible_rect();
        assert_eq!(visible, Rect::new(100.0, 0.0, 500.0, 200.0));
    }
}
