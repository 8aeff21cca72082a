//! Minimap projection: a fixed-scale overview of the scene and the viewport.

use crate::config::CanvasTheme;
use crate::scene::Scene;
use crate::shapes::SerializableColor;
use crate::viewport::Viewport;
use kurbo::{Rect, Size};

/// Pixel size of the minimap surface.
pub const MINIMAP_SIZE: Size = Size::new(150.0, 100.0);
/// Fill of objects without a fill color.
pub const UNFILLED_COLOR: SerializableColor = SerializableColor::new(0xCC, 0xCC, 0xCC, 255);
/// Outline of the viewport rectangle.
pub const VIEWPORT_COLOR: SerializableColor = SerializableColor::new(0xC6, 0xA6, 0x67, 255);
pub const VIEWPORT_STROKE_WIDTH: f64 = 2.0;

/// One object on the minimap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapItem {
    pub rect: Rect,
    pub color: SerializableColor,
}

/// Everything the minimap draws, in minimap pixels. Read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapLayout {
    pub size: Size,
    pub background: SerializableColor,
    pub items: Vec<MinimapItem>,
    pub viewport: Rect,
}

impl MinimapLayout {
    /// Project the scene and the visible area at `scale`.
    pub fn compute(scene: &Scene, viewport: &Viewport, theme: CanvasTheme, scale: f64) -> Self {
        let items = scene
            .iter()
            .filter(|shape| !shape.exclude_from_export)
            .map(|shape| {
                let b = shape.bounds();
                MinimapItem {
                    rect: Rect::new(b.x0 * scale, b.y0 * scale, b.x1 * scale, b.y1 * scale),
                    color: shape.style.fill_color.unwrap_or(UNFILLED_COLOR),
                }
            })
            .collect();

        let zoom = viewport.zoom();
        let origin = (-viewport.pan * scale / zoom).to_point();
        let viewport_rect = Rect::from_origin_size(
            origin,
            (
                viewport.size.width * scale / zoom,
                viewport.size.height * scale / zoom,
            ),
        );

        Self {
            size: MINIMAP_SIZE,
            background: theme.minimap_background(),
            items,
            viewport: viewport_rect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MINIMAP_SCALE;
    use crate::shapes::{Line, Rectangle, Shape, ShapeStyle};
    use kurbo::{Point, Vec2};

    #[test]
    fn test_objects_scaled() {
        let mut scene = Scene::default();
        scene.add(Shape::with_style(
            Rectangle::new(Point::new(100.0, 200.0), 300.0, 100.0),
            ShapeStyle {
                fill_color: Some(SerializableColor::white()),
                ..ShapeStyle::default()
            },
        ));
        scene.add(Shape::new(Line::new(Point::ZERO, Point::new(50.0, 50.0))));

        let layout = MinimapLayout::compute(&scene, &Viewport::default(), CanvasTheme::Light, MINIMAP_SCALE);
        assert_eq!(layout.items.len(), 2);
        let rect = layout.items[0].rect;
        assert!((rect.x0 - 10.0).abs() < 1e-9 && (rect.y1 - 30.0).abs() < 1e-9);
        assert_eq!(layout.items[0].color, SerializableColor::white());
        assert_eq!(layout.items[1].color, UNFILLED_COLOR);
    }

    #[test]
    fn test_viewport_rect_follows_pan_and_zoom() {
        let mut viewport = Viewport::new(Size::new(800.0, 600.0));
        viewport.pan_by(Vec2::new(-200.0, 100.0));
        let layout = MinimapLayout::compute(&Scene::default(), &viewport, CanvasTheme::Dark, MINIMAP_SCALE);
        assert!((layout.viewport.x0 - 20.0).abs() < 1e-9);
        assert!((layout.viewport.y0 + 10.0).abs() < 1e-9);
        assert!((layout.viewport.width() - 80.0).abs() < 1e-9);
        assert_eq!(layout.background, CanvasTheme::Dark.minimap_background());

        viewport.reset();
        viewport.zoom_to_point(Point::ZERO, 2.0);
        let layout = MinimapLayout::compute(&Scene::default(), &viewport, CanvasTheme::Light, MINIMAP_SCALE);
        assert!((layout.viewport.width() - 40.0).abs() < 1e-9);
    }
}
