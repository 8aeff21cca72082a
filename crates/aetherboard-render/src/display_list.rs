//! Retained draw commands for one frame.
//!
//! [`DisplayList`] is the built-in [`Renderer`]: it walks the scene the way
//! a GPU backend would and records device-space commands that a rasterizer
//! (or any host) can replay.

use crate::renderer::{RenderContext, Renderer};
use aetherboard_core::shapes::{Image, SerializableColor, Shape, ShapeId, ShapeKind, ShapeStyle, Text};
use image::RgbaImage;
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Size};
use log::warn;
use peniko::Color;
use std::collections::HashMap;
use std::sync::Arc;

/// Width of selection outlines and grid lines, in device pixels.
const HAIRLINE: f64 = 1.0;
/// Alpha of the marquee fill.
const MARQUEE_FILL_ALPHA: f32 = 0.12;
const PLACEHOLDER_FILL: Color = Color::from_rgba8(200, 200, 200, 255);
const PLACEHOLDER_STROKE: Color = Color::from_rgba8(100, 100, 100, 255);

#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Fill a device-space path with the nonzero rule.
    Fill { path: BezPath, color: Color },
    /// Stroke a path given in local coordinates, then map it to the device.
    Stroke {
        path: BezPath,
        transform: Affine,
        width: f64,
        color: Color,
    },
    /// Lines of text with their baselines in local space; glyphs are shaped
    /// at replay time and `transform` maps them to the device.
    Text {
        transform: Affine,
        lines: Vec<(Point, String)>,
        font_size: f64,
        color: Color,
    },
    /// Image pixels; `transform` maps pixel space to the device.
    Image {
        transform: Affine,
        pixels: Arc<RgbaImage>,
        opacity: f64,
    },
}

/// Command list plus the surface it targets.
#[derive(Debug)]
pub struct DisplayList {
    size: Size,
    background: Color,
    commands: Vec<DrawCommand>,
    /// Decoded images keyed by shape id, so frames don't re-decode.
    image_cache: HashMap<ShapeId, Arc<RgbaImage>>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self {
            size: Size::default(),
            background: Color::TRANSPARENT,
            commands: Vec::new(),
            image_cache: HashMap::new(),
        }
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list for a surface of `size` device pixels.
    pub fn with_surface(size: Size, background: Color) -> Self {
        Self {
            size,
            background,
            ..Self::default()
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn fill(&mut self, path: &BezPath, transform: Affine, color: Color) {
        let mut path = path.clone();
        path.apply_affine(transform);
        self.commands.push(DrawCommand::Fill { path, color });
    }

    pub fn stroke(&mut self, path: &BezPath, transform: Affine, width: f64, color: Color) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            transform,
            width,
            color,
        });
    }

    /// Draw a shape and, for groups, its children.
    pub fn push_shape(&mut self, shape: &Shape, transform: Affine, opacity: f64) {
        let transform = transform * shape.render_transform();
        let opacity = opacity * shape.style.opacity;
        match &shape.kind {
            ShapeKind::Group(group) => {
                for child in group.children() {
                    self.push_shape(child, transform, opacity);
                }
            }
            ShapeKind::Text(text) => self.push_text(text, &shape.style, transform, opacity),
            ShapeKind::Image(image) => self.push_image(shape.id(), image, transform, opacity),
            _ => self.push_path(shape, transform, opacity),
        }
    }

    fn push_path(&mut self, shape: &Shape, transform: Affine, opacity: f64) {
        let style = ShapeStyle {
            opacity,
            ..shape.style.clone()
        };
        let path = shape.to_path();
        if shape.is_closed() {
            if let Some(fill) = style.fill_with_opacity() {
                self.fill(&path, transform, fill);
            }
        }
        if style.has_stroke() {
            self.stroke(&path, transform, style.stroke_width, style.stroke_with_opacity());
        }
    }

    fn push_text(&mut self, text: &Text, style: &ShapeStyle, transform: Affine, opacity: f64) {
        let style = ShapeStyle {
            opacity,
            fill_color: Some(style.fill_color.unwrap_or(SerializableColor::black())),
            ..style.clone()
        };
        let Some(color) = style.fill_with_opacity() else {
            return;
        };
        let lines = text
            .baselines()
            .map(|(baseline, line)| (baseline, line.to_string()))
            .collect();
        self.commands.push(DrawCommand::Text {
            transform,
            lines,
            font_size: text.font_size,
            color,
        });
    }

    fn push_image(&mut self, id: ShapeId, image: &Image, transform: Affine, opacity: f64) {
        let pixels = match self.image_cache.get(&id) {
            Some(cached) => Arc::clone(cached),
            None => {
                let decoded = image
                    .data()
                    .and_then(|bytes| image::load_from_memory(&bytes).ok());
                let Some(decoded) = decoded else {
                    warn!("could not decode image {}", id);
                    self.push_image_placeholder(image, transform);
                    return;
                };
                let pixels = Arc::new(decoded.to_rgba8());
                self.image_cache.insert(id, Arc::clone(&pixels));
                pixels
            }
        };
        let bounds = image.as_rect();
        let scale_x = bounds.width() / pixels.width().max(1) as f64;
        let scale_y = bounds.height() / pixels.height().max(1) as f64;
        self.commands.push(DrawCommand::Image {
            transform: transform
                * Affine::translate((bounds.x0, bounds.y0))
                * Affine::scale_non_uniform(scale_x, scale_y),
            pixels,
            opacity,
        });
    }

    fn push_image_placeholder(&mut self, image: &Image, transform: Affine) {
        let rect = image.as_rect();
        let outline = rect.to_path(0.1);
        self.fill(&outline, transform, PLACEHOLDER_FILL);
        let mut cross = BezPath::new();
        cross.move_to((rect.x0, rect.y0));
        cross.line_to((rect.x1, rect.y1));
        cross.move_to((rect.x1, rect.y0));
        cross.line_to((rect.x0, rect.y1));
        self.stroke(&cross, transform, 2.0, PLACEHOLDER_STROKE);
        self.stroke(&outline, transform, 1.0, PLACEHOLDER_STROKE);
    }

    fn push_grid(&mut self, ctx: &RenderContext) {
        let Some(grid) = ctx.grid else {
            return;
        };
        let size = ctx.viewport.size;
        let device = Affine::scale(ctx.scale_factor);
        let (minor, major) = ctx.grid_colors;
        let families = [(Some(grid.minor), minor), (grid.major, major)];
        for (lines, color) in families {
            let Some(lines) = lines else {
                continue;
            };
            let mut path = BezPath::new();
            for x in lines.xs(size.width) {
                path.move_to((x, 0.0));
                path.line_to((x, size.height));
            }
            for y in lines.ys(size.height) {
                path.move_to((0.0, y));
                path.line_to((size.width, y));
            }
            self.stroke(&path, device, HAIRLINE / ctx.scale_factor, color);
        }
    }

    fn push_selection(&mut self, ctx: &RenderContext, world: Affine) {
        for id in &ctx.selection {
            let Some(shape) = ctx.scene.get(*id) else {
                continue;
            };
            let rect = world.transform_rect_bbox(shape.bounds());
            self.stroke(&rect.to_path(0.1), Affine::IDENTITY, HAIRLINE, ctx.selection_color);
        }
        if let Some(marquee) = ctx.selection_rect {
            let rect = world.transform_rect_bbox(marquee).to_path(0.1);
            self.fill(&rect, Affine::IDENTITY, ctx.selection_color.with_alpha(MARQUEE_FILL_ALPHA));
            self.stroke(&rect, Affine::IDENTITY, HAIRLINE, ctx.selection_color);
        }
    }
}

impl Renderer for DisplayList {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.commands.clear();
        self.size = ctx.surface_size();
        self.background = self.background_color(ctx);
        // Drop cached pixels for images that left the scene.
        self.image_cache.retain(|id, _| ctx.scene.contains(*id));

        let world = Affine::scale(ctx.scale_factor) * ctx.viewport.transform();
        for shape in ctx.scene.iter() {
            if ctx.for_export && shape.exclude_from_export {
                continue;
            }
            self.push_shape(shape, world, 1.0);
        }

        if let Some(preview) = ctx.preview.filter(|_| !ctx.for_export) {
            self.push_shape(preview, world, 1.0);
        }
        // Grid lines overlay the drawing; selection chrome stays on top.
        self.push_grid(ctx);
        if !ctx.for_export {
            self.push_selection(ctx, world);
        }
    }
}

/// Rectangle outline helper shared with the minimap.
pub(crate) fn rect_path(rect: Rect) -> BezPath {
    rect.to_path(0.1)
}
