//! Renderer trait abstraction.

use aetherboard_core::grid::GridLayout;
use aetherboard_core::scene::Scene;
use aetherboard_core::shapes::{Shape, ShapeId};
use aetherboard_core::tools::{ToolState, drag_box};
use aetherboard_core::viewport::Viewport;
use aetherboard_core::whiteboard::Whiteboard;
use kurbo::{Rect, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub viewport: &'a Viewport,
    /// Device pixel ratio (2.0 for PNG export).
    pub scale_factor: f64,
    pub background_color: Color,
    /// Grid to draw over the shapes, if visible.
    pub grid: Option<GridLayout>,
    /// Minor and major grid line colors.
    pub grid_colors: (Color, Color),
    /// Shape being dragged out; drawn above the scene.
    pub preview: Option<&'a Shape>,
    pub selection: Vec<ShapeId>,
    pub selection_color: Color,
    /// Marquee in logical coordinates.
    pub selection_rect: Option<Rect>,
    /// Skip objects flagged as excluded from export.
    pub for_export: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context with no overlays.
    pub fn new(scene: &'a Scene, viewport: &'a Viewport) -> Self {
        Self {
            scene,
            viewport,
            scale_factor: 1.0,
            background_color: scene.background.into(),
            grid: None,
            grid_colors: (Color::TRANSPARENT, Color::TRANSPARENT),
            preview: None,
            selection: Vec::new(),
            selection_color: Color::from_rgba8(0xC6, 0xA6, 0x67, 255),
            selection_rect: None,
            for_export: false,
        }
    }

    /// Everything the live canvas shows for a session: grid, preview,
    /// selection outlines and the marquee.
    pub fn from_whiteboard(board: &'a Whiteboard) -> Self {
        let (minor, major) = board.config().theme.grid_colors();
        let selection_rect = match board.tool_state() {
            ToolState::Selecting { start, current } => Some(drag_box(*start, *current)),
            _ => None,
        };
        Self {
            grid: board.grid_layout(),
            grid_colors: (minor.into(), major.into()),
            preview: board.preview(),
            selection: board.selection().ids(),
            selection_rect,
            ..Self::new(board.scene(), board.viewport())
        }
    }

    /// Scene and background only, at the given pixel density.
    pub fn for_export(scene: &'a Scene, viewport: &'a Viewport, scale_factor: f64) -> Self {
        Self {
            scale_factor,
            for_export: true,
            ..Self::new(scene, viewport)
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Output surface size in device pixels.
    pub fn surface_size(&self) -> Size {
        self.viewport.size * self.scale_factor
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the draw commands for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
