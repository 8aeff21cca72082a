//! Tool system for the whiteboard.

mod brush;
mod builder;

pub use brush::{Brush, ERASER_WIDTH_FACTOR, HIGHLIGHTER_ALPHA, HIGHLIGHTER_WIDTH_FACTOR};
pub use builder::{
    CLICK_THRESHOLD, DEFAULT_SHAPE_SIZE, PREVIEW_OPACITY, PREVIEW_THRESHOLD, Placement,
    STICKY_COLORS, STICKY_PLACEHOLDER, TEXT_PLACEHOLDER, build_preview, build_shape, drag_box,
    mark_as_preview, placement, sticky_shapes, text_shape,
};

use crate::shapes::{SerializableColor, Shape, ShapeStyle};
use kurbo::{Point, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

/// Color palette offered to the user; the first entry is the default.
pub const PALETTE: [SerializableColor; 16] = [
    SerializableColor::new(0xC6, 0xA6, 0x67, 255),
    SerializableColor::new(0x8A, 0x9A, 0x5B, 255),
    SerializableColor::new(0x5C, 0x8D, 0x63, 255),
    SerializableColor::new(0xD1, 0xA9, 0x54, 255),
    SerializableColor::new(0xC0, 0x5C, 0x5C, 255),
    SerializableColor::new(0x11, 0x11, 0x11, 255),
    SerializableColor::new(0x6B, 0x72, 0x80, 255),
    SerializableColor::new(0xFF, 0xFF, 0xFF, 255),
    SerializableColor::new(0x3B, 0x82, 0xF6, 255),
    SerializableColor::new(0x8B, 0x5C, 0xF6, 255),
    SerializableColor::new(0xEC, 0x48, 0x99, 255),
    SerializableColor::new(0x14, 0xB8, 0xA6, 255),
    SerializableColor::new(0xF5, 0x9E, 0x0B, 255),
    SerializableColor::new(0xEF, 0x44, 0x44, 255),
    SerializableColor::new(0x10, 0xB9, 0x81, 255),
    SerializableColor::new(0x63, 0x66, 0xF1, 255),
];

/// Alpha of the default fill derived from the active color.
pub const DEFAULT_FILL_ALPHA: u8 = 0x30;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Pen,
    Highlighter,
    Eraser,
    Rectangle,
    Circle,
    Ellipse,
    Triangle,
    Line,
    Diamond,
    Star,
    Hexagon,
    Pentagon,
    Heart,
    Cloud,
    Arrow,
    Connector,
    Text,
    Sticky,
}

impl ToolKind {
    pub const ALL: [ToolKind; 20] = [
        ToolKind::Select,
        ToolKind::Hand,
        ToolKind::Pen,
        ToolKind::Highlighter,
        ToolKind::Eraser,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Ellipse,
        ToolKind::Triangle,
        ToolKind::Line,
        ToolKind::Diamond,
        ToolKind::Star,
        ToolKind::Hexagon,
        ToolKind::Pentagon,
        ToolKind::Heart,
        ToolKind::Cloud,
        ToolKind::Arrow,
        ToolKind::Connector,
        ToolKind::Text,
        ToolKind::Sticky,
    ];

    /// Tools that draw a shape by dragging out a box or segment.
    pub fn is_shape_tool(&self) -> bool {
        !matches!(
            self,
            ToolKind::Select
                | ToolKind::Hand
                | ToolKind::Pen
                | ToolKind::Highlighter
                | ToolKind::Eraser
                | ToolKind::Text
                | ToolKind::Sticky
        )
    }

    /// Brush tools that record a freehand stroke.
    pub fn is_freehand(&self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Highlighter | ToolKind::Eraser)
    }

    /// Tools that create content and are therefore disabled on a locked canvas.
    pub fn creates_content(&self) -> bool {
        self.is_shape_tool() || self.is_freehand() || matches!(self, ToolKind::Text | ToolKind::Sticky)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Hand => "hand",
            ToolKind::Pen => "pen",
            ToolKind::Highlighter => "highlighter",
            ToolKind::Eraser => "eraser",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Triangle => "triangle",
            ToolKind::Line => "line",
            ToolKind::Diamond => "diamond",
            ToolKind::Star => "star",
            ToolKind::Hexagon => "hexagon",
            ToolKind::Pentagon => "pentagon",
            ToolKind::Heart => "heart",
            ToolKind::Cloud => "cloud",
            ToolKind::Arrow => "arrow",
            ToolKind::Connector => "connector",
            ToolKind::Text => "text",
            ToolKind::Sticky => "sticky",
        }
    }
}

/// Style applied to newly created shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawStyle {
    /// Active color: stroke of shapes, color of text and brushes.
    pub color: SerializableColor,
    /// Fill of closed shapes (None = unfilled).
    pub fill: Option<SerializableColor>,
    pub stroke_width: f64,
    /// Opacity in 0..=1.
    pub opacity: f64,
    /// Corner radius for new rectangles.
    pub corner_radius: f64,
}

impl Default for DrawStyle {
    fn default() -> Self {
        let color = PALETTE[0];
        Self {
            color,
            fill: Some(color.with_alpha(DEFAULT_FILL_ALPHA)),
            stroke_width: 2.0,
            opacity: 1.0,
            corner_radius: 4.0,
        }
    }
}

impl DrawStyle {
    /// Change the active color; the fill follows with the default alpha
    /// unless shapes are currently unfilled.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color;
        if self.fill.is_some() {
            self.fill = Some(color.with_alpha(DEFAULT_FILL_ALPHA));
        }
    }

    /// Style for closed shapes.
    pub fn filled_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.color,
            stroke_width: self.stroke_width,
            fill_color: self.fill,
            opacity: self.opacity,
        }
    }

    /// Style for open strokes such as lines and arrows.
    pub fn outline_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill_color: None,
            ..self.filled_style()
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// A shape tool is dragging out a shape (logical coordinates).
    DrawingShape {
        tool: ToolKind,
        start: Point,
        current: Point,
    },
    /// The view is being dragged; `last` is in screen coordinates.
    Panning { last: Point },
    /// A brush is recording points (logical coordinates).
    FreehandDrawing { tool: ToolKind, points: Vec<Point> },
    /// Marquee selection with the select tool.
    Selecting { start: Point, current: Point },
    /// Dragging the current selection.
    Moving { last: Point, moved: bool },
}

/// Manages the current tool, its gesture state and the preview overlay.
///
/// The preview shape is never part of the scene; renderers draw it on top.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Style applied to new shapes.
    pub style: DrawStyle,
    preview: Option<Shape>,
    sticky_index: usize,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. An in-flight gesture keeps the tool it started with.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, ToolState::Panning { .. })
    }

    /// Preview overlay for the shape being drawn.
    pub fn preview(&self) -> Option<&Shape> {
        self.preview.as_ref()
    }

    /// Start dragging out a shape with the current tool.
    pub fn begin_shape(&mut self, point: Point) -> bool {
        if !self.current_tool.is_shape_tool() {
            return false;
        }
        debug!("begin {} at {:?}", self.current_tool.name(), point);
        self.preview = None;
        self.state = ToolState::DrawingShape {
            tool: self.current_tool,
            start: point,
            current: point,
        };
        true
    }

    /// Start recording a freehand stroke with the current tool.
    pub fn begin_freehand(&mut self, point: Point) -> bool {
        if !self.current_tool.is_freehand() {
            return false;
        }
        self.state = ToolState::FreehandDrawing {
            tool: self.current_tool,
            points: vec![point],
        };
        true
    }

    /// Start panning from a screen position.
    pub fn begin_pan(&mut self, screen: Point) {
        self.state = ToolState::Panning { last: screen };
    }

    pub fn begin_marquee(&mut self, point: Point) {
        self.state = ToolState::Selecting {
            start: point,
            current: point,
        };
    }

    pub fn begin_move(&mut self, point: Point) {
        self.state = ToolState::Moving {
            last: point,
            moved: false,
        };
    }

    /// Feed a logical pointer position to the active gesture.
    ///
    /// Returns the logical delta for a selection drag, so the caller can move
    /// the selected objects.
    pub fn update(&mut self, point: Point) -> Option<Vec2> {
        match &mut self.state {
            ToolState::DrawingShape {
                tool,
                start,
                current,
            } => {
                *current = point;
                self.preview = build_preview(*tool, *start, point, &self.style);
                None
            }
            ToolState::FreehandDrawing { points, .. } => {
                points.push(point);
                None
            }
            ToolState::Selecting { current, .. } => {
                *current = point;
                None
            }
            ToolState::Moving { last, moved } => {
                let delta = point - *last;
                *last = point;
                *moved |= delta != Vec2::ZERO;
                Some(delta)
            }
            ToolState::Idle | ToolState::Panning { .. } => None,
        }
    }

    /// Screen-space delta since the last pan position.
    pub fn pan_to(&mut self, screen: Point) -> Option<Vec2> {
        if let ToolState::Panning { last } = &mut self.state {
            let delta = screen - *last;
            *last = screen;
            Some(delta)
        } else {
            None
        }
    }

    /// Finish a shape drag and return the shape to commit.
    pub fn finish_shape(&mut self, end: Point, snap_grid: Option<f64>) -> Option<Shape> {
        let ToolState::DrawingShape { tool, start, .. } = self.state else {
            return None;
        };
        self.state = ToolState::Idle;
        self.preview = None;
        let placed = placement(start, end, snap_grid);
        let shape = build_shape(tool, &placed, &self.style);
        debug!("commit {} at {:?}", tool.name(), placed.rect);
        shape
    }

    /// Finish a freehand stroke, painting the eraser with `background`.
    pub fn finish_freehand(&mut self, background: SerializableColor) -> Option<Shape> {
        let ToolState::FreehandDrawing { tool, points } = std::mem::take(&mut self.state) else {
            return None;
        };
        Brush::for_tool(tool, &self.style, background)?.stroke(&points)
    }

    /// Take the finished gesture state and return to idle.
    pub fn finish(&mut self) -> ToolState {
        self.preview = None;
        std::mem::take(&mut self.state)
    }

    /// Cancel the current interaction and drop the preview.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.preview = None;
    }

    /// Palette slot for the next sticky note; advances the rotation.
    pub fn next_sticky_index(&mut self) -> usize {
        let index = self.sticky_index;
        self.sticky_index = (self.sticky_index + 1) % STICKY_COLORS.len();
        index
    }
}
