//! The whiteboard session: one canvas with its tools, view and history.
//!
//! A [`Whiteboard`] is driven by a host through [`Whiteboard::handle_pointer`],
//! [`Whiteboard::key_down`] and [`Whiteboard::execute`]. Every handler
//! finishes its mutation before returning; user-facing notifications are
//! queued as [`SessionEvent`]s and drained by the host.

use crate::config::{CanvasTheme, WhiteboardConfig};
use crate::export::{ExportError, ExportFile, ExportFormat, RasterExporter, export_scene};
use crate::grid::GridLayout;
use crate::history::History;
use crate::import::{self, ImportError};
use crate::input::{InputFocus, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::minimap::MinimapLayout;
use crate::scene::Scene;
use crate::selection::Selection;
use crate::shapes::{Shape, ShapeId};
use crate::shortcuts::{Alignment, Command, ShortcutDispatcher};
use crate::text_edit::{TextEditResult, TextEditState};
use crate::tools::{
    DrawStyle, PREVIEW_THRESHOLD, ToolKind, ToolManager, ToolState, drag_box, sticky_shapes, text_shape,
};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use log::{debug, error, info, warn};

/// Offset applied to duplicated objects.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);
/// Hit-test tolerance in device pixels.
pub const HIT_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Notification for the host, drained with [`Whiteboard::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Toast { kind: ToastKind, message: String },
    /// The active tool changed without the host asking (e.g. after placing text).
    ToolChanged(ToolKind),
}

/// Pointer cursor the host should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorIcon {
    Default,
    Crosshair,
    Grab,
    Grabbing,
}

#[derive(Debug, Clone)]
struct TextEditing {
    state: TextEditState,
    /// Content when editing started, to decide whether a snapshot is due.
    original: String,
}

/// An interactive whiteboard session.
#[derive(Debug)]
pub struct Whiteboard {
    scene: Scene,
    viewport: Viewport,
    tools: ToolManager,
    selection: Selection,
    history: History,
    config: WhiteboardConfig,
    editing: Option<TextEditing>,
    shortcuts: ShortcutDispatcher,
    locked: bool,
    show_shortcuts: bool,
    revision: u64,
    events: Vec<SessionEvent>,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(WhiteboardConfig::default())
    }
}

impl Whiteboard {
    /// Start a session with an empty scene. History is seeded with the empty
    /// scene and the shortcut dispatcher is mounted.
    pub fn new(config: WhiteboardConfig) -> Self {
        let mut shortcuts = ShortcutDispatcher::new();
        shortcuts.mount();
        let mut board = Self {
            scene: Scene::new(config.theme.background()),
            viewport: Viewport::new(config.viewport_size),
            tools: ToolManager::new(),
            selection: Selection::None,
            history: History::new(config.history_limit),
            config,
            editing: None,
            shortcuts,
            locked: false,
            show_shortcuts: false,
            revision: 0,
            events: Vec::new(),
        };
        board.snapshot();
        board
    }

    /// Replace the scene (e.g. a loaded document) and restart history from it.
    /// The configured theme decides the background, not the document.
    pub fn load_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.scene.background = self.config.theme.background();
        self.selection.clear();
        self.editing = None;
        self.tools.cancel();
        self.history.clear();
        self.snapshot();
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &WhiteboardConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tools.state
    }

    /// Overlay for the shape being dragged out; never part of the scene.
    pub fn preview(&self) -> Option<&Shape> {
        self.tools.preview()
    }

    /// Style applied to new shapes.
    pub fn style(&self) -> &DrawStyle {
        &self.tools.style
    }

    pub fn style_mut(&mut self) -> &mut DrawStyle {
        &mut self.tools.style
    }

    pub fn zoom_percent(&self) -> i32 {
        self.viewport.zoom_percent()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn shortcuts_visible(&self) -> bool {
        self.show_shortcuts
    }

    /// Text object being edited, if any.
    pub fn editing_text(&self) -> Option<&TextEditState> {
        self.editing.as_ref().map(|e| &e.state)
    }

    /// Bumped on every scene mutation, pan and zoom.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn cursor(&self) -> CursorIcon {
        if self.tools.is_panning() {
            return CursorIcon::Grabbing;
        }
        match self.tools.current_tool {
            ToolKind::Hand => CursorIcon::Grab,
            ToolKind::Select => CursorIcon::Default,
            tool if tool.creates_content() => CursorIcon::Crosshair,
            _ => CursorIcon::Default,
        }
    }

    /// Attach keyboard shortcuts when the view becomes visible.
    pub fn mount(&mut self) {
        self.shortcuts.mount();
    }

    pub fn unmount(&mut self) {
        self.shortcuts.unmount();
    }

    /// Switch between light and dark canvas colors. Not recorded in history.
    pub fn set_theme(&mut self, theme: CanvasTheme) {
        self.config.theme = theme;
        self.scene.background = theme.background();
        self.touch();
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport.size = size;
        self.config.viewport_size = size;
        self.touch();
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    /// Grid for the current view, or `None` when the grid is hidden.
    pub fn grid_layout(&self) -> Option<GridLayout> {
        self.config
            .show_grid
            .then(|| GridLayout::compute(self.config.grid_size, &self.viewport))
    }

    /// Minimap for the current view, or `None` when it is hidden.
    pub fn minimap_layout(&self) -> Option<MinimapLayout> {
        self.config.show_minimap.then(|| {
            MinimapLayout::compute(&self.scene, &self.viewport, self.config.theme, self.config.minimap_scale)
        })
    }

    // --- pointer input ---

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, .. } => self.pointer_up(position),
            PointerEvent::Leave => {
                if self.tools.is_panning() {
                    self.tools.finish();
                }
            }
            PointerEvent::Wheel { position, delta_y } => {
                self.viewport.wheel_zoom(position, delta_y);
                self.touch();
            }
        }
    }

    fn pointer_down(&mut self, position: Point, button: MouseButton, modifiers: Modifiers) {
        if self.tools.is_active() {
            return;
        }
        let tool = self.tools.current_tool;
        if button == MouseButton::Middle || (button == MouseButton::Left && tool == ToolKind::Hand) {
            self.tools.begin_pan(position);
            return;
        }
        if button != MouseButton::Left {
            return;
        }

        self.finish_editing();
        let point = self.viewport.screen_to_world(position);
        match tool {
            ToolKind::Select => self.select_at(point, modifiers.shift),
            ToolKind::Text => self.place_text(point),
            ToolKind::Sticky => self.place_sticky(point),
            _ if self.locked => debug!("canvas locked, ignoring {}", tool.name()),
            _ if tool.is_shape_tool() => {
                self.tools.begin_shape(point);
            }
            _ if tool.is_freehand() => {
                self.tools.begin_freehand(point);
            }
            _ => {}
        }
    }

    fn pointer_move(&mut self, position: Point) {
        if self.tools.is_panning() {
            if let Some(delta) = self.tools.pan_to(position) {
                self.viewport.pan_by(delta);
                self.touch();
            }
            return;
        }
        let point = self.viewport.screen_to_world(position);
        if let Some(delta) = self.tools.update(point).filter(|d| *d != Vec2::ZERO) {
            let ids = self.selection.ids();
            self.scene.translate(&ids, delta);
            self.touch();
        }
    }

    fn pointer_up(&mut self, position: Point) {
        let point = self.viewport.screen_to_world(position);
        if matches!(self.tools.state, ToolState::DrawingShape { .. }) {
            let snap = self.config.snap_to_grid.then_some(self.config.grid_size);
            if let Some(shape) = self.tools.finish_shape(point, snap) {
                let id = self.scene.add(shape);
                self.selection = Selection::Single(id);
                self.snapshot();
            }
            return;
        }
        if matches!(self.tools.state, ToolState::FreehandDrawing { .. }) {
            if let Some(stroke) = self.tools.finish_freehand(self.scene.background) {
                self.scene.add(stroke);
                self.snapshot();
            }
            return;
        }
        match self.tools.finish() {
            ToolState::Moving { moved: true, .. } => self.snapshot(),
            ToolState::Selecting { start, .. } => self.finish_marquee(drag_box(start, point)),
            _ => {}
        }
    }

    fn select_at(&mut self, point: Point, shift: bool) {
        let tolerance = HIT_TOLERANCE / self.viewport.zoom();
        match self.scene.shape_at(point, tolerance) {
            Some(id) if shift => self.selection.toggle(id),
            Some(id) => {
                if !self.selection.contains(id) {
                    self.selection = Selection::Single(id);
                }
                self.tools.begin_move(point);
            }
            None => {
                if !shift {
                    self.selection.clear();
                }
                self.tools.begin_marquee(point);
            }
        }
    }

    fn finish_marquee(&mut self, rect: kurbo::Rect) {
        if rect.width() < PREVIEW_THRESHOLD && rect.height() < PREVIEW_THRESHOLD {
            return;
        }
        let mut ids = self.selection.ids();
        for id in self.scene.shapes_in_rect(rect) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids.sort_by_key(|id| self.scene.index_of(*id));
        self.selection = Selection::from_ids(ids);
    }

    fn place_text(&mut self, point: Point) {
        if self.locked {
            return;
        }
        let id = self.scene.add(text_shape(point, &self.tools.style));
        self.selection = Selection::Single(id);
        self.start_editing(id, true);
        self.switch_to_select();
        self.snapshot();
    }

    fn place_sticky(&mut self, point: Point) {
        if self.locked {
            return;
        }
        let (note, text) = sticky_shapes(point, self.tools.next_sticky_index());
        self.scene.add(note);
        let id = self.scene.add(text);
        self.selection = Selection::Single(id);
        self.start_editing(id, false);
        self.switch_to_select();
        self.snapshot();
    }

    fn switch_to_select(&mut self) {
        self.tools.set_tool(ToolKind::Select);
        self.events.push(SessionEvent::ToolChanged(ToolKind::Select));
    }

    // --- text editing ---

    /// Start editing an existing text object. Returns false if `id` is not text.
    pub fn edit_text(&mut self, id: ShapeId) -> bool {
        self.finish_editing();
        self.start_editing(id, false)
    }

    fn start_editing(&mut self, id: ShapeId, select_all: bool) -> bool {
        let Some(text) = self.scene.get(id).and_then(Shape::as_text) else {
            return false;
        };
        let mut state = TextEditState::new(id, &text.content);
        if select_all {
            state.select_all();
        }
        self.editing = Some(TextEditing {
            original: text.content.clone(),
            state,
        });
        true
    }

    /// Leave text editing, snapshotting if the content changed.
    pub fn finish_editing(&mut self) {
        let Some(editing) = self.editing.take() else {
            return;
        };
        if editing.state.text() != editing.original {
            debug!("text edit committed");
            self.snapshot();
        }
    }

    fn sync_editing_text(&mut self) {
        let Some(editing) = &self.editing else {
            return;
        };
        if let Some(text) = self
            .scene
            .get_mut(editing.state.shape_id())
            .and_then(Shape::as_text_mut)
        {
            text.content = editing.state.text().to_string();
        }
        self.touch();
    }

    // --- keyboard and commands ---

    /// Handle a key press. Returns true when the key was consumed.
    ///
    /// While a text object is being edited, keys go to the editor and
    /// shortcuts are bypassed.
    pub fn key_down(&mut self, event: &KeyEvent, focus: InputFocus) -> bool {
        if let Some(editing) = self.editing.as_mut() {
            return match editing.state.handle_key(event) {
                TextEditResult::Handled => {
                    self.sync_editing_text();
                    true
                }
                TextEditResult::ExitEdit => {
                    self.finish_editing();
                    true
                }
                TextEditResult::NotHandled => false,
            };
        }
        match self.shortcuts.resolve(event, focus) {
            Some(command) => {
                self.execute(command);
                true
            }
            None => false,
        }
    }

    /// Run a command. Returns false when it was a no-op (nothing selected,
    /// boundary reached, or suppressed by the lock).
    pub fn execute(&mut self, command: Command) -> bool {
        debug!("command {:?}", command);
        match command {
            Command::SetTool(tool) => {
                self.tools.set_tool(tool);
                true
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::DeleteSelected => self.delete_selected(),
            Command::DuplicateSelected => self.duplicate_selected(),
            Command::Group => self.group_selected(),
            Command::Ungroup => self.ungroup_selected(),
            Command::SelectAll => {
                self.finish_editing();
                self.selection = Selection::from_ids(self.scene.selectable_ids());
                !self.selection.is_empty()
            }
            Command::Deselect => {
                self.finish_editing();
                self.tools.cancel();
                self.selection.clear();
                self.show_shortcuts = false;
                true
            }
            Command::BringForward
            | Command::SendBackward
            | Command::BringToFront
            | Command::SendToBack => self.reorder_selected(command),
            Command::FlipHorizontal => self.flip_selected(true),
            Command::FlipVertical => self.flip_selected(false),
            Command::Align(alignment) => self.align_selected(alignment),
            Command::ZoomIn => {
                self.viewport.zoom_in();
                self.touch();
                true
            }
            Command::ZoomOut => {
                self.viewport.zoom_out();
                self.touch();
                true
            }
            Command::ResetView => {
                self.viewport.reset();
                self.touch();
                true
            }
            Command::FitToScreen => {
                self.viewport.fit_to_bounds(self.scene.bounds());
                self.touch();
                self.toast(ToastKind::Info, "Fitted to screen");
                true
            }
            Command::ClearCanvas => self.clear_canvas(),
            Command::ToggleLock => {
                self.locked = !self.locked;
                let message = if self.locked { "Canvas locked" } else { "Canvas unlocked" };
                self.toast(ToastKind::Info, message);
                true
            }
            Command::ToggleGrid => {
                self.config.show_grid = !self.config.show_grid;
                true
            }
            Command::ToggleSnap => {
                self.config.snap_to_grid = !self.config.snap_to_grid;
                true
            }
            Command::ToggleMinimap => {
                self.config.show_minimap = !self.config.show_minimap;
                true
            }
            Command::ToggleShortcuts => {
                self.show_shortcuts = !self.show_shortcuts;
                true
            }
            Command::Save => {
                self.finish_editing();
                self.toast(ToastKind::Success, "Auto-saved");
                true
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.finish_editing();
        let Some(snapshot) = self.history.undo().map(str::to_owned) else {
            return false;
        };
        let restored = self.restore(&snapshot);
        if restored {
            self.toast(ToastKind::Info, "Undone");
        }
        restored
    }

    pub fn redo(&mut self) -> bool {
        self.finish_editing();
        let Some(snapshot) = self.history.redo().map(str::to_owned) else {
            return false;
        };
        let restored = self.restore(&snapshot);
        if restored {
            self.toast(ToastKind::Info, "Redone");
        }
        restored
    }

    /// Rebuild the scene from a snapshot. The canvas background follows the
    /// current theme rather than the snapshot.
    fn restore(&mut self, snapshot: &str) -> bool {
        match Scene::from_json(snapshot) {
            Ok(mut scene) => {
                scene.background = self.scene.background;
                self.scene = scene;
                self.selection.retain(|id| self.scene.contains(id));
                self.editing = None;
                self.tools.cancel();
                self.touch();
                true
            }
            Err(e) => {
                error!("failed to restore snapshot: {}", e);
                false
            }
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        if self.locked || self.selection.is_empty() {
            return false;
        }
        self.editing = None;
        let removed = self.scene.remove_many(&self.selection.ids());
        self.selection.clear();
        if removed.is_empty() {
            return false;
        }
        self.snapshot();
        self.toast(ToastKind::Success, format!("Deleted {} object(s)", removed.len()));
        true
    }

    pub fn duplicate_selected(&mut self) -> bool {
        if self.locked {
            return false;
        }
        let clones: Vec<ShapeId> = self
            .selected_in_z_order()
            .into_iter()
            .filter_map(|id| self.scene.duplicate(id, DUPLICATE_OFFSET))
            .collect();
        if clones.is_empty() {
            return false;
        }
        self.selection = Selection::from_ids(clones);
        self.snapshot();
        self.toast(ToastKind::Success, "Duplicated");
        true
    }

    /// Group a multi-object selection into one object.
    pub fn group_selected(&mut self) -> bool {
        if self.locked || !self.selection.is_multi() {
            return false;
        }
        let Some(group) = self.scene.group(&self.selection.ids()) else {
            return false;
        };
        self.selection = Selection::Single(group);
        self.snapshot();
        self.toast(ToastKind::Success, "Grouped");
        true
    }

    /// Dissolve every selected group; the children become the selection.
    pub fn ungroup_selected(&mut self) -> bool {
        if self.locked {
            return false;
        }
        let mut children = Vec::new();
        for id in self.selected_in_z_order() {
            if let Some(ids) = self.scene.ungroup(id) {
                children.extend(ids);
            }
        }
        if children.is_empty() {
            return false;
        }
        self.selection = Selection::from_ids(children);
        self.snapshot();
        self.toast(ToastKind::Success, "Ungrouped");
        true
    }

    pub fn clear_canvas(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.editing = None;
        self.tools.cancel();
        self.scene.clear();
        self.selection.clear();
        self.snapshot();
        self.toast(ToastKind::Info, "Canvas cleared");
        true
    }

    fn reorder_selected(&mut self, command: Command) -> bool {
        let ids = self.selected_in_z_order();
        let mut changed = false;
        match command {
            // A selected object never jumps over another selected object.
            Command::BringForward => {
                let mut ceiling = self.scene.len();
                for &id in ids.iter().rev() {
                    let Some(pos) = self.scene.index_of(id) else {
                        continue;
                    };
                    if pos + 1 < ceiling && self.scene.bring_forward(id) {
                        changed = true;
                        ceiling = pos + 1;
                    } else {
                        ceiling = pos;
                    }
                }
            }
            Command::SendBackward => {
                let mut floor = 0;
                for &id in &ids {
                    let Some(pos) = self.scene.index_of(id) else {
                        continue;
                    };
                    if pos > floor && self.scene.send_backward(id) {
                        changed = true;
                        floor = pos;
                    } else {
                        floor = pos + 1;
                    }
                }
            }
            Command::BringToFront => {
                for &id in &ids {
                    changed |= self.scene.bring_to_front(id);
                }
            }
            Command::SendToBack => {
                for &id in ids.iter().rev() {
                    changed |= self.scene.send_to_back(id);
                }
            }
            _ => {}
        }
        if !changed {
            return false;
        }
        self.snapshot();
        match command {
            Command::BringToFront => self.toast(ToastKind::Success, "Brought to front"),
            Command::SendToBack => self.toast(ToastKind::Success, "Sent to back"),
            _ => {}
        }
        true
    }

    fn flip_selected(&mut self, horizontal: bool) -> bool {
        let ids = self.selection.ids();
        let mut changed = false;
        for id in ids {
            if let Some(shape) = self.scene.get_mut(id) {
                if horizontal {
                    shape.flip_x = !shape.flip_x;
                } else {
                    shape.flip_y = !shape.flip_y;
                }
                changed = true;
            }
        }
        if changed {
            self.snapshot();
        }
        changed
    }

    /// Align the selection's bounding box to an edge or the center of the
    /// visible area.
    fn align_selected(&mut self, alignment: Alignment) -> bool {
        let ids = self.selection.ids();
        let Some(bounds) = self.scene.bounds_of(&ids) else {
            return false;
        };
        let area = self.viewport.visible_rect();
        let delta = match alignment {
            Alignment::Left => Vec2::new(area.x0 - bounds.x0, 0.0),
            Alignment::Center => Vec2::new(area.center().x - bounds.center().x, 0.0),
            Alignment::Right => Vec2::new(area.x1 - bounds.x1, 0.0),
            Alignment::Top => Vec2::new(0.0, area.y0 - bounds.y0),
            Alignment::Middle => Vec2::new(0.0, area.center().y - bounds.center().y),
            Alignment::Bottom => Vec2::new(0.0, area.y1 - bounds.y1),
        };
        if delta == Vec2::ZERO {
            return false;
        }
        self.scene.translate(&ids, delta);
        self.snapshot();
        true
    }

    /// Add a shape on top, select it and record it in history.
    /// Returns `None` when the canvas is locked.
    pub fn add_shape(&mut self, shape: Shape) -> Option<ShapeId> {
        if self.locked {
            return None;
        }
        let id = self.scene.add(shape);
        self.selection = Selection::Single(id);
        self.snapshot();
        Some(id)
    }

    // --- import / export ---

    /// Export the scene, queueing a success or failure toast.
    pub fn export(
        &mut self,
        format: ExportFormat,
        raster: Option<&dyn RasterExporter>,
    ) -> Result<ExportFile, ExportError> {
        self.finish_editing();
        match export_scene(&self.scene, &self.viewport, format, raster) {
            Ok(file) => {
                self.toast(ToastKind::Success, format!("Exported as {}", format.label()));
                Ok(file)
            }
            Err(e) => {
                error!("export to {} failed: {}", format.label(), e);
                self.toast(ToastKind::Error, "Export failed");
                Err(e)
            }
        }
    }

    /// Place an image centered in the view. Returns `Ok(None)` when the
    /// canvas is locked.
    pub fn import_image(&mut self, bytes: &[u8]) -> Result<Option<ShapeId>, ImportError> {
        if self.locked {
            return Ok(None);
        }
        match import::import_image(bytes, &self.viewport) {
            Ok(shape) => {
                let id = self.add_shape(shape);
                self.toast(ToastKind::Success, "Image imported");
                Ok(id)
            }
            Err(e) => {
                warn!("image import failed: {}", e);
                self.toast(ToastKind::Error, "Failed to import image");
                Err(e)
            }
        }
    }

    // --- internals ---

    fn selected_in_z_order(&self) -> Vec<ShapeId> {
        self.scene
            .iter()
            .map(Shape::id)
            .filter(|id| self.selection.contains(*id))
            .collect()
    }

    fn snapshot(&mut self) {
        match self.scene.to_json() {
            Ok(json) => self.history.push(json),
            Err(e) => error!("failed to snapshot scene: {}", e),
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.events.push(SessionEvent::Toast { kind, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DEFAULT_HISTORY_LIMIT;
    use crate::input::Key;
    use crate::scene::DARK_BACKGROUND;
    use crate::shapes::{Rectangle, ShapeKind};
    use kurbo::Rect;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    fn drag(board: &mut Whiteboard, from: (f64, f64), to: (f64, f64)) {
        board.handle_pointer(down(from.0, from.1));
        board.handle_pointer(PointerEvent::Move {
            position: Point::new(to.0, to.1),
        });
        board.handle_pointer(PointerEvent::Up {
            position: Point::new(to.0, to.1),
            button: MouseButton::Left,
        });
    }

    fn draw_rect(board: &mut Whiteboard, from: (f64, f64), to: (f64, f64)) -> ShapeId {
        board.set_tool(ToolKind::Rectangle);
        drag(board, from, to);
        board.selection().single().unwrap()
    }

    fn toasts(board: &mut Whiteboard) -> Vec<String> {
        board
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Toast { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_session_seeds_history() {
        let board = Whiteboard::default();
        assert!(board.scene().is_empty());
        assert_eq!(board.history().cursor(), Some(0));
        assert!(!board.history().can_undo());
        assert_eq!(board.tool(), ToolKind::Select);
    }

    #[test]
    fn test_rectangle_drag() {
        let mut board = Whiteboard::default();
        board.set_tool(ToolKind::Rectangle);
        board.handle_pointer(down(50.0, 50.0));
        board.handle_pointer(PointerEvent::Move {
            position: Point::new(250.0, 150.0),
        });
        assert!(board.preview().is_some());
        assert!(board.scene().is_empty());
        board.handle_pointer(PointerEvent::Up {
            position: Point::new(250.0, 150.0),
            button: MouseButton::Left,
        });

        assert!(board.preview().is_none());
        assert_eq!(board.scene().len(), 1);
        let shape = &board.scene().objects()[0];
        let ShapeKind::Rectangle(rect) = &shape.kind else {
            panic!("expected rectangle");
        };
        assert_eq!(rect.position, Point::new(50.0, 50.0));
        assert!((rect.width - 200.0).abs() < 1e-9);
        assert!((rect.height - 100.0).abs() < 1e-9);
        assert_eq!(board.selection().single(), Some(shape.id()));
        assert_eq!(board.history().cursor(), Some(1));
        assert_eq!(*board.tool_state(), ToolState::Idle);
    }

    #[test]
    fn test_circle_click_uses_default_size() {
        let mut board = Whiteboard::default();
        board.set_tool(ToolKind::Circle);
        board.handle_pointer(down(300.0, 300.0));
        board.handle_pointer(PointerEvent::Up {
            position: Point::new(300.0, 300.0),
            button: MouseButton::Left,
        });
        let ShapeKind::Circle(circle) = &board.scene().objects()[0].kind else {
            panic!("expected circle");
        };
        assert!((circle.radius - 50.0).abs() < 1e-9);
        assert_eq!(circle.position, Point::new(250.0, 250.0));
    }

    #[test]
    fn test_undo_redo_two_shapes() {
        let mut board = Whiteboard::default();
        let a = draw_rect(&mut board, (0.0, 0.0), (50.0, 50.0));
        let b = draw_rect(&mut board, (100.0, 100.0), (200.0, 200.0));
        let after_b = board.scene().clone();

        assert!(board.execute(Command::Undo));
        assert_eq!(board.scene().len(), 1);
        assert!(board.scene().contains(a));
        assert!(!board.selection().contains(b));

        assert!(board.execute(Command::Redo));
        assert_eq!(board.scene(), &after_b);
        assert!(!board.execute(Command::Redo));

        assert!(board.undo());
        assert!(board.undo());
        assert!(board.scene().is_empty());
        assert!(!board.undo());
        assert_eq!(toasts(&mut board), vec!["Undone", "Redone", "Undone", "Undone"]);
    }

    #[test]
    fn test_new_edit_drops_redo_branch() {
        let mut board = Whiteboard::default();
        draw_rect(&mut board, (0.0, 0.0), (50.0, 50.0));
        board.undo();
        draw_rect(&mut board, (100.0, 0.0), (150.0, 50.0));
        assert!(!board.history().can_redo());
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn test_history_is_capped() {
        let mut board = Whiteboard::default();
        for i in 0..60 {
            let x = i as f64 * 20.0;
            draw_rect(&mut board, (x, 0.0), (x + 15.0, 15.0));
        }
        assert_eq!(board.history().len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(board.history().cursor(), Some(DEFAULT_HISTORY_LIMIT - 1));
    }

    #[test]
    fn test_zoom_to_max_then_reset() {
        let mut board = Whiteboard::default();
        for _ in 0..20 {
            board.execute(Command::ZoomIn);
        }
        assert_eq!(board.zoom_percent(), 500);
        board.execute(Command::ResetView);
        assert_eq!(board.zoom_percent(), 100);
        assert_eq!(board.viewport().pan, Vec2::ZERO);
    }

    #[test]
    fn test_wheel_zoom_stays_in_range() {
        let mut board = Whiteboard::default();
        let before = board.revision();
        board.handle_pointer(PointerEvent::Wheel {
            position: Point::new(100.0, 100.0),
            delta_y: -100_000.0,
        });
        assert_eq!(board.zoom_percent(), 500);
        board.handle_pointer(PointerEvent::Wheel {
            position: Point::new(100.0, 100.0),
            delta_y: 100_000.0,
        });
        assert_eq!(board.zoom_percent(), 10);
        assert!(board.revision() > before);
    }

    #[test]
    fn test_group_and_ungroup_three() {
        let mut board = Whiteboard::default();
        for i in 0..3 {
            let x = i as f64 * 100.0;
            draw_rect(&mut board, (x, 0.0), (x + 50.0, 40.0));
        }
        let before: Vec<Rect> = board.scene().iter().map(Shape::bounds).collect();

        assert!(!board.execute(Command::Group));
        board.execute(Command::SelectAll);
        assert!(board.execute(Command::Group));
        assert_eq!(board.scene().len(), 1);
        let group = board.selection().single().unwrap();
        assert!(board.scene().get(group).unwrap().is_group());

        assert!(board.execute(Command::Ungroup));
        assert_eq!(board.scene().len(), 3);
        assert_eq!(board.selection().len(), 3);
        let after: Vec<Rect> = board.scene().iter().map(Shape::bounds).collect();
        for (a, b) in before.iter().zip(&after) {
            assert!((a.x0 - b.x0).abs() < 1e-9 && (a.y1 - b.y1).abs() < 1e-9);
        }
        assert!(board.scene().iter().all(|s| s.selectable));
    }

    #[test]
    fn test_lock_suppresses_editing_operations() {
        let mut board = Whiteboard::default();
        draw_rect(&mut board, (0.0, 0.0), (50.0, 50.0));
        board.execute(Command::ToggleLock);
        assert!(board.is_locked());

        board.set_tool(ToolKind::Rectangle);
        drag(&mut board, (100.0, 100.0), (200.0, 200.0));
        board.set_tool(ToolKind::Pen);
        drag(&mut board, (100.0, 100.0), (200.0, 200.0));
        board.set_tool(ToolKind::Text);
        board.handle_pointer(down(10.0, 10.0));
        assert_eq!(board.scene().len(), 1);

        board.execute(Command::SelectAll);
        assert!(!board.execute(Command::DeleteSelected));
        assert!(!board.execute(Command::DuplicateSelected));
        assert!(!board.execute(Command::ClearCanvas));
        assert_eq!(board.scene().len(), 1);

        // Navigation still works.
        assert!(board.execute(Command::ZoomIn));
        assert_eq!(board.zoom_percent(), 125);
    }

    #[test]
    fn test_hand_tool_pans_without_touching_scene() {
        let mut board = Whiteboard::default();
        board.set_tool(ToolKind::Hand);
        assert_eq!(board.cursor(), CursorIcon::Grab);
        board.handle_pointer(down(100.0, 100.0));
        assert_eq!(board.cursor(), CursorIcon::Grabbing);
        board.handle_pointer(PointerEvent::Move {
            position: Point::new(130.0, 90.0),
        });
        board.handle_pointer(PointerEvent::Leave);
        assert_eq!(board.viewport().pan, Vec2::new(30.0, -10.0));
        assert_eq!(board.zoom_percent(), 100);
        assert_eq!(*board.tool_state(), ToolState::Idle);
        assert_eq!(board.history().len(), 1);
    }

    #[test]
    fn test_middle_button_pans_with_any_tool() {
        let mut board = Whiteboard::default();
        board.set_tool(ToolKind::Rectangle);
        board.handle_pointer(PointerEvent::Down {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Middle,
            modifiers: Modifiers::NONE,
        });
        board.handle_pointer(PointerEvent::Move {
            position: Point::new(-40.0, 0.0),
        });
        board.handle_pointer(PointerEvent::Up {
            position: Point::new(-40.0, 0.0),
            button: MouseButton::Middle,
        });
        assert_eq!(board.viewport().pan, Vec2::new(-40.0, 0.0));
        assert!(board.scene().is_empty());
    }

    #[test]
    fn test_drawing_while_zoomed_uses_logical_coordinates() {
        let mut board = Whiteboard::default();
        board.execute(Command::ZoomIn);
        board.execute(Command::ZoomIn);
        let id = draw_rect(&mut board, (100.0, 100.0), (300.0, 200.0));
        let bounds = board.scene().get(id).unwrap().geometry_bounds();
        assert!((bounds.x0 - 66.666_666_666).abs() < 1e-6);
        assert!((bounds.width() - 133.333_333_333).abs() < 1e-6);
    }

    #[test]
    fn test_snap_to_grid_rounds_new_shapes() {
        let mut board = Whiteboard::default();
        board.execute(Command::ToggleSnap);
        let id = draw_rect(&mut board, (55.0, 45.0), (250.0, 170.0));
        assert_eq!(
            board.scene().get(id).unwrap().geometry_bounds(),
            Rect::new(40.0, 40.0, 240.0, 160.0)
        );
    }

    #[test]
    fn test_switching_tool_mid_gesture_keeps_gesture() {
        let mut board = Whiteboard::default();
        board.set_tool(ToolKind::Ellipse);
        board.handle_pointer(down(0.0, 0.0));
        board.execute(Command::SetTool(ToolKind::Line));
        board.handle_pointer(PointerEvent::Up {
            position: Point::new(80.0, 60.0),
            button: MouseButton::Left,
        });
        assert!(matches!(board.scene().objects()[0].kind, ShapeKind::Ellipse(_)));
        assert_eq!(board.tool(), ToolKind::Line);
    }

    #[test]
    fn test_freehand_strokes() {
        let mut board = Whiteboard::default();
        board.set_tool(ToolKind::Pen);
        board.handle_pointer(down(0.0, 0.0));
        for i in 1..5 {
            board.handle_pointer(PointerEvent::Move {
                position: Point::new(i as f64 * 10.0, i as f64 * 5.0),
            });
        }
        board.handle_pointer(PointerEvent::Up {
            position: Point::new(40.0, 20.0),
            button: MouseButton::Left,
        });
        assert_eq!(board.scene().len(), 1);
        assert_eq!(board.scene().objects()[0].kind.name(), "freehand");

        board.set_tool(ToolKind::Eraser);
        drag(&mut board, (0.0, 0.0), (10.0, 10.0));
        let eraser = &board.scene().objects()[1];
        assert_eq!(eraser.style.stroke_color, board.scene().background);
    }

    #[test]
    fn test_text_tool_places_and_edits() {
        let mut board = Whiteboard::default();
        board.set_tool(ToolKind::Text);
        assert_eq!(board.cursor(), CursorIcon::Crosshair);
        board.handle_pointer(down(40.0, 40.0));
        assert_eq!(board.tool(), ToolKind::Select);
        assert!(
            board
                .drain_events()
                .contains(&SessionEvent::ToolChanged(ToolKind::Select))
        );
        let id = board.selection().single().unwrap();
        assert_eq!(board.editing_text().unwrap().selected_text(), "Click to edit");
        assert_eq!(board.history().len(), 2);

        // Shortcut letters type into the text instead of switching tools.
        for c in "Hi r".chars() {
            assert!(board.key_down(&KeyEvent::char(c), InputFocus::Canvas));
        }
        assert_eq!(board.tool(), ToolKind::Select);
        let text = board.scene().get(id).and_then(Shape::as_text).unwrap();
        assert_eq!(text.content, "Hi r");

        board.key_down(&KeyEvent::new(Key::Escape, Modifiers::NONE), InputFocus::Canvas);
        assert!(board.editing_text().is_none());
        assert_eq!(board.history().len(), 3);

        board.undo();
        let text = board.scene().get(id).and_then(Shape::as_text).unwrap();
        assert_eq!(text.content, "Click to edit");
    }

    #[test]
    fn test_sticky_notes_cycle_colors() {
        let mut board = Whiteboard::default();
        board.set_tool(ToolKind::Sticky);
        board.handle_pointer(down(0.0, 0.0));
        board.finish_editing();
        board.set_tool(ToolKind::Sticky);
        board.handle_pointer(down(300.0, 0.0));

        assert_eq!(board.scene().len(), 4);
        let notes: Vec<&Shape> = board
            .scene()
            .iter()
            .filter(|s| matches!(s.kind, ShapeKind::Rectangle(_)))
            .collect();
        assert_ne!(notes[0].style.fill_color, notes[1].style.fill_color);
        let editing = board.editing_text().unwrap();
        assert_eq!(editing.text(), "Note...");
        assert_eq!(board.selection().single(), Some(editing.shape_id()));
    }

    #[test]
    fn test_click_select_and_drag_moves_selection() {
        let mut board = Whiteboard::default();
        let id = draw_rect(&mut board, (0.0, 0.0), (100.0, 100.0));
        board.set_tool(ToolKind::Select);
        board.execute(Command::Deselect);

        drag(&mut board, (50.0, 50.0), (80.0, 70.0));
        assert_eq!(board.selection().single(), Some(id));
        let ShapeKind::Rectangle(rect) = &board.scene().get(id).unwrap().kind else {
            panic!("expected rectangle");
        };
        assert_eq!(rect.position, Point::new(30.0, 20.0));
        assert_eq!(board.history().len(), 3);

        // Clicking empty canvas clears the selection.
        drag(&mut board, (500.0, 500.0), (500.0, 500.0));
        assert!(board.selection().is_empty());
    }

    #[test]
    fn test_shift_click_and_marquee() {
        let mut board = Whiteboard::default();
        let a = draw_rect(&mut board, (0.0, 0.0), (50.0, 50.0));
        let b = draw_rect(&mut board, (100.0, 0.0), (150.0, 50.0));
        let c = draw_rect(&mut board, (300.0, 300.0), (350.0, 350.0));
        board.set_tool(ToolKind::Select);
        board.execute(Command::Deselect);

        drag(&mut board, (-10.0, -10.0), (200.0, 100.0));
        assert_eq!(board.selection().ids(), vec![a, b]);

        board.handle_pointer(PointerEvent::Down {
            position: Point::new(325.0, 325.0),
            button: MouseButton::Left,
            modifiers: Modifiers::SHIFT,
        });
        board.handle_pointer(PointerEvent::Up {
            position: Point::new(325.0, 325.0),
            button: MouseButton::Left,
        });
        assert_eq!(board.selection().len(), 3);
        assert!(board.selection().contains(c));
    }

    #[test]
    fn test_delete_and_duplicate() {
        let mut board = Whiteboard::default();
        let id = draw_rect(&mut board, (0.0, 0.0), (50.0, 50.0));
        assert!(board.execute(Command::DuplicateSelected));
        let clone = board.selection().single().unwrap();
        assert_ne!(clone, id);
        assert_eq!(
            board.scene().get(clone).unwrap().geometry_bounds(),
            Rect::new(20.0, 20.0, 70.0, 70.0)
        );

        board.execute(Command::SelectAll);
        assert!(board.execute(Command::DeleteSelected));
        assert!(board.scene().is_empty());
        assert!(!board.execute(Command::DeleteSelected));
        let messages = toasts(&mut board);
        assert_eq!(messages, vec!["Duplicated", "Deleted 2 object(s)"]);
    }

    #[test]
    fn test_z_order_commands_preserve_relative_order() {
        let mut board = Whiteboard::default();
        let a = draw_rect(&mut board, (0.0, 0.0), (50.0, 50.0));
        let b = draw_rect(&mut board, (10.0, 0.0), (60.0, 50.0));
        let c = draw_rect(&mut board, (20.0, 0.0), (70.0, 50.0));
        board.execute(Command::SelectAll);
        board.selection = Selection::from_ids(vec![b, c]);

        assert!(board.execute(Command::SendToBack));
        let order: Vec<ShapeId> = board.scene().iter().map(Shape::id).collect();
        assert_eq!(order, vec![b, c, a]);

        assert!(board.execute(Command::BringToFront));
        let order: Vec<ShapeId> = board.scene().iter().map(Shape::id).collect();
        assert_eq!(order, vec![a, b, c]);
        assert!(!board.execute(Command::BringForward));

        board.selection = Selection::Single(a);
        assert!(board.key_down(&KeyEvent::char(']'), InputFocus::Canvas));
        assert_eq!(board.scene().index_of(a), Some(1));
    }

    #[test]
    fn test_flip_and_align() {
        let mut board = Whiteboard::default();
        let id = draw_rect(&mut board, (100.0, 100.0), (200.0, 150.0));
        assert!(board.execute(Command::FlipHorizontal));
        assert!(board.scene().get(id).unwrap().flip_x);
        assert!(board.execute(Command::FlipHorizontal));
        assert!(!board.scene().get(id).unwrap().flip_x);

        assert!(board.execute(Command::Align(Alignment::Right)));
        assert!((board.scene().get(id).unwrap().bounds().x1 - 800.0).abs() < 1e-9);
        assert!(board.execute(Command::Align(Alignment::Middle)));
        assert!((board.scene().get(id).unwrap().bounds().center().y - 300.0).abs() < 1e-9);
        assert!(!board.execute(Command::Align(Alignment::Middle)));
    }

    #[test]
    fn test_clear_canvas_is_undoable() {
        let mut board = Whiteboard::default();
        draw_rect(&mut board, (0.0, 0.0), (50.0, 50.0));
        assert!(board.execute(Command::ClearCanvas));
        assert!(board.scene().is_empty());
        assert!(board.undo());
        assert_eq!(board.scene().len(), 1);
    }

    #[test]
    fn test_shortcuts_respect_focus_and_mount() {
        let mut board = Whiteboard::default();
        assert!(board.key_down(&KeyEvent::char('r'), InputFocus::Canvas));
        assert_eq!(board.tool(), ToolKind::Rectangle);
        assert!(!board.key_down(&KeyEvent::char('c'), InputFocus::TextInput));
        assert_eq!(board.tool(), ToolKind::Rectangle);

        board.unmount();
        assert!(!board.key_down(&KeyEvent::char('c'), InputFocus::Canvas));
        board.mount();
        assert!(board.key_down(&KeyEvent::new(Key::Char('?'), Modifiers::SHIFT), InputFocus::Canvas));
        assert!(board.shortcuts_visible());
        board.key_down(&KeyEvent::new(Key::Escape, Modifiers::NONE), InputFocus::Canvas);
        assert!(!board.shortcuts_visible());
    }

    #[test]
    fn test_fit_to_screen() {
        let mut board = Whiteboard::default();
        board.execute(Command::FitToScreen);
        assert_eq!(board.zoom_percent(), 100);
        draw_rect(&mut board, (0.0, 0.0), (1400.0, 500.0));
        board.execute(Command::FitToScreen);
        assert_eq!(board.zoom_percent(), 50);
    }

    #[test]
    fn test_theme_survives_undo() {
        let mut board = Whiteboard::default();
        draw_rect(&mut board, (0.0, 0.0), (50.0, 50.0));
        board.set_theme(CanvasTheme::Dark);
        board.undo();
        assert_eq!(board.scene().background, DARK_BACKGROUND);
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn test_loaded_scene_takes_configured_background() {
        let mut board = Whiteboard::new(WhiteboardConfig {
            theme: CanvasTheme::Dark,
            ..WhiteboardConfig::default()
        });
        let mut scene = Scene::default();
        scene.add(Shape::new(Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0)));
        board.load_scene(scene);
        assert_eq!(board.scene().background, DARK_BACKGROUND);
        assert_eq!(board.scene().len(), 1);

        board.execute(Command::ClearCanvas);
        board.undo();
        assert_eq!(board.scene().background, DARK_BACKGROUND);
        assert_eq!(board.scene().len(), 1);
    }

    #[test]
    fn test_layouts_follow_toggles() {
        let mut board = Whiteboard::default();
        assert!(board.grid_layout().is_some());
        assert!(board.minimap_layout().is_some());
        board.execute(Command::ToggleGrid);
        board.execute(Command::ToggleMinimap);
        assert!(board.grid_layout().is_none());
        assert!(board.minimap_layout().is_none());
    }

    #[test]
    fn test_export_and_import_toasts() {
        let mut board = Whiteboard::default();
        board.add_shape(Shape::new(Rectangle::new(Point::new(10.0, 10.0), 30.0, 30.0)));
        let file = board.export(ExportFormat::Json, None).unwrap();
        assert_eq!(file.file_name, "whiteboard.json");
        assert!(board.export(ExportFormat::Png, None).is_err());
        assert!(board.import_image(b"nope").is_err());
        assert_eq!(
            toasts(&mut board),
            vec!["Exported as JSON", "Export failed", "Failed to import image"]
        );
    }
}
