//! Keyboard shortcut registry and dispatch.

use crate::input::{InputFocus, Key, KeyEvent};
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};

/// Edge or center used by the align commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

/// Session commands reachable from shortcuts and toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    SetTool(ToolKind),
    Undo,
    Redo,
    DeleteSelected,
    DuplicateSelected,
    Group,
    Ungroup,
    SelectAll,
    /// Drop the selection and close the shortcuts overlay.
    Deselect,
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,
    FlipHorizontal,
    FlipVertical,
    Align(Alignment),
    ZoomIn,
    ZoomOut,
    ResetView,
    FitToScreen,
    ClearCanvas,
    ToggleLock,
    ToggleGrid,
    ToggleSnap,
    ToggleMinimap,
    ToggleShortcuts,
    Save,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts, as listed in the shortcuts overlay.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("V", false, false, "Select"),
            Shortcut::new("H", false, false, "Hand (pan)"),
            Shortcut::new("P", false, false, "Pen"),
            Shortcut::new("M", false, false, "Highlighter"),
            Shortcut::new("E", false, false, "Eraser"),
            Shortcut::new("R", false, false, "Rectangle"),
            Shortcut::new("C", false, false, "Circle"),
            Shortcut::new("O", false, false, "Ellipse"),
            Shortcut::new("T", false, false, "Triangle"),
            Shortcut::new("D", false, false, "Diamond"),
            Shortcut::new("L", false, false, "Line"),
            Shortcut::new("A", false, false, "Star"),
            Shortcut::new("W", false, false, "Arrow"),
            Shortcut::new("G", false, false, "Hexagon"),
            Shortcut::new("X", false, false, "Text"),
            Shortcut::new("S", false, false, "Sticky note"),
            Shortcut::new("Delete", false, false, "Delete selected"),
            Shortcut::new("Escape", false, false, "Deselect"),
            Shortcut::new("[", false, false, "Send backward"),
            Shortcut::new("]", false, false, "Bring forward"),
            Shortcut::new("F", false, false, "Fit to screen"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("D", true, false, "Duplicate"),
            Shortcut::new("G", true, false, "Group"),
            Shortcut::new("G", true, true, "Ungroup"),
            Shortcut::new("A", true, false, "Select all"),
            Shortcut::new("0", true, false, "Reset view"),
            Shortcut::new("=", true, false, "Zoom in"),
            Shortcut::new("-", true, false, "Zoom out"),
            Shortcut::new("S", true, false, "Save"),
            Shortcut::new("?", false, true, "Toggle shortcuts"),
        ]
    }
}

/// Maps key presses to commands while the whiteboard view is mounted.
///
/// Hosts mount the dispatcher when the whiteboard becomes visible and
/// unmount it when it goes away, so keys pressed elsewhere never reach the
/// session. Keys typed into a focused text input are never intercepted.
#[derive(Debug, Clone, Default)]
pub struct ShortcutDispatcher {
    mounted: bool,
}

impl ShortcutDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Resolve a key press, or `None` when it is not a shortcut here.
    pub fn resolve(&self, event: &KeyEvent, focus: InputFocus) -> Option<Command> {
        if !self.mounted || focus == InputFocus::TextInput {
            return None;
        }
        resolve_key(event)
    }
}

/// Key table without the mount/focus scoping.
pub fn resolve_key(event: &KeyEvent) -> Option<Command> {
    let modifiers = event.modifiers;
    let ch = match &event.key {
        Key::Char(c) => Some(c.to_ascii_lowercase()),
        _ => None,
    };

    if modifiers.command() {
        return match ch? {
            'z' if modifiers.shift => Some(Command::Redo),
            'z' => Some(Command::Undo),
            'd' => Some(Command::DuplicateSelected),
            'g' if modifiers.shift => Some(Command::Ungroup),
            'g' => Some(Command::Group),
            'a' => Some(Command::SelectAll),
            '0' => Some(Command::ResetView),
            '=' | '+' => Some(Command::ZoomIn),
            '-' => Some(Command::ZoomOut),
            's' => Some(Command::Save),
            _ => None,
        };
    }

    if modifiers.shift {
        return match ch? {
            '?' => Some(Command::ToggleShortcuts),
            _ => None,
        };
    }

    match &event.key {
        Key::Delete | Key::Backspace => return Some(Command::DeleteSelected),
        Key::Escape => return Some(Command::Deselect),
        _ => {}
    }

    let tool = match ch? {
        'v' => ToolKind::Select,
        'h' => ToolKind::Hand,
        'p' => ToolKind::Pen,
        'm' => ToolKind::Highlighter,
        'e' => ToolKind::Eraser,
        'r' => ToolKind::Rectangle,
        'c' => ToolKind::Circle,
        'o' => ToolKind::Ellipse,
        't' => ToolKind::Triangle,
        'd' => ToolKind::Diamond,
        'l' => ToolKind::Line,
        'w' => ToolKind::Arrow,
        'x' => ToolKind::Text,
        's' => ToolKind::Sticky,
        'a' => ToolKind::Star,
        'g' => ToolKind::Hexagon,
        '[' => return Some(Command::SendBackward),
        ']' => return Some(Command::BringForward),
        'f' => return Some(Command::FitToScreen),
        _ => return None,
    };
    Some(Command::SetTool(tool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn mounted() -> ShortcutDispatcher {
        let mut dispatcher = ShortcutDispatcher::new();
        dispatcher.mount();
        dispatcher
    }

    #[test]
    fn test_tool_keys() {
        let dispatcher = mounted();
        let cases = [
            ('v', ToolKind::Select),
            ('h', ToolKind::Hand),
            ('r', ToolKind::Rectangle),
            ('a', ToolKind::Star),
            ('g', ToolKind::Hexagon),
            ('x', ToolKind::Text),
            ('s', ToolKind::Sticky),
        ];
        for (c, tool) in cases {
            assert_eq!(
                dispatcher.resolve(&KeyEvent::char(c), InputFocus::Canvas),
                Some(Command::SetTool(tool))
            );
        }
        assert_eq!(
            dispatcher.resolve(&KeyEvent::char('R'), InputFocus::Canvas),
            Some(Command::SetTool(ToolKind::Rectangle))
        );
    }

    #[test]
    fn test_command_keys() {
        let dispatcher = mounted();
        let resolve = |event: KeyEvent| dispatcher.resolve(&event, InputFocus::Canvas);
        assert_eq!(resolve(KeyEvent::command('z')), Some(Command::Undo));
        assert_eq!(
            resolve(KeyEvent::new(Key::Char('Z'), Modifiers::CTRL_SHIFT)),
            Some(Command::Redo)
        );
        assert_eq!(
            resolve(KeyEvent::new(Key::Char('g'), Modifiers::CTRL_SHIFT)),
            Some(Command::Ungroup)
        );
        assert_eq!(resolve(KeyEvent::command('+')), Some(Command::ZoomIn));
        assert_eq!(resolve(KeyEvent::command('0')), Some(Command::ResetView));
        assert_eq!(resolve(KeyEvent::command('s')), Some(Command::Save));
        assert_eq!(resolve(KeyEvent::command('q')), None);
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(resolve(KeyEvent::new(Key::Char('d'), meta)), Some(Command::DuplicateSelected));
    }

    #[test]
    fn test_plain_and_shift_keys() {
        let dispatcher = mounted();
        let resolve = |event: KeyEvent| dispatcher.resolve(&event, InputFocus::Canvas);
        assert_eq!(resolve(KeyEvent::new(Key::Delete, Modifiers::NONE)), Some(Command::DeleteSelected));
        assert_eq!(resolve(KeyEvent::new(Key::Backspace, Modifiers::NONE)), Some(Command::DeleteSelected));
        assert_eq!(resolve(KeyEvent::new(Key::Escape, Modifiers::NONE)), Some(Command::Deselect));
        assert_eq!(resolve(KeyEvent::char('[')), Some(Command::SendBackward));
        assert_eq!(resolve(KeyEvent::char(']')), Some(Command::BringForward));
        assert_eq!(resolve(KeyEvent::char('f')), Some(Command::FitToScreen));
        assert_eq!(
            resolve(KeyEvent::new(Key::Char('?'), Modifiers::SHIFT)),
            Some(Command::ToggleShortcuts)
        );
        // Shift with any other key does nothing.
        assert_eq!(resolve(KeyEvent::new(Key::Char('R'), Modifiers::SHIFT)), None);
        assert_eq!(resolve(KeyEvent::char('q')), None);
    }

    #[test]
    fn test_scoping() {
        let mut dispatcher = ShortcutDispatcher::new();
        let event = KeyEvent::char('r');
        assert_eq!(dispatcher.resolve(&event, InputFocus::Canvas), None);
        dispatcher.mount();
        assert_eq!(dispatcher.resolve(&event, InputFocus::TextInput), None);
        assert!(dispatcher.resolve(&event, InputFocus::Canvas).is_some());
        dispatcher.unmount();
        assert_eq!(dispatcher.resolve(&event, InputFocus::Canvas), None);
    }

    #[test]
    fn test_registry_format() {
        let all = ShortcutRegistry::all();
        assert!(all.iter().any(|s| s.format() == "Ctrl+Shift+Z"));
        assert!(all.iter().any(|s| s.format() == "Shift+?"));
    }
}
