//! In-place editing of text objects.

use crate::input::{Key, KeyEvent};
use crate::shapes::ShapeId;

/// Result of handling a text editing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditResult {
    /// Event was handled, text may have changed.
    Handled,
    /// Event was handled, user wants to exit editing.
    ExitEdit,
    /// Event was not handled (pass to other handlers).
    NotHandled,
}

/// Editing state for the text object that currently has focus.
///
/// Positions are byte offsets that always sit on char boundaries. The
/// selection runs between `anchor` and `cursor` when an anchor is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEditState {
    shape_id: ShapeId,
    text: String,
    cursor: usize,
    anchor: Option<usize>,
}

impl TextEditState {
    /// Start editing with the cursor at the end.
    pub fn new(shape_id: ShapeId, text: &str) -> Self {
        Self {
            shape_id,
            text: text.to_string(),
            cursor: text.len(),
            anchor: None,
        }
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Selected byte range, if any.
    pub fn selection(&self) -> Option<std::ops::Range<usize>> {
        let anchor = self.anchor?;
        (anchor != self.cursor).then(|| anchor.min(self.cursor)..anchor.max(self.cursor))
    }

    pub fn selected_text(&self) -> &str {
        self.selection().map_or("", |range| &self.text[range])
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.text.len();
    }

    pub fn collapse_selection(&mut self) {
        self.anchor = None;
    }

    /// Replace the selection (or insert at the cursor).
    pub fn insert(&mut self, s: &str) {
        self.delete_selection();
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        if let Some(prev) = self.prev_boundary(self.cursor) {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.delete_selection() {
            return;
        }
        if let Some(next) = self.next_boundary(self.cursor) {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_left(&mut self, extend: bool) {
        self.update_anchor(extend);
        match self.selection().filter(|_| !extend) {
            Some(range) => self.cursor = range.start,
            None => {
                if let Some(prev) = self.prev_boundary(self.cursor) {
                    self.cursor = prev;
                }
            }
        }
        if !extend {
            self.anchor = None;
        }
    }

    pub fn move_right(&mut self, extend: bool) {
        self.update_anchor(extend);
        match self.selection().filter(|_| !extend) {
            Some(range) => self.cursor = range.end,
            None => {
                if let Some(next) = self.next_boundary(self.cursor) {
                    self.cursor = next;
                }
            }
        }
        if !extend {
            self.anchor = None;
        }
    }

    /// Apply a key press.
    pub fn handle_key(&mut self, event: &KeyEvent) -> TextEditResult {
        let action_mod = event.modifiers.command();
        let shift = event.modifiers.shift;
        match &event.key {
            Key::Escape => return TextEditResult::ExitEdit,
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::Enter => self.insert("\n"),
            Key::ArrowLeft => self.move_left(shift),
            Key::ArrowRight => self.move_right(shift),
            Key::Char(c) if action_mod => {
                if c.eq_ignore_ascii_case(&'a') {
                    self.select_all();
                } else {
                    return TextEditResult::NotHandled;
                }
            }
            Key::Char(c) => {
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf));
            }
            Key::Other(_) => return TextEditResult::NotHandled,
        }
        TextEditResult::Handled
    }

    fn update_anchor(&mut self, extend: bool) {
        if extend && self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        }
    }

    fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection() else {
            self.anchor = None;
            return false;
        };
        self.cursor = range.start;
        self.text.replace_range(range, "");
        self.anchor = None;
        true
    }

    fn prev_boundary(&self, pos: usize) -> Option<usize> {
        self.text[..pos].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self, pos: usize) -> Option<usize> {
        self.text[pos..].chars().next().map(|c| pos + c.len_utf8())
    }
}
