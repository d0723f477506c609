//! Caret, selection and text storage for a text input.
//!
//! Positions are code-point indices into the raw text, always clamped to
//! `[0, len]`. The selection runs between `anchor` and `caret`; it is empty
//! when they are equal. Inserted text is NFC-normalised.

use ropey::Rope;
use unicode_normalization::UnicodeNormalization;

use super::history::EditSnapshot;
use crate::text::{next_word_boundary, prev_word_boundary, word_range_at};

/// Editable text with a caret and selection anchor.
#[derive(Clone, Debug, Default)]
pub struct EditState {
    rope: Rope,
    anchor: usize,
    caret: usize,
}

impl EditState {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut state = Self::default();
        state.set_text(text);
        state
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Replace the text; the caret moves to the end.
    pub fn set_text(&mut self, text: &str) {
        let normalized: String = text.nfc().collect();
        self.rope = Rope::from_str(&normalized);
        self.caret = self.len();
        self.anchor = self.caret;
    }

    #[must_use]
    pub fn caret(&self) -> usize {
        self.caret
    }

    #[must_use]
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Normalised `(start, end)` of the selection.
    #[must_use]
    pub fn selection(&self) -> (usize, usize) {
        (self.anchor.min(self.caret), self.anchor.max(self.caret))
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.anchor != self.caret
    }

    #[must_use]
    pub fn selected_text(&self) -> String {
        let (start, end) = self.selection();
        self.rope.slice(start..end).to_string()
    }

    fn clamp(&self, pos: usize) -> usize {
        if pos > self.len() {
            debug_assert!(false, "caret index {pos} past end {}", self.len());
            crate::log::warn(&format!("caret index {pos} clamped to {}", self.len()));
            return self.len();
        }
        pos
    }

    /// Move the caret. With `extend`, the anchor stays put.
    pub fn set_caret(&mut self, pos: usize, extend: bool) {
        self.caret = self.clamp(pos);
        if !extend {
            self.anchor = self.caret;
        }
    }

    /// Select `[anchor, caret]`, in either direction.
    pub fn select(&mut self, anchor: usize, caret: usize) {
        self.anchor = self.clamp(anchor);
        self.caret = self.clamp(caret);
    }

    pub fn select_all(&mut self) {
        self.anchor = 0;
        self.caret = self.len();
    }

    /// Select the word under `pos`.
    pub fn select_word_at(&mut self, pos: usize) {
        let text = self.text();
        let (start, end) = word_range_at(&text, self.clamp(pos));
        self.anchor = start;
        self.caret = end;
    }

    /// Replace the selection with `text`. Returns whether anything changed.
    pub fn insert(&mut self, text: &str) -> bool {
        let normalized: String = text.nfc().collect();
        if normalized.is_empty() && !self.has_selection() {
            return false;
        }
        let (start, end) = self.selection();
        self.rope.remove(start..end);
        self.rope.insert(start, &normalized);
        self.caret = start + normalized.chars().count();
        self.anchor = self.caret;
        true
    }

    /// Remove `[start, end)` and put the caret at `start`.
    pub fn delete_range(&mut self, start: usize, end: usize) -> bool {
        let start = self.clamp(start);
        let end = self.clamp(end);
        let (start, end) = (start.min(end), start.max(end));
        if start == end {
            return false;
        }
        self.rope.remove(start..end);
        self.caret = start;
        self.anchor = start;
        true
    }

    fn delete_selection(&mut self) -> bool {
        let (start, end) = self.selection();
        self.delete_range(start, end)
    }

    /// Backspace: the selection, or the code point before the caret.
    pub fn delete_backward(&mut self) -> bool {
        if self.has_selection() {
            return self.delete_selection();
        }
        self.caret > 0 && self.delete_range(self.caret - 1, self.caret)
    }

    /// Delete: the selection, or the code point after the caret.
    pub fn delete_forward(&mut self) -> bool {
        if self.has_selection() {
            return self.delete_selection();
        }
        self.delete_range(self.caret, (self.caret + 1).min(self.len()))
    }

    pub fn delete_word_backward(&mut self) -> bool {
        if self.has_selection() {
            return self.delete_selection();
        }
        let start = prev_word_boundary(&self.text(), self.caret);
        self.delete_range(start, self.caret)
    }

    pub fn delete_word_forward(&mut self) -> bool {
        if self.has_selection() {
            return self.delete_selection();
        }
        let end = next_word_boundary(&self.text(), self.caret);
        self.delete_range(self.caret, end)
    }

    /// Without `extend`, an active selection collapses to its start.
    pub fn move_left(&mut self, extend: bool) {
        if self.has_selection() && !extend {
            let (start, _) = self.selection();
            self.set_caret(start, false);
        } else {
            self.set_caret(self.caret.saturating_sub(1), extend);
        }
    }

    pub fn move_right(&mut self, extend: bool) {
        if self.has_selection() && !extend {
            let (_, end) = self.selection();
            self.set_caret(end, false);
        } else {
            self.set_caret((self.caret + 1).min(self.len()), extend);
        }
    }

    pub fn move_word_left(&mut self, extend: bool) {
        let pos = prev_word_boundary(&self.text(), self.caret);
        self.set_caret(pos, extend);
    }

    pub fn move_word_right(&mut self, extend: bool) {
        let pos = next_word_boundary(&self.text(), self.caret);
        self.set_caret(pos, extend);
    }

    /// Start of the caret's line.
    pub fn move_line_start(&mut self, extend: bool) {
        let line = self.line_of(self.caret);
        self.set_caret(self.line_start(line), extend);
    }

    /// End of the caret's line, before its newline.
    pub fn move_line_end(&mut self, extend: bool) {
        let line = self.line_of(self.caret);
        self.set_caret(self.line_start(line) + self.line_len(line), extend);
    }

    pub fn move_doc_start(&mut self, extend: bool) {
        self.set_caret(0, extend);
    }

    pub fn move_doc_end(&mut self, extend: bool) {
        self.set_caret(self.len(), extend);
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line containing code point `pos`.
    #[must_use]
    pub fn line_of(&self, pos: usize) -> usize {
        self.rope.char_to_line(pos.min(self.len()))
    }

    #[must_use]
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return self.len();
        }
        self.rope.line_to_char(line)
    }

    /// Code points on `line`, excluding the line break.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && slice.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        len
    }

    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        let start = self.line_start(line);
        self.rope.slice(start..start + self.line_len(line)).to_string()
    }

    /// `(line, column)` of code point `pos`.
    #[must_use]
    pub fn line_col(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.len());
        let line = self.line_of(pos);
        (line, pos - self.line_start(line))
    }

    #[must_use]
    pub fn snapshot(&self) -> EditSnapshot {
        EditSnapshot {
            text: self.text(),
            caret: self.caret,
            anchor: self.anchor,
        }
    }

    /// Restore a snapshot exactly; indices are clamped to the restored text.
    pub fn restore(&mut self, snapshot: &EditSnapshot) {
        self.rope = Rope::from_str(&snapshot.text);
        let len = self.len();
        self.caret = snapshot.caret.min(len);
        self.anchor = snapshot.anchor.min(len);
    }
}
