//! Bounded undo/redo of text input states.

use std::collections::VecDeque;

/// Default number of undo steps retained.
pub const DEFAULT_UNDO_CAPACITY: usize = 50;

/// Text, caret and selection anchor at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditSnapshot {
    pub text: String,
    pub caret: usize,
    pub anchor: usize,
}

impl EditSnapshot {
    /// Normalised `(start, end)` selection.
    #[must_use]
    pub fn selection(&self) -> (usize, usize) {
        (self.caret.min(self.anchor), self.caret.max(self.anchor))
    }
}

/// Undo ring of pre-mutation snapshots plus a redo stack.
#[derive(Clone, Debug)]
pub struct UndoRing {
    undo: VecDeque<EditSnapshot>,
    redo: Vec<EditSnapshot>,
    capacity: usize,
}

impl Default for UndoRing {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the state before a mutation. Clears the redo stack.
    pub fn push(&mut self, before: EditSnapshot) {
        self.redo.clear();
        self.undo.push_back(before);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    /// Step back: `current` moves to the redo stack.
    pub fn undo(&mut self, current: EditSnapshot) -> Option<EditSnapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward: `current` moves back onto the undo ring.
    pub fn redo(&mut self, current: EditSnapshot) -> Option<EditSnapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound, dropping the oldest entries if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(text: &str) -> EditSnapshot {
        let n = text.chars().count();
        EditSnapshot {
            text: text.to_string(),
            caret: n,
            anchor: n,
        }
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut ring = UndoRing::default();
        ring.push(snap(""));
        ring.push(snap("a"));
        let back = ring.undo(snap("ab")).unwrap();
        assert_eq!(back.text, "a");
        assert!(ring.can_redo());
        let fwd = ring.redo(back).unwrap();
        assert_eq!(fwd.text, "ab");
        assert_eq!(ring.undo_depth(), 2);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut ring = UndoRing::default();
        ring.push(snap(""));
        ring.undo(snap("x"));
        assert_eq!(ring.redo_depth(), 1);
        ring.push(snap(""));
        assert_eq!(ring.redo_depth(), 0);
    }

    #[test]
    fn test_bounded() {
        let mut ring = UndoRing::new(3);
        for t in ["a", "b", "c", "d", "e"] {
            ring.push(snap(t));
        }
        assert_eq!(ring.undo_depth(), 3);
        assert_eq!(ring.undo(snap("f")).unwrap().text, "e");
        ring.set_capacity(1);
        assert_eq!(ring.undo_depth(), 1);
        assert_eq!(ring.undo(snap("g")).unwrap().text, "d");
        assert!(ring.undo(snap("h")).is_none());
    }

    #[test]
    fn test_selection_normalised() {
        let s = EditSnapshot {
            text: "hello".into(),
            caret: 1,
            anchor: 4,
        };
        assert_eq!(s.selection(), (1, 4));
    }
}
