//! Selections over the flat character index space
//!
//! A [`Selection`] is one cursor: the caret moves, the anchor stays put while
//! a selection is extended. A [`SelectionSet`] holds every cursor of a
//! session, sorted and non-overlapping after each [`SelectionSet::join`].

mod set;

pub use set::{SelectionSet, SelectionSnapshot};

use serde::Serialize;

/// One cursor as a (caret, anchor) pair of flat indices.
///
/// `preferred_pos` and `wrap_preferred_pos` are the visual columns vertical
/// movement aims for. Horizontal moves and edits update them; vertical
/// moves only read them, so moving through a short line and back restores
/// the original column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub caret: usize,
    pub anchor: usize,
    pub preferred_pos: usize,
    pub wrap_preferred_pos: usize,
}

impl Selection {
    pub fn new(anchor: usize, caret: usize) -> Self {
        Self {
            caret,
            anchor,
            preferred_pos: 0,
            wrap_preferred_pos: 0,
        }
    }

    /// Create a collapsed selection (cursor with no selection)
    pub fn caret_at(index: usize) -> Self {
        Self::new(index, index)
    }

    pub fn left(&self) -> usize {
        self.caret.min(self.anchor)
    }

    pub fn right(&self) -> usize {
        self.caret.max(self.anchor)
    }

    pub fn count(&self) -> usize {
        self.right() - self.left()
    }

    pub fn is_empty(&self) -> bool {
        self.caret == self.anchor
    }

    /// Caret before anchor
    pub fn is_reversed(&self) -> bool {
        self.caret < self.anchor
    }

    /// Within `[left, right]`, both ends included
    pub fn contains(&self, index: usize) -> bool {
        self.left() <= index && index <= self.right()
    }

    /// Move the caret, dropping the selection unless `extend`
    pub fn move_caret(&mut self, index: usize, extend: bool) {
        self.caret = index;
        if !extend {
            self.anchor = index;
        }
    }

    pub fn collapse(&mut self) {
        self.anchor = self.caret;
    }

    /// Same range, new extent, keeping direction
    pub fn set_range(&mut self, left: usize, right: usize, reversed: bool) {
        if reversed {
            self.caret = left;
            self.anchor = right;
        } else {
            self.anchor = left;
            self.caret = right;
        }
    }

    pub fn set_preferred(&mut self, pos: usize, wrap_pos: usize) {
        self.preferred_pos = pos;
        self.wrap_preferred_pos = wrap_pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_left_right() {
        let forward = Selection::new(2, 7);
        assert_eq!((forward.left(), forward.right()), (2, 7));
        assert!(!forward.is_reversed());
        assert_eq!(forward.count(), 5);

        let backward = Selection::new(7, 2);
        assert_eq!((backward.left(), backward.right()), (2, 7));
        assert!(backward.is_reversed());
    }

    #[test]
    fn test_move_caret() {
        let mut sel = Selection::caret_at(3);
        sel.move_caret(6, true);
        assert_eq!((sel.anchor, sel.caret), (3, 6));
        sel.move_caret(1, false);
        assert!(sel.is_empty());
        assert_eq!(sel.caret, 1);
    }

    #[test]
    fn test_set_range_keeps_direction() {
        let mut sel = Selection::new(9, 4);
        sel.set_range(1, 3, sel.is_reversed());
        assert_eq!((sel.caret, sel.anchor), (1, 3));
    }

    #[test]
    fn test_contains_includes_both_ends() {
        let sel = Selection::new(2, 4);
        assert!(sel.contains(2));
        assert!(sel.contains(4));
        assert!(!sel.contains(5));
    }
}
