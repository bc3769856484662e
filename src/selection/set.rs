use serde::Serialize;

use super::Selection;

/// Exact copy of a selection set, used as a command memento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSnapshot {
    pub selections: Vec<Selection>,
    pub primary: usize,
}

impl SelectionSnapshot {
    pub fn carets(&self) -> Vec<usize> {
        self.selections.iter().map(|s| s.caret).collect()
    }
}

/// Every cursor of an editing session.
///
/// Never empty. `primary` is the most recently placed selection (the one
/// vertical movement, word selection and scrolling follow). After `join`
/// the selections are sorted by `left()` and no two intersect or touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    items: Vec<Selection>,
    primary: usize,
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionSet {
    /// One caret at the document start
    pub fn new() -> Self {
        Self::single(Selection::default())
    }

    pub fn single(selection: Selection) -> Self {
        Self {
            items: vec![selection],
            primary: 0,
        }
    }

    /// Build a joined set; the last selection becomes primary.
    /// An empty list yields a caret at 0.
    pub fn from_vec(selections: Vec<Selection>) -> Self {
        if selections.is_empty() {
            return Self::new();
        }
        let primary = selections.len() - 1;
        let mut set = Self {
            items: selections,
            primary,
        };
        set.join();
        set
    }

    /// Build a joined set with an explicit primary selection
    pub fn with_primary(selections: Vec<Selection>, primary: usize) -> Self {
        if selections.is_empty() {
            return Self::new();
        }
        let primary = primary.min(selections.len() - 1);
        let mut set = Self {
            items: selections,
            primary,
        };
        set.join();
        set
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selection> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Selection> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[Selection] {
        &self.items
    }

    pub fn primary(&self) -> &Selection {
        &self.items[self.primary]
    }

    pub fn primary_mut(&mut self) -> &mut Selection {
        &mut self.items[self.primary]
    }

    pub fn primary_index(&self) -> usize {
        self.primary
    }

    /// Append `selection` and make it primary; call `join` afterwards
    pub fn add(&mut self, selection: Selection) {
        self.items.push(selection);
        self.primary = self.items.len() - 1;
    }

    /// Remove the selection at `index` unless it is the only one
    pub fn remove(&mut self, index: usize) -> Option<Selection> {
        if self.items.len() < 2 || index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        if self.primary > index || self.primary == self.items.len() {
            self.primary -= 1;
        }
        Some(removed)
    }

    /// Keep only the primary selection. False if there was nothing to drop.
    pub fn remove_minor(&mut self) -> bool {
        if self.items.len() < 2 {
            return false;
        }
        let primary = self.items[self.primary];
        self.items = vec![primary];
        self.primary = 0;
        true
    }

    /// Keep only the last selection in document order
    pub fn remove_first_minor(&mut self) -> bool {
        let count = self.items.len();
        if count < 2 {
            return false;
        }
        self.items.drain(..count - 1);
        self.primary = 0;
        true
    }

    pub fn all_empty(&self) -> bool {
        self.items.iter().all(Selection::is_empty)
    }

    /// Whether any selection intersects or touches `[left, right]`
    pub fn intersects(&self, left: usize, right: usize) -> bool {
        self.items
            .iter()
            .any(|s| s.left() <= right && left <= s.right())
    }

    /// Clamp every caret and anchor to `[0, max]`
    pub fn clamp(&mut self, max: usize) {
        for selection in &mut self.items {
            selection.caret = selection.caret.min(max);
            selection.anchor = selection.anchor.min(max);
        }
    }

    /// Sort by position and merge selections that intersect or touch.
    ///
    /// A merged selection keeps the direction and preferred columns of the
    /// leftmost selection it absorbed. Returns true if anything merged.
    pub fn join(&mut self) -> bool {
        let count = self.items.len();
        let primary = self.primary;
        let mut indexed: Vec<(usize, Selection)> = self.items.drain(..).enumerate().collect();
        indexed.sort_by_key(|(i, s)| (s.left(), *i));

        let mut joined: Vec<Selection> = Vec::with_capacity(count);
        let mut new_primary = 0;
        for (original, selection) in indexed {
            match joined.last_mut() {
                Some(last) if selection.left() <= last.right() => {
                    let left = last.left();
                    let right = last.right().max(selection.right());
                    let reversed = last.is_reversed();
                    last.set_range(left, right, reversed);
                }
                _ => joined.push(selection),
            }
            if original == primary {
                new_primary = joined.len() - 1;
            }
        }

        let merged = joined.len() < count;
        if merged {
            tracing::trace!(before = count, after = joined.len(), "joined selections");
        }
        self.items = joined;
        self.primary = new_primary;
        merged
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            selections: self.items.clone(),
            primary: self.primary,
        }
    }

    /// Replace the whole set with a snapshot, exactly
    pub fn restore(&mut self, snapshot: &SelectionSnapshot) {
        if snapshot.selections.is_empty() {
            *self = Self::new();
            return;
        }
        self.items = snapshot.selections.clone();
        self.primary = snapshot.primary.min(self.items.len() - 1);
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Selection;
    type IntoIter = std::slice::Iter<'a, Selection>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carets(set: &SelectionSet) -> Vec<(usize, usize)> {
        set.iter().map(|s| (s.anchor, s.caret)).collect()
    }

    // ========================================================================
    // Join
    // ========================================================================

    #[test]
    fn test_join_sorts_by_position() {
        let mut set = SelectionSet::single(Selection::caret_at(9));
        set.add(Selection::caret_at(2));
        set.add(Selection::caret_at(5));
        assert!(!set.join());
        assert_eq!(carets(&set), vec![(2, 2), (5, 5), (9, 9)]);
        assert_eq!(set.primary().caret, 5, "primary follows its selection");
    }

    #[test]
    fn test_join_merges_duplicates_and_overlaps() {
        let mut set = SelectionSet::single(Selection::new(0, 4));
        set.add(Selection::new(3, 8));
        set.add(Selection::caret_at(12));
        set.add(Selection::caret_at(12));
        assert!(set.join());
        assert_eq!(carets(&set), vec![(0, 8), (12, 12)]);
        assert_eq!(set.primary_index(), 1);
    }

    #[test]
    fn test_join_merges_touching() {
        let mut set = SelectionSet::single(Selection::new(5, 2));
        set.add(Selection::caret_at(5));
        set.join();
        assert_eq!(set.len(), 1);
        let merged = set.primary();
        assert!(merged.is_reversed(), "direction of the earliest wins");
        assert_eq!((merged.caret, merged.anchor), (2, 5));
    }

    #[test]
    fn test_join_keeps_preferred_of_earliest() {
        let mut first = Selection::new(1, 4);
        first.set_preferred(7, 3);
        let mut set = SelectionSet::single(first);
        set.add(Selection::new(2, 6));
        set.join();
        assert_eq!(set.len(), 1);
        assert_eq!(set.primary().preferred_pos, 7);
        assert_eq!(set.primary().wrap_preferred_pos, 3);
        assert_eq!(set.primary().right(), 6);
    }

    // ========================================================================
    // Minor selections
    // ========================================================================

    #[test]
    fn test_remove_minor_keeps_primary() {
        let mut set = SelectionSet::from_vec(vec![
            Selection::caret_at(1),
            Selection::caret_at(3),
            Selection::caret_at(2),
        ]);
        assert_eq!(set.primary().caret, 2);
        assert!(set.remove_minor());
        assert_eq!(carets(&set), vec![(2, 2)]);
        assert!(!set.remove_minor());
    }

    #[test]
    fn test_remove_first_minor_keeps_last() {
        let mut set = SelectionSet::from_vec(vec![Selection::caret_at(1), Selection::caret_at(3)]);
        assert!(set.remove_first_minor());
        assert_eq!(carets(&set), vec![(3, 3)]);
    }

    #[test]
    fn test_remove_never_empties() {
        let mut set = SelectionSet::from_vec(vec![Selection::caret_at(1), Selection::caret_at(3)]);
        assert_eq!(set.primary_index(), 1);
        assert_eq!(set.remove(1).map(|s| s.caret), Some(3));
        assert_eq!(set.primary_index(), 0);
        assert_eq!(set.remove(0), None);
        assert_eq!(set.len(), 1);
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    #[test]
    fn test_snapshot_restore_is_exact() {
        let mut set = SelectionSet::from_vec(vec![Selection::new(4, 1), Selection::caret_at(9)]);
        set.primary_mut().set_preferred(3, 3);
        let snapshot = set.snapshot();

        set.remove_minor();
        set.primary_mut().move_caret(0, false);
        set.restore(&snapshot);

        assert_eq!(set.snapshot(), snapshot);
        assert_eq!(snapshot.carets(), vec![1, 9]);
    }

    #[test]
    fn test_clamp_and_queries() {
        let mut set = SelectionSet::from_vec(vec![Selection::new(2, 20), Selection::caret_at(30)]);
        set.clamp(10);
        assert_eq!(carets(&set), vec![(2, 10), (10, 10)]);
        assert!(!set.all_empty());
        assert!(set.intersects(0, 2));
        assert!(!set.intersects(11, 15));
    }
}
