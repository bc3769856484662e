//! Caret movement, multi-cursor management and selection helpers.
//!
//! None of these are undoable. Each one ends by joining the selections and
//! closing the current undo step.

use super::Controller;
use crate::matcher::LiteralMatcher;
use crate::selection::{Selection, SelectionSet};
use crate::text::{words, Document, Place, Pos};

/// Remember the visual columns of the caret for vertical movement
fn remember_column(document: &Document, selection: &mut Selection) {
    let (pos, wrap_pos) = document.preferred_pos(selection.caret);
    selection.set_preferred(pos, wrap_pos);
}

impl Controller {
    fn after_move(&mut self) {
        self.selections.join();
        self.reset_grouping();
    }

    /// Move every caret to `target(document, selection)`, keeping the anchor
    /// when `extend`. Returns true if any caret or anchor moved.
    fn move_each(
        &mut self,
        extend: bool,
        target: impl Fn(&Document, &Selection) -> usize,
    ) -> bool {
        let document = &self.document;
        let mut moved = false;
        for selection in self.selections.iter_mut() {
            let before = (selection.caret, selection.anchor);
            let index = target(document, selection);
            selection.move_caret(index, extend);
            remember_column(document, selection);
            moved |= before != (selection.caret, selection.anchor);
        }
        self.after_move();
        moved
    }

    // =========================================================================
    // Horizontal
    // =========================================================================

    /// Without `extend`, a selection collapses to its right end first
    pub fn move_right(&mut self, extend: bool) -> bool {
        self.move_each(extend, |document, selection| {
            if !extend && !selection.is_empty() {
                return selection.right();
            }
            let mut cursor = document.char_cursor(selection.caret);
            cursor.move_right();
            cursor.position()
        })
    }

    /// Without `extend`, a selection collapses to its left end first
    pub fn move_left(&mut self, extend: bool) -> bool {
        self.move_each(extend, |document, selection| {
            if !extend && !selection.is_empty() {
                return selection.left();
            }
            let mut cursor = document.char_cursor(selection.caret);
            cursor.move_left();
            cursor.position()
        })
    }

    pub fn move_word_right(&mut self, extend: bool) -> bool {
        self.move_each(extend, |document, selection| {
            words::word_right(document, selection.caret)
        })
    }

    pub fn move_word_left(&mut self, extend: bool) -> bool {
        self.move_each(extend, |document, selection| {
            words::word_left(document, selection.caret)
        })
    }

    /// Smart home: to the first non-space character, or to column 0 from
    /// there. With wrap and a single caret, to the start of the wrapped row
    /// first.
    pub fn move_home(&mut self, extend: bool) -> bool {
        let wrap_single = self.document.wrap_width().is_some() && self.selections.len() == 1;
        self.move_each(extend, |document, selection| {
            let place = document.place_of(selection.caret);
            let line = document.line(place.line);
            if wrap_single {
                let row = line.wrap_pos_of_index(place.column).row;
                if row > 0 {
                    let row_start = line.cut_offs()[row - 1];
                    if place.column > row_start {
                        return document.index_of(Place::new(place.line, row_start));
                    }
                }
            }
            let indent = line
                .chars()
                .take(line.normal_count())
                .take_while(|ch| ch.c.is_whitespace())
                .count();
            let column = if place.column > indent { indent } else { 0 };
            document.index_of(Place::new(place.line, column))
        })
    }

    /// To the end of the line text. With wrap and a single caret, to the end
    /// of the wrapped row first.
    pub fn move_end(&mut self, extend: bool) -> bool {
        let wrap_single = self.document.wrap_width().is_some() && self.selections.len() == 1;
        self.move_each(extend, |document, selection| {
            let place = document.place_of(selection.caret);
            let line = document.line(place.line);
            if wrap_single {
                let row = line.wrap_pos_of_index(place.column).row;
                if let Some(&next_row) = line.cut_offs().get(row) {
                    if place.column + 1 < next_row {
                        return document.index_of(Place::new(place.line, next_row - 1));
                    }
                }
            }
            document.index_of(Place::new(place.line, line.normal_count()))
        })
    }

    pub fn document_start(&mut self, extend: bool) -> bool {
        self.move_each(extend, |_, _| 0)
    }

    pub fn document_end(&mut self, extend: bool) -> bool {
        self.move_each(extend, |document, _| document.char_count())
    }

    // =========================================================================
    // Vertical
    // =========================================================================

    pub fn move_up(&mut self, extend: bool) -> bool {
        self.move_vertical(extend, true)
    }

    pub fn move_down(&mut self, extend: bool) -> bool {
        self.move_vertical(extend, false)
    }

    /// Vertical moves keep the remembered columns. With wrap and a single
    /// caret they step through wrapped rows; otherwise through lines.
    fn move_vertical(&mut self, extend: bool, up: bool) -> bool {
        let wrap_single = self.document.wrap_width().is_some() && self.selections.len() == 1;
        let document = &self.document;
        let mut moved = false;
        for selection in self.selections.iter_mut() {
            let before = (selection.caret, selection.anchor);
            let target = if wrap_single {
                wrapped_row_target(document, selection, up)
            } else {
                line_target(document, selection, up)
            };
            if let Some(place) = target {
                selection.move_caret(document.index_of(place), extend);
            } else if !extend {
                selection.collapse();
            }
            moved |= before != (selection.caret, selection.anchor);
        }
        self.after_move();
        moved
    }

    // =========================================================================
    // Putting cursors
    // =========================================================================

    /// Move the primary caret to `place` (clamped), extending its selection
    /// when `extend`
    pub fn put_cursor(&mut self, place: Place, extend: bool) {
        let place = self.document.normalize(place);
        let index = self.document.index_of(place);
        let document = &self.document;
        let selection = self.selections.primary_mut();
        selection.move_caret(index, extend);
        remember_column(document, selection);
        self.after_move();
    }

    /// Add a caret at `place`. Clicking inside an existing selection drops
    /// every other selection instead.
    pub fn put_new_cursor(&mut self, place: Place) {
        let index = self.document.index_of(self.document.normalize(place));
        if self.selections.iter().any(|s| s.contains(index)) {
            self.selections.remove_minor();
        } else {
            self.selections.add(Selection::caret_at(index));
        }
        self.put_cursor(place, false);
    }

    /// Add a caret one visual row below the primary one. When the carets
    /// were growing upwards, remove the primary caret instead.
    pub fn put_cursor_down(&mut self) {
        self.put_cursor_vertical(false);
    }

    /// Add a caret one visual row above the primary one. When the carets
    /// were growing downwards, remove the primary caret instead.
    pub fn put_cursor_up(&mut self) {
        self.put_cursor_vertical(true);
    }

    fn put_cursor_vertical(&mut self, up: bool) {
        let count = self.selections.len();
        if count > 1 {
            let primary = self.selections.primary_index();
            let reversing = if up { primary == count - 1 } else { primary == 0 };
            if reversing {
                self.selections.remove(primary);
                self.after_move();
                return;
            }
        }

        let primary = *self.selections.primary();
        let pos = self.document.pos_of(self.document.place_of(primary.caret));
        let row = if up {
            pos.row.checked_sub(1)
        } else {
            Some(pos.row + 1).filter(|&row| row < self.document.rows_count())
        };
        if let Some(row) = row {
            let place = self
                .document
                .place_of_pos(Pos::new(row, primary.wrap_preferred_pos));
            self.put_new_cursor(place);
            self.selections
                .primary_mut()
                .set_preferred(primary.preferred_pos, primary.wrap_preferred_pos);
        }
        self.after_move();
    }

    // =========================================================================
    // Selection management
    // =========================================================================

    /// Keep only the primary selection
    pub fn clear_minor_selections(&mut self) -> bool {
        let cleared = self.selections.remove_minor();
        self.reset_grouping();
        cleared
    }

    /// Keep only the last selection in document order
    pub fn clear_first_minor_selections(&mut self) -> bool {
        let cleared = self.selections.remove_first_minor();
        self.reset_grouping();
        cleared
    }

    /// Add a selection (clamped to the document) as the new primary
    pub fn add_selection(&mut self, mut selection: Selection) {
        let max = self.document.char_count();
        selection.caret = selection.caret.min(max);
        selection.anchor = selection.anchor.min(max);
        remember_column(&self.document, &mut selection);
        self.selections.add(selection);
        self.after_move();
    }

    /// Remove the selections at `indices`; at least one selection stays
    pub fn remove_selections(&mut self, indices: &[usize]) {
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();
        for &index in indices.iter().rev() {
            self.selections.remove(index);
        }
        self.after_move();
    }

    pub fn join_selections(&mut self) -> bool {
        self.selections.join()
    }

    /// One selection over the whole text, caret at the start
    pub fn select_all(&mut self) {
        self.selections.remove_minor();
        let count = self.document.char_count();
        let selection = self.selections.primary_mut();
        selection.anchor = count;
        selection.caret = 0;
        selection.set_preferred(0, 0);
        self.after_move();
    }

    /// One selection over the whole text, caret at the end
    pub fn select_all_to_end(&mut self) {
        self.selections.remove_minor();
        let count = self.document.char_count();
        let selection = self.selections.primary_mut();
        selection.anchor = 0;
        selection.caret = count;
        remember_column(&self.document, selection);
        self.after_move();
    }

    /// Select the word at `place`, as an extra selection or replacing all
    pub fn select_word_at(&mut self, place: Place, new_selection: bool) {
        let (start, end) = words::word_range_at(&self.document, place);
        let mut selection = Selection::new(start, end);
        remember_column(&self.document, &mut selection);
        if new_selection {
            self.selections.add(selection);
        } else {
            self.selections.remove_minor();
            *self.selections.primary_mut() = selection;
        }
        self.after_move();
    }

    /// With an empty primary selection, select the word under every empty
    /// caret. Otherwise add a selection over the next occurrence of the
    /// primary selection's text, wrapping around to the start.
    pub fn select_next_text(&mut self) -> bool {
        let primary = *self.selections.primary();
        if primary.is_empty() {
            let document = &self.document;
            let mut changed = false;
            for selection in self.selections.iter_mut().filter(|s| s.is_empty()) {
                let place = document.place_of(selection.caret);
                let (start, end) = words::word_range_at(document, place);
                selection.anchor = start;
                selection.caret = end;
                remember_column(document, selection);
                changed |= start != end;
            }
            self.after_move();
            return changed;
        }

        let text = self.document.text_range(primary.left(), primary.count());
        let len = primary.count();
        let mut found = self
            .document
            .find(&text, primary.right())
            .or_else(|| self.document.find(&text, 0));
        while let Some(position) = found {
            if !self.selections.intersects(position, position + len) {
                break;
            }
            found = self.document.find(&text, position + len);
        }
        let Some(position) = found else {
            return false;
        };
        let mut selection = Selection::new(position, position + len);
        remember_column(&self.document, &mut selection);
        self.selections.add(selection);
        self.after_move();
        true
    }

    /// Replace the selections with every occurrence of the primary
    /// selection's text (the word under the caret when it is empty)
    pub fn select_all_matches(&mut self) -> bool {
        if self.selections.primary().is_empty() {
            self.select_next_text();
        }
        let primary = *self.selections.primary();
        if primary.is_empty() {
            return false;
        }
        let text = self.document.text_range(primary.left(), primary.count());
        let matcher = LiteralMatcher::new(&text);
        let matches: Vec<Selection> = self
            .document
            .find_all_with(&matcher)
            .into_iter()
            .map(|(position, len)| {
                let mut selection = Selection::new(position, position + len);
                remember_column(&self.document, &mut selection);
                selection
            })
            .collect();
        tracing::debug!(matches = matches.len(), "select all matches");
        self.selections = SelectionSet::from_vec(matches);
        self.reset_grouping();
        true
    }

    /// Text of the word (or run of same-class characters) at `place`
    pub fn word_at(&self, place: Place) -> String {
        let (start, end) = words::word_range_at(&self.document, place);
        self.document.text_range(start, end - start)
    }

    /// Identifier characters directly before `place`
    pub fn left_word(&self, place: Place) -> String {
        words::left_word(&self.document, place)
    }
}

/// Same wrapped-row column one row up or down, crossing line boundaries
fn wrapped_row_target(document: &Document, selection: &Selection, up: bool) -> Option<Place> {
    let place = document.place_of(selection.caret);
    let line = document.line(place.line);
    let row = line.wrap_pos_of_index(place.column).row;
    let column = selection.wrap_preferred_pos;
    if up {
        if row > 0 {
            return Some(Place::new(
                place.line,
                line.wrap_normal_index_of_pos(column, row - 1),
            ));
        }
        let above = place.line.checked_sub(1)?;
        let line = document.line(above);
        Some(Place::new(
            above,
            line.wrap_normal_index_of_pos(column, line.wrapped_rows() - 1),
        ))
    } else {
        if row + 1 < line.wrapped_rows() {
            return Some(Place::new(
                place.line,
                line.wrap_normal_index_of_pos(column, row + 1),
            ));
        }
        let below = place.line + 1;
        if below >= document.line_count() {
            return None;
        }
        Some(Place::new(
            below,
            document.line(below).wrap_normal_index_of_pos(column, 0),
        ))
    }
}

/// Preferred column on the line above or below
fn line_target(document: &Document, selection: &Selection, up: bool) -> Option<Place> {
    let place = document.place_of(selection.caret);
    let target = if up {
        place.line.checked_sub(1)?
    } else {
        Some(place.line + 1).filter(|&line| line < document.line_count())?
    };
    let line = document.line(target);
    let column = line.normal_index_of_pos(selection.preferred_pos, document.tab_size());
    Some(Place::new(target, column.min(line.normal_count())))
}
