//! Selection behavior tests through the controller
//!
//! Covers extending, whole-text and word selection, explicit selection
//! management and exact restoration of selections by undo.

mod common;

use common::{caret_places, carets, test_controller, text};
use token_core::{Place, Selection};

// ========================================================================
// Extending
// ========================================================================

#[test]
fn test_extend_right_over_crlf() {
    let (mut c, _) = test_controller("ab\r\ncd", 0, 2);
    assert!(c.move_right(true));
    let selection = *c.selections().primary();
    assert_eq!((selection.anchor, selection.caret), (2, 4));
    assert_eq!(selection.count(), 2);
}

#[test]
fn test_extend_then_collapse_left() {
    let (mut c, _) = test_controller("hello world", 0, 2);
    c.move_word_right(true);
    assert!(!c.selections().primary().is_empty());
    c.move_left(false);
    assert_eq!(carets(&c), vec![2]);
    assert!(c.selections().all_empty());
}

#[test]
fn test_extended_selections_merge() {
    let (mut c, _) = test_controller("abcdef", 0, 1);
    c.put_new_cursor(Place::new(0, 3));
    c.move_right(true);
    c.move_right(true);
    assert_eq!(c.selections().len(), 1, "selections grew into each other");
    let merged = *c.selections().primary();
    assert_eq!((merged.left(), merged.right()), (1, 5));
}

// ========================================================================
// Whole text and words
// ========================================================================

#[test]
fn test_select_all_then_type() {
    let (mut c, _) = test_controller("abc\ndef", 1, 1);
    c.put_new_cursor(Place::new(0, 1));
    c.select_all();
    assert_eq!(c.selections().len(), 1);
    assert!(c.selections().primary().is_reversed());
    assert!(c.insert_text("x"));
    assert_eq!(text(&c), "x");
    assert_eq!(carets(&c), vec![1]);
}

#[test]
fn test_select_word_at() {
    let (mut c, _) = test_controller("foo bar\nbaz qux", 0, 0);
    c.select_word_at(Place::new(1, 1), false);
    let selection = *c.selections().primary();
    assert_eq!((selection.left(), selection.right()), (8, 11));

    c.select_word_at(Place::new(0, 5), true);
    assert_eq!(c.selections().len(), 2);
    assert_eq!(caret_places(&c), vec![(0, 7), (1, 3)]);
}

#[test]
fn test_word_queries() {
    let (c, _) = test_controller("let value_1 = 2;", 0, 0);
    assert_eq!(c.word_at(Place::new(0, 6)), "value_1");
    assert_eq!(c.left_word(Place::new(0, 9)), "value");
    assert_eq!(c.left_word(Place::new(0, 12)), "");
}

// ========================================================================
// Explicit management
// ========================================================================

#[test]
fn test_add_selection_is_clamped_and_primary() {
    let (mut c, _) = test_controller("hello", 0, 0);
    c.add_selection(Selection::new(2, 100));
    assert_eq!(c.selections().len(), 2);
    let primary = *c.selections().primary();
    assert_eq!((primary.anchor, primary.caret), (2, 5));
}

#[test]
fn test_remove_selections_keeps_one() {
    let (mut c, _) = test_controller("0123456789", 0, 1);
    c.put_new_cursor(Place::new(0, 4));
    c.put_new_cursor(Place::new(0, 7));
    c.remove_selections(&[0, 2]);
    assert_eq!(carets(&c), vec![4]);
    c.remove_selections(&[0]);
    assert_eq!(carets(&c), vec![4]);
}

#[test]
fn test_click_inside_selection_drops_others() {
    let (mut c, _) = test_controller("0123456789", 0, 1);
    c.put_new_cursor(Place::new(0, 8));
    c.move_right(true);
    assert_eq!(c.selections().len(), 2);
    c.put_new_cursor(Place::new(0, 9));
    assert_eq!(carets(&c), vec![9]);
}

// ========================================================================
// Undo restores selections
// ========================================================================

#[test]
fn test_undo_restores_selections_exactly() {
    let (mut c, _) = test_controller("one two three", 0, 0);
    c.select_word_at(Place::new(0, 5), false);
    c.put_new_cursor(Place::new(0, 13));
    let before = c.selections().snapshot();

    assert!(c.change_case(true));
    assert_eq!(text(&c), "one TWO three");
    assert!(c.undo());
    assert_eq!(c.selections().snapshot(), before);

    assert!(c.redo());
    assert_eq!(text(&c), "one TWO three");
}
