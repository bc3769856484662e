use super::*;
use crate::selection::Selection;

fn apply(
    text: &str,
    selections: Vec<Selection>,
    kind: CommandKind,
) -> Option<(Document, SelectionSet, Command)> {
    let config = CoreConfig::default();
    let mut document = Document::with_text(&config, text);
    let mut set = SelectionSet::from_vec(selections);
    let mut command = Command::new(kind);
    if !command.init(&document, &set, &config) {
        return None;
    }
    command.redo(&mut document, &mut set);
    Some((document, set, command))
}

fn carets(set: &SelectionSet) -> Vec<usize> {
    set.iter().map(|s| s.caret).collect()
}

fn ranges(set: &SelectionSet) -> Vec<(usize, usize)> {
    set.iter().map(|s| (s.anchor, s.caret)).collect()
}

/// Apply, undo, and check the round trip restores text and selections
fn assert_reversible(text: &str, selections: Vec<Selection>, kind: CommandKind) {
    let (mut document, mut set, mut command) =
        apply(text, selections.clone(), kind.clone()).expect("command should apply");
    let before = SelectionSet::from_vec(selections).snapshot();
    let after_text = document.text();
    let after = set.snapshot();

    command.undo(&mut document, &mut set);
    assert_eq!(document.text(), text, "undo of {kind:?}");
    assert_eq!(set.snapshot(), before);

    command.redo(&mut document, &mut set);
    assert_eq!(document.text(), after_text, "redo of {kind:?}");
    assert_eq!(set.snapshot(), after);
}

// ========================================================================
// Lifecycle
// ========================================================================

#[test]
fn test_state_transitions() {
    let config = CoreConfig::default();
    let mut document = Document::with_text(&config, "abc");
    let mut set = SelectionSet::single(Selection::caret_at(1));
    let mut command = Command::new(CommandKind::insert("x"));
    assert_eq!(command.state(), CommandState::Created);

    assert!(command.init(&document, &set, &config));
    assert_eq!(command.state(), CommandState::Initialized);
    assert_eq!(document.text(), "abc", "init plans without editing");

    command.redo(&mut document, &mut set);
    assert_eq!(command.state(), CommandState::Applied);
    command.undo(&mut document, &mut set);
    assert_eq!(command.state(), CommandState::Undone);
    command.redo(&mut document, &mut set);
    assert_eq!(command.state(), CommandState::Applied);
    assert_eq!(document.text(), "axbc");
}

#[test]
fn test_changes_recorded_in_original_coordinates() {
    let (_, _, command) = apply(
        "abcdef",
        vec![Selection::caret_at(1), Selection::caret_at(4)],
        CommandKind::insert("XY"),
    )
    .unwrap();
    let indices: Vec<usize> = command.changes().iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![1, 4]);
}

#[test]
fn test_redo_sets_preferred_columns() {
    let (_, set, _) = apply(
        "ab\ncd",
        vec![Selection::caret_at(3)],
        CommandKind::insert("\txy"),
    )
    .unwrap();
    let primary = set.primary();
    assert_eq!(primary.caret, 6);
    assert_eq!(primary.preferred_pos, 6, "tab expands to the next stop");
}

// ========================================================================
// Multi-selection deletion
// ========================================================================

#[test]
fn test_delete_at_two_carets_folds_delta() {
    let (document, set, _) = apply(
        "0123456789",
        vec![Selection::caret_at(3), Selection::caret_at(9)],
        CommandKind::Delete,
    )
    .unwrap();
    assert_eq!(document.text(), "01245678");
    assert_eq!(carets(&set), vec![3, 8]);
}

#[test]
fn test_delete_at_end_caret_only_shifts() {
    let (document, set, _) = apply(
        "0123456789",
        vec![Selection::caret_at(3), Selection::caret_at(10)],
        CommandKind::Delete,
    )
    .unwrap();
    assert_eq!(document.text(), "012456789");
    assert_eq!(carets(&set), vec![3, 9]);
}

#[test]
fn test_backspace_at_two_carets() {
    let (document, set, _) = apply(
        "0123456789",
        vec![Selection::caret_at(3), Selection::caret_at(10)],
        CommandKind::Backspace,
    )
    .unwrap();
    assert_eq!(document.text(), "01345678");
    assert_eq!(carets(&set), vec![2, 8]);
}

#[test]
fn test_backspace_adjacent_carets_merge() {
    let (document, set, _) = apply(
        "abc",
        vec![Selection::caret_at(1), Selection::caret_at(2)],
        CommandKind::Backspace,
    )
    .unwrap();
    assert_eq!(document.text(), "c");
    assert_eq!(carets(&set), vec![0]);
}

#[test]
fn test_backspace_and_delete_treat_crlf_as_one() {
    let (document, set, _) =
        apply("a\r\nb", vec![Selection::caret_at(3)], CommandKind::Backspace).unwrap();
    assert_eq!(document.text(), "ab");
    assert_eq!(carets(&set), vec![1]);

    let (document, _, _) =
        apply("a\r\nb", vec![Selection::caret_at(1)], CommandKind::Delete).unwrap();
    assert_eq!(document.text(), "ab");
}

#[test]
fn test_backspace_at_start_is_vetoed() {
    assert!(apply("abc", vec![Selection::caret_at(0)], CommandKind::Backspace).is_none());
    assert!(apply("abc", vec![Selection::caret_at(3)], CommandKind::Delete).is_none());
}

#[test]
fn test_erase_selection() {
    let (document, set, _) = apply(
        "abcdefg",
        vec![Selection::new(0, 2), Selection::new(6, 4)],
        CommandKind::EraseSelection,
    )
    .unwrap();
    assert_eq!(document.text(), "cdg");
    assert_eq!(carets(&set), vec![0, 2]);
}

#[test]
fn test_erase_empty_selections_is_vetoed() {
    assert!(apply(
        "abc",
        vec![Selection::caret_at(1), Selection::caret_at(2)],
        CommandKind::EraseSelection
    )
    .is_none());
}

#[test]
fn test_remove_word() {
    let (document, set, _) = apply(
        "foo bar",
        vec![Selection::caret_at(7)],
        CommandKind::RemoveWord { left: true },
    )
    .unwrap();
    assert_eq!(document.text(), "foo ");
    assert_eq!(carets(&set), vec![4]);

    let (document, set, _) = apply(
        "foo bar",
        vec![Selection::caret_at(0)],
        CommandKind::RemoveWord { left: false },
    )
    .unwrap();
    assert_eq!(document.text(), " bar");
    assert_eq!(carets(&set), vec![0]);
}

// ========================================================================
// Insertion
// ========================================================================

#[test]
fn test_insert_at_every_caret() {
    let (document, set, _) = apply(
        "xy",
        vec![Selection::caret_at(0), Selection::caret_at(2)],
        CommandKind::insert("ab"),
    )
    .unwrap();
    assert_eq!(document.text(), "abxyab");
    assert_eq!(carets(&set), vec![2, 6]);
}

#[test]
fn test_insert_replaces_selection() {
    let (document, set, _) = apply(
        "hello world",
        vec![Selection::new(6, 11)],
        CommandKind::insert("there"),
    )
    .unwrap();
    assert_eq!(document.text(), "hello there");
    assert_eq!(ranges(&set), vec![(11, 11)]);
}

#[test]
fn test_insert_per_selection() {
    let kind = CommandKind::InsertText {
        text: String::new(),
        per_selection: Some(vec!["1".into(), "22".into()]),
        select_inserted: false,
    };
    let (document, set, _) = apply(
        "ab",
        vec![Selection::caret_at(0), Selection::caret_at(1)],
        kind,
    )
    .unwrap();
    assert_eq!(document.text(), "1a22b");
    assert_eq!(carets(&set), vec![1, 4]);
}

#[test]
fn test_insert_per_selection_count_mismatch_is_vetoed() {
    let kind = CommandKind::InsertText {
        text: String::new(),
        per_selection: Some(vec!["1".into()]),
        select_inserted: false,
    };
    assert!(apply(
        "ab",
        vec![Selection::caret_at(0), Selection::caret_at(1)],
        kind
    )
    .is_none());
}

#[test]
fn test_insert_can_select_inserted_text() {
    let kind = CommandKind::InsertText {
        text: "xyz".into(),
        per_selection: None,
        select_inserted: true,
    };
    let (document, set, _) = apply("abc", vec![Selection::new(1, 2)], kind).unwrap();
    assert_eq!(document.text(), "axyzc");
    assert_eq!(ranges(&set), vec![(1, 4)]);
}

#[test]
fn test_insert_line_breaks_at_two_carets() {
    let (document, set, _) = apply(
        "ab\ncd",
        vec![Selection::caret_at(1), Selection::caret_at(4)],
        CommandKind::insert("\n"),
    )
    .unwrap();
    assert_eq!(document.text(), "a\nb\nc\nd");
    assert_eq!(document.line_count(), 4);
    assert_eq!(carets(&set), vec![2, 6]);
}

// ========================================================================
// Case, replace char
// ========================================================================

#[test]
fn test_change_case_keeps_selection() {
    let (document, set, _) = apply(
        "abc def",
        vec![Selection::new(3, 0)],
        CommandKind::ChangeCase { upper: true },
    )
    .unwrap();
    assert_eq!(document.text(), "ABC def");
    assert_eq!(ranges(&set), vec![(3, 0)]);
}

#[test]
fn test_change_case_without_change_is_vetoed() {
    assert!(apply(
        "ABC",
        vec![Selection::new(0, 3)],
        CommandKind::ChangeCase { upper: true }
    )
    .is_none());
    assert!(apply(
        "abc",
        vec![Selection::caret_at(1)],
        CommandKind::ChangeCase { upper: true }
    )
    .is_none());
}

#[test]
fn test_replace_char() {
    let (document, set, _) = apply(
        "ab\ncd",
        vec![Selection::caret_at(1)],
        CommandKind::ReplaceChar { ch: 'x' },
    )
    .unwrap();
    assert_eq!(document.text(), "ax\ncd");
    assert_eq!(carets(&set), vec![1]);

    let (document, set, _) = apply(
        "ab\ncd",
        vec![Selection::new(0, 5)],
        CommandKind::ReplaceChar { ch: '-' },
    )
    .unwrap();
    assert_eq!(document.text(), "--\n--");
    assert_eq!(carets(&set), vec![0]);
}

#[test]
fn test_replace_char_on_line_break_is_vetoed() {
    assert!(apply(
        "ab\ncd",
        vec![Selection::caret_at(2)],
        CommandKind::ReplaceChar { ch: 'x' }
    )
    .is_none());
}

// ========================================================================
// Line commands
// ========================================================================

#[test]
fn test_shift_right_skips_empty_lines() {
    let (document, set, _) = apply(
        "a\n\nb",
        vec![Selection::new(0, 4)],
        CommandKind::Shift { left: false },
    )
    .unwrap();
    assert_eq!(document.text(), "\ta\n\n\tb");
    assert_eq!(ranges(&set), vec![(0, 6)]);
}

#[test]
fn test_shift_right_single_caret() {
    let (document, set, _) = apply(
        "ab",
        vec![Selection::caret_at(1)],
        CommandKind::Shift { left: false },
    )
    .unwrap();
    assert_eq!(document.text(), "\tab");
    assert_eq!(carets(&set), vec![2]);
}

#[test]
fn test_shift_ignores_line_of_selection_end_at_column_zero() {
    let (document, set, _) = apply(
        "a\nb",
        vec![Selection::new(0, 2)],
        CommandKind::Shift { left: false },
    )
    .unwrap();
    assert_eq!(document.text(), "\ta\nb");
    assert_eq!(ranges(&set), vec![(0, 3)]);
}

#[test]
fn test_shift_left() {
    let (document, set, _) = apply(
        "    x\n\ty",
        vec![Selection::new(0, 8)],
        CommandKind::Shift { left: true },
    )
    .unwrap();
    assert_eq!(document.text(), "x\ny");
    assert_eq!(ranges(&set), vec![(0, 3)]);
}

#[test]
fn test_shift_left_without_indent_is_vetoed() {
    assert!(apply(
        "x\ny",
        vec![Selection::new(0, 3)],
        CommandKind::Shift { left: true }
    )
    .is_none());
}

#[test]
fn test_move_line_down() {
    let (document, set, _) = apply(
        "a\nb\nc",
        vec![Selection::caret_at(0)],
        CommandKind::MoveLine { up: false },
    )
    .unwrap();
    assert_eq!(document.text(), "b\na\nc");
    assert_eq!(carets(&set), vec![2]);
}

#[test]
fn test_move_last_line_up() {
    let (document, set, _) = apply(
        "a\nb",
        vec![Selection::caret_at(3)],
        CommandKind::MoveLine { up: true },
    )
    .unwrap();
    assert_eq!(document.text(), "b\na");
    assert_eq!(carets(&set), vec![1]);
}

#[test]
fn test_move_line_at_edge_is_vetoed() {
    assert!(apply("a\nb", vec![Selection::caret_at(0)], CommandKind::MoveLine { up: true }).is_none());
    assert!(apply("a\nb", vec![Selection::caret_at(2)], CommandKind::MoveLine { up: false }).is_none());
}

#[test]
fn test_fix_line_breaks() {
    let (document, set, _) = apply(
        "a\r\nb\rc",
        vec![Selection::caret_at(6)],
        CommandKind::FixLineBreaks,
    )
    .unwrap();
    assert_eq!(document.text(), "a\nb\nc");
    assert_eq!(carets(&set), vec![5]);
    assert!(apply("a\nb", vec![Selection::caret_at(0)], CommandKind::FixLineBreaks).is_none());
}

#[test]
fn test_save_positions_is_never_vetoed() {
    let (document, set, command) = apply(
        "abc",
        vec![Selection::caret_at(1), Selection::caret_at(2)],
        CommandKind::SavePositions,
    )
    .unwrap();
    assert_eq!(document.text(), "abc");
    assert_eq!(carets(&set), vec![1, 2]);
    assert!(command.changes().is_empty());
}

// ========================================================================
// Undo restores exactly
// ========================================================================

#[test]
fn test_every_kind_is_reversible() {
    let two = || vec![Selection::caret_at(2), Selection::new(5, 9)];
    assert_reversible("ab\r\ncd efgh", two(), CommandKind::insert("X\nY"));
    assert_reversible("ab\r\ncd efgh", two(), CommandKind::Backspace);
    assert_reversible("ab\r\ncd efgh", two(), CommandKind::Delete);
    assert_reversible("ab\r\ncd efgh", two(), CommandKind::EraseSelection);
    assert_reversible("ab\r\ncd efgh", two(), CommandKind::RemoveWord { left: true });
    assert_reversible("ab\r\ncd efgh", two(), CommandKind::ChangeCase { upper: true });
    assert_reversible("ab\r\ncd efgh", two(), CommandKind::ReplaceChar { ch: '#' });
    assert_reversible("ab\r\ncd efgh\nz", two(), CommandKind::Shift { left: false });
    assert_reversible("ab\r\ncd efgh\nz", two(), CommandKind::MoveLine { up: false });
    assert_reversible(
        "ab\r\ncd efgh\nz",
        vec![Selection::caret_at(12)],
        CommandKind::MoveLine { up: true },
    );
    assert_reversible("ab\r\ncd\refgh", two(), CommandKind::FixLineBreaks);
}
