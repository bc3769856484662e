//! Word boundaries over the document
//!
//! Shared by word movement, word deletion and word selection.

use crate::text::{Document, Place};
use crate::util::text::{char_type, CharType};

/// Index reached by a "word left" step from `index`.
///
/// Skips spaces, then one run of identifier or punctuation characters. A
/// line break is crossed only when nothing else was skipped.
pub fn word_left(document: &Document, index: usize) -> usize {
    let mut cursor = document.char_cursor(index);

    let mut was_space = false;
    while char_type(cursor.left_char()) == CharType::Space {
        was_space = true;
        if !cursor.move_left() {
            break;
        }
    }

    let mut was_word = false;
    let run = char_type(cursor.left_char());
    if matches!(run, CharType::Identifier | CharType::Punctuation) {
        while char_type(cursor.left_char()) == run {
            was_word = true;
            if !cursor.move_left() {
                break;
            }
        }
    }

    if !was_word && (!was_space || !matches!(cursor.left_char(), '\n' | '\r')) {
        cursor.move_left();
    }
    cursor.position()
}

/// Index reached by a "word right" step from `index`
pub fn word_right(document: &Document, index: usize) -> usize {
    let mut cursor = document.char_cursor(index);

    let mut was_space = false;
    while char_type(cursor.right_char()) == CharType::Space {
        was_space = true;
        if !cursor.move_right() {
            break;
        }
    }

    let mut was_word = false;
    let run = char_type(cursor.right_char());
    if matches!(run, CharType::Identifier | CharType::Punctuation) {
        while char_type(cursor.right_char()) == run {
            was_word = true;
            if !cursor.move_right() {
                break;
            }
        }
    }

    if !was_word && (!was_space || !matches!(cursor.right_char(), '\n' | '\r')) {
        cursor.move_right();
    }
    cursor.position()
}

/// Flat `[start, end)` of the run of same-class characters at `place`.
///
/// A place past the line text looks at the last character. Empty lines
/// give an empty range at the line start.
pub fn word_range_at(document: &Document, place: Place) -> (usize, usize) {
    let place = document.normalize(place);
    let line = document.line(place.line);
    let normal = line.normal_count();
    if normal == 0 {
        let start = document.index_of(Place::new(place.line, 0));
        return (start, start);
    }
    let i = place.column.min(normal - 1);
    let run = char_type(line.char_at(i));
    let mut left = i;
    while left > 0 && char_type(line.char_at(left - 1)) == run {
        left -= 1;
    }
    let mut right = i + 1;
    while right < normal && char_type(line.char_at(right)) == run {
        right += 1;
    }
    let start = document.index_of(Place::new(place.line, left));
    (start, start + right - left)
}

/// Identifier characters directly before `place` on its line
pub fn left_word(document: &Document, place: Place) -> String {
    let place = document.normalize(place);
    let line = document.line(place.line);
    let mut left = place.column;
    while left > 0 && char_type(line.char_at(left - 1)) == CharType::Identifier {
        left -= 1;
    }
    (left..place.column).map(|i| line.char_at(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_right_stops_at_class_changes() {
        let d = Document::from_text("foo.bar  baz\nnext");
        assert_eq!(word_right(&d, 0), 3);
        assert_eq!(word_right(&d, 3), 4);
        assert_eq!(word_right(&d, 4), 7);
        assert_eq!(word_right(&d, 7), 12);
        assert_eq!(word_right(&d, 12), 13, "crosses the line break alone");
        assert_eq!(word_right(&d, 17), 17);
    }

    #[test]
    fn test_word_left_mirrors_word_right() {
        let d = Document::from_text("foo.bar  baz\nnext");
        assert_eq!(word_left(&d, 12), 9);
        assert_eq!(word_left(&d, 9), 4);
        assert_eq!(word_left(&d, 4), 3);
        assert_eq!(word_left(&d, 13), 12);
        assert_eq!(word_left(&d, 0), 0);
    }

    #[test]
    fn test_word_moves_treat_crlf_as_one() {
        let d = Document::from_text("ab\r\ncd");
        assert_eq!(word_right(&d, 2), 4);
        assert_eq!(word_left(&d, 4), 2);
    }

    #[test]
    fn test_spaces_then_break_stop_before_break() {
        let d = Document::from_text("ab   \ncd");
        assert_eq!(word_right(&d, 2), 5);
        assert_eq!(word_left(&d, 5), 0);
    }

    #[test]
    fn test_word_range_at() {
        let d = Document::from_text("let foo_1 = 2;\n\nx");
        assert_eq!(word_range_at(&d, Place::new(0, 5)), (4, 9));
        assert_eq!(word_range_at(&d, Place::new(0, 3)), (3, 4));
        assert_eq!(word_range_at(&d, Place::new(0, 99)), (13, 14));
        assert_eq!(word_range_at(&d, Place::new(1, 0)), (15, 15));
    }

    #[test]
    fn test_left_word() {
        let d = Document::from_text("call some_fn(");
        assert_eq!(left_word(&d, Place::new(0, 12)), "some_fn");
        assert_eq!(left_word(&d, Place::new(0, 13)), "");
        assert_eq!(left_word(&d, Place::new(0, 2)), "ca");
    }
}
