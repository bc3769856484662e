//! Utility functions for text editing

/// Character class used by word movement, word deletion and word selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharType {
    /// Letters, digits and underscore
    Identifier,
    /// Space and tab
    Space,
    /// Anything else that is visible
    Punctuation,
    /// Line breaks and the document edge (`'\0'`)
    Special,
}

/// Get the character type for word navigation
pub fn char_type(ch: char) -> CharType {
    match ch {
        ' ' | '\t' => CharType::Space,
        '\r' | '\n' | '\0' => CharType::Special,
        c if c.is_alphanumeric() || c == '_' => CharType::Identifier,
        _ => CharType::Punctuation,
    }
}

pub fn is_identifier(ch: char) -> bool {
    char_type(ch) == CharType::Identifier
}

pub fn is_space_or_line_break(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

pub fn is_line_break(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

/// Visual width of `ch` when it starts at visual column `column`.
#[inline]
pub fn char_width(ch: char, column: usize, tab_size: usize) -> usize {
    if ch == '\t' {
        let tab_size = tab_size.max(1);
        tab_size - column % tab_size
    } else {
        1
    }
}

/// Convert a visual column (screen position) to a character column.
/// A visual column inside a wide character (a tab) resolves to that
/// character when it is in the left half, and to the next one past the
/// midpoint: with a tab width of 4, columns 0..=2 give 0 and column 3 gives 1.
pub fn visual_col_to_char_col(
    chars: impl IntoIterator<Item = char>,
    visual_col: usize,
    tab_size: usize,
) -> usize {
    let mut current_visual = 0;
    let mut char_col = 0;

    for ch in chars {
        let width = char_width(ch, current_visual, tab_size);
        if current_visual + width > visual_col {
            // Closer to the right edge of a wide char rounds up
            if visual_col - current_visual > width / 2 {
                char_col += 1;
            }
            return char_col;
        }
        current_visual += width;
        char_col += 1;
    }

    char_col
}

/// Convert a character column to a visual column, expanding tabs.
pub fn char_col_to_visual_col(
    chars: impl IntoIterator<Item = char>,
    char_col: usize,
    tab_size: usize,
) -> usize {
    chars
        .into_iter()
        .take(char_col)
        .fold(0, |visual, ch| visual + char_width(ch, visual, tab_size))
}
