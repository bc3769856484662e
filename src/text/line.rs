//! One logical line of text
//!
//! A `Line` is a [`BlockArray`] of styled characters. Every line except the
//! last one of a document ends in exactly one line break (`\n`, `\r\n` or
//! `\r`), and the break characters are stored like any other character, so
//! `len()` is the line's share of the document's flat index space.

use crate::blocks::{BlockArray, Weighted};
use crate::text::Pos;
use crate::util::text::{char_col_to_visual_col, char_width, visual_col_to_char_col};

/// A character cell with an optional highlighter style tag (0 = default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Char {
    pub c: char,
    pub style: u16,
}

impl Char {
    pub fn new(c: char) -> Self {
        Self { c, style: 0 }
    }

}

impl Weighted for Char {}

impl From<char> for Char {
    fn from(c: char) -> Self {
        Self::new(c)
    }
}

/// Cached word-wrap decomposition, recomputed only when dirty or when the
/// width or tab size changes.
#[derive(Debug, Clone)]
struct WrapCache {
    dirty: bool,
    width: usize,
    tab_size: usize,
    /// Character index where each visual row after the first starts
    cut_offs: Vec<usize>,
}

impl Default for WrapCache {
    fn default() -> Self {
        Self {
            dirty: true,
            width: 0,
            tab_size: 4,
            cut_offs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Line {
    chars: BlockArray<Char>,
    wrap: WrapCache,
}

impl Weighted for Line {
    fn weight(&self) -> usize {
        self.chars.len()
    }
}

impl Line {
    pub fn new(block_size: usize) -> Self {
        Self {
            chars: BlockArray::new(block_size),
            wrap: WrapCache::default(),
        }
    }

    pub fn from_chars(block_size: usize, chars: Vec<Char>) -> Self {
        Self {
            chars: BlockArray::from_vec(block_size, chars),
            wrap: WrapCache::default(),
        }
    }

    pub fn from_str(block_size: usize, text: &str) -> Self {
        Self::from_chars(block_size, text.chars().map(Char::new).collect())
    }

    /// Number of characters including the trailing line break
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> impl Iterator<Item = &Char> + '_ {
        self.chars.iter()
    }

    pub fn chars_from(&self, index: usize) -> impl Iterator<Item = &Char> + '_ {
        self.chars.iter_from(index)
    }

    /// Character at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[track_caller]
    pub fn char_at(&self, index: usize) -> char {
        self.chars.value(index).c
    }

    pub fn text(&self) -> String {
        self.chars.iter().map(|ch| ch.c).collect()
    }

    /// Text without the trailing line break
    pub fn normal_text(&self) -> String {
        self.chars
            .iter()
            .take(self.normal_count())
            .map(|ch| ch.c)
            .collect()
    }

    /// Length of the trailing line break (0, 1 or 2)
    pub fn break_len(&self) -> usize {
        let n = self.chars.len();
        match self.chars.last().map(|ch| ch.c) {
            Some('\n') if n >= 2 && self.chars.value(n - 2).c == '\r' => 2,
            Some('\n') | Some('\r') => 1,
            _ => 0,
        }
    }

    /// Number of characters excluding the trailing line break
    pub fn normal_count(&self) -> usize {
        self.chars.len() - self.break_len()
    }

    pub fn line_break(&self) -> &'static str {
        match (self.break_len(), self.chars.last().map(|ch| ch.c)) {
            (2, _) => "\r\n",
            (1, Some('\n')) => "\n",
            (1, _) => "\r",
            _ => "",
        }
    }

    /// Number of leading spaces and tabs
    pub fn first_spaces(&self) -> usize {
        self.chars
            .iter()
            .take_while(|ch| ch.c == ' ' || ch.c == '\t')
            .count()
    }

    /// First index `>= from` holding `c`
    pub fn index_of_char(&self, c: char, from: usize) -> Option<usize> {
        self.chars
            .iter_from(from)
            .position(|ch| ch.c == c)
            .map(|offset| from + offset)
    }

    /// Last index `< before` holding `c`
    pub fn left_index_of_char(&self, c: char, before: usize) -> Option<usize> {
        let before = before.min(self.chars.len());
        (0..before).rev().find(|&i| self.chars.value(i).c == c)
    }

    // =========================================================================
    // Mutation (every method marks the wrap cache dirty)
    // =========================================================================

    pub fn insert(&mut self, index: usize, ch: Char) {
        self.chars.insert(index, ch);
        self.wrap.dirty = true;
    }

    pub fn insert_chars(&mut self, index: usize, chars: Vec<Char>) {
        self.chars.insert_range(index, chars);
        self.wrap.dirty = true;
    }

    pub fn insert_str(&mut self, index: usize, text: &str) {
        self.insert_chars(index, text.chars().map(Char::new).collect());
    }

    pub fn remove_range(&mut self, index: usize, count: usize) -> Vec<Char> {
        let removed = self.chars.remove_range(index, count);
        self.wrap.dirty = true;
        removed
    }

    /// Style tag at `index`, 0 when out of range
    pub fn style_at(&self, index: usize) -> u16 {
        self.chars.try_value(index).map_or(0, |ch| ch.style)
    }

    /// Apply `style` to `[from, to)`, clamped to the line
    pub fn set_style_range(&mut self, from: usize, to: usize, style: u16) {
        let to = to.min(self.chars.len());
        if from < to {
            self.chars
                .modify_range_in_place(from, to - from, |_, ch| ch.style = style);
        }
    }

    // =========================================================================
    // Visual columns
    // =========================================================================

    /// Visual column of character `index` with tabs expanded
    pub fn pos_of_index(&self, index: usize, tab_size: usize) -> usize {
        char_col_to_visual_col(self.chars.iter().map(|ch| ch.c), index, tab_size)
    }

    /// Character index at visual column `pos`, clamped to `normal_count()`
    pub fn normal_index_of_pos(&self, pos: usize, tab_size: usize) -> usize {
        let normal = self.normal_count();
        visual_col_to_char_col(self.chars.iter().take(normal).map(|ch| ch.c), pos, tab_size)
            .min(normal)
    }

    // =========================================================================
    // Word wrap
    // =========================================================================

    /// Recompute cut-offs for `width` visual columns if anything changed.
    ///
    /// Rows break after the last space that fits; a word wider than the
    /// row is cut hard. Spaces may hang past the edge.
    pub fn wrap(&mut self, width: usize, tab_size: usize) {
        if !self.wrap.dirty && self.wrap.width == width && self.wrap.tab_size == tab_size {
            return;
        }
        let chars: Vec<char> = self
            .chars
            .iter()
            .take(self.normal_count())
            .map(|ch| ch.c)
            .collect();
        self.wrap = WrapCache {
            dirty: false,
            width,
            tab_size,
            cut_offs: compute_cut_offs(&chars, width.max(1), tab_size),
        };
    }

    pub fn is_wrap_dirty(&self) -> bool {
        self.wrap.dirty
    }

    pub fn cut_offs(&self) -> &[usize] {
        &self.wrap.cut_offs
    }

    /// Visual rows this line occupies after the last `wrap`
    pub fn wrapped_rows(&self) -> usize {
        self.wrap.cut_offs.len() + 1
    }

    fn row_start(&self, row: usize) -> usize {
        match row {
            0 => 0,
            _ => self.wrap.cut_offs[row - 1],
        }
    }

    /// Row and visual column of `index` inside the wrapped line
    pub fn wrap_pos_of_index(&self, index: usize) -> Pos {
        let index = index.min(self.chars.len());
        let row = self.wrap.cut_offs.partition_point(|&cut| cut <= index);
        let start = self.row_start(row);
        let column = char_col_to_visual_col(
            self.chars.iter_from(start).map(|ch| ch.c),
            index - start,
            self.wrap.tab_size,
        );
        Pos::new(row, column)
    }

    /// Character index at visual `column` of wrapped `row`.
    ///
    /// Clamped to the row: a non-last row never resolves to its cut-off,
    /// which belongs to the next row.
    pub fn wrap_normal_index_of_pos(&self, column: usize, row: usize) -> usize {
        let rows = self.wrap.cut_offs.len();
        let row = row.min(rows);
        let start = self.row_start(row);
        let end = if row < rows {
            self.wrap.cut_offs[row]
        } else {
            self.normal_count()
        };
        let index = start
            + visual_col_to_char_col(
                self.chars.iter_from(start).take(end - start).map(|ch| ch.c),
                column,
                self.wrap.tab_size,
            );
        if row < rows {
            index.min(end - 1)
        } else {
            index.min(end)
        }
    }
}

fn compute_cut_offs(chars: &[char], width: usize, tab_size: usize) -> Vec<usize> {
    let mut cut_offs = Vec::new();
    let mut row_start = 0;
    let mut column = 0;
    let mut after_space: Option<usize> = None;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let w = char_width(ch, column, tab_size);
        if column + w > width && i > row_start && ch != ' ' {
            let cut = match after_space {
                Some(end) if end > row_start && end <= i => end,
                _ => i,
            };
            cut_offs.push(cut);
            row_start = cut;
            after_space = None;
            column = chars[row_start..i]
                .iter()
                .fold(0, |col, &c| col + char_width(c, col, tab_size));
            continue;
        }
        column += w;
        if ch == ' ' || ch == '\t' {
            after_space = Some(i + 1);
        }
        i += 1;
    }
    cut_offs
}
