//! Document index: a block array of lines over one flat character space
//!
//! Line breaks count as characters, so the first character of line `i` sits
//! at the sum of the lengths of all earlier lines. The line container keeps
//! that sum per block (see [`Weighted`](crate::blocks::Weighted)), which makes
//! `place_of` a binary search instead of a walk over every line.
//!
//! Coordinate conversions clamp; text mutations panic outside the document.

use crate::blocks::BlockArray;
use crate::config::CoreConfig;
use crate::error::OutOfRange;
use crate::matcher::{LiteralMatcher, TextMatcher};
use crate::text::{Char, Line, Place, Pos};

/// Style tag applied to `count` characters starting at `index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRange {
    pub index: usize,
    pub count: usize,
    pub style: u16,
}

impl StyleRange {
    pub fn new(index: usize, count: usize, style: u16) -> Self {
        Self {
            index,
            count,
            style,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    lines: BlockArray<Line>,
    char_block_size: usize,
    tab_size: usize,
    wrap_width: Option<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl Document {
    /// Empty document: a single empty line
    pub fn new(config: &CoreConfig) -> Self {
        let mut lines = BlockArray::new(config.line_block_size);
        lines.push(Line::new(config.char_block_size));
        Self {
            lines,
            char_block_size: config.char_block_size,
            tab_size: config.tab_size,
            wrap_width: config.wrap_width,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::with_text(&CoreConfig::default(), text)
    }

    pub fn with_text(config: &CoreConfig, text: &str) -> Self {
        let mut document = Self::new(config);
        document.set_text(text);
        document
    }

    /// Replace the whole content
    pub fn set_text(&mut self, text: &str) {
        let lines = split_lines(self.char_block_size, text.chars().map(Char::new).collect());
        self.lines.clear();
        self.lines.insert_range(0, lines);
        self.update_wrap();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn char_count(&self) -> usize {
        self.lines.total_weight()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of line blocks in the index
    pub fn line_blocks_count(&self) -> usize {
        self.lines.blocks_count()
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    /// Line `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= line_count()`.
    #[track_caller]
    pub fn line(&self, index: usize) -> &Line {
        self.lines.value(index)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.lines.iter()
    }

    /// Flat index of the first character of line `index` (`index <= line_count()`)
    #[track_caller]
    pub fn line_start(&self, index: usize) -> usize {
        self.lines.weight_before(index)
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.lines.iter().flat_map(|line| line.chars().map(|ch| ch.c))
    }

    pub fn text(&self) -> String {
        self.chars().collect()
    }

    /// `count` characters starting at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the range is not inside `[0, char_count()]`.
    #[track_caller]
    pub fn text_range(&self, index: usize, count: usize) -> String {
        self.check_range(index, count);
        let place = self.place_of(index);
        let mut column = place.column;
        self.lines
            .iter_from(place.line)
            .flat_map(|line| {
                let from = std::mem::take(&mut column);
                line.chars_from(from)
            })
            .take(count)
            .map(|ch| ch.c)
            .collect()
    }

    /// Character at `index`, `None` at or past the end
    pub fn char_at(&self, index: usize) -> Option<char> {
        if index >= self.char_count() {
            return None;
        }
        let place = self.place_of(index);
        Some(self.lines.value(place.line).char_at(place.column))
    }

    // =========================================================================
    // Coordinates (clamped)
    // =========================================================================

    /// Line and column of flat `index`, clamped to the document
    pub fn place_of(&self, index: usize) -> Place {
        let index = index.min(self.char_count());
        match self.lines.locate_weight(index) {
            Some((line, start)) => Place::new(line, index - start),
            None => {
                let last = self.lines.len() - 1;
                Place::new(last, self.lines.value(last).len())
            }
        }
    }

    /// Flat index of `place`, clamping the line to the document and the
    /// column to the line length (break included)
    pub fn index_of(&self, place: Place) -> usize {
        if place.line >= self.lines.len() {
            return self.char_count();
        }
        let line = self.lines.value(place.line);
        self.lines.weight_before(place.line) + place.column.min(line.len())
    }

    /// Clamp `place` to an existing line and to that line's text (break excluded)
    pub fn normalize(&self, place: Place) -> Place {
        let last = self.lines.len() - 1;
        if place.line > last {
            return Place::new(last, self.lines.value(last).normal_count());
        }
        let normal = self.lines.value(place.line).normal_count();
        Place::new(place.line, place.column.min(normal))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert `text` before flat `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > char_count()`.
    #[track_caller]
    pub fn insert_text(&mut self, index: usize, text: &str) {
        let count = self.char_count();
        if index > count {
            panic!("{}", OutOfRange::insert(index, count));
        }
        if text.is_empty() {
            return;
        }
        let place = self.place_of(index);
        let single_line = !text.contains(['\r', '\n'])
            && place.column <= self.lines.value(place.line).normal_count();
        if single_line {
            let chars: Vec<Char> = text.chars().map(Char::new).collect();
            self.lines
                .modify(place.line, |line| line.insert_chars(place.column, chars));
        } else {
            self.splice(index, 0, text);
        }
        self.update_wrap();
    }

    /// Remove `count` characters starting at flat `index`.
    ///
    /// # Panics
    ///
    /// Panics if the range is not inside `[0, char_count()]`.
    #[track_caller]
    pub fn remove_text(&mut self, index: usize, count: usize) {
        self.check_range(index, count);
        if count == 0 {
            return;
        }
        let place = self.place_of(index);
        // A lone "\r" ending the previous line must not meet a "\n" here
        let after_cr = place.column == 0
            && place.line > 0
            && self.lines.value(place.line - 1).line_break() == "\r";
        if !after_cr && place.column + count <= self.lines.value(place.line).normal_count() {
            self.lines
                .modify(place.line, |line| line.remove_range(place.column, count));
        } else {
            self.splice(index, count, "");
        }
        self.update_wrap();
    }

    /// Replace `[index, index + count)` with `text` by re-splitting every
    /// touched line.
    fn splice(&mut self, index: usize, count: usize, text: &str) {
        let start = self.place_of(index);
        let end = self.place_of(index + count);
        let mut first = start.line;
        let last = end.line;

        let mut content: Vec<Char> = self
            .lines
            .value(first)
            .chars()
            .take(start.column)
            .copied()
            .collect();
        content.extend(text.chars().map(Char::new));
        content.extend(self.lines.value(last).chars_from(end.column).copied());

        // "\r" at the end of the previous line and a leading "\n" form one break
        if first > 0
            && content.first().is_some_and(|ch| ch.c == '\n')
            && self.lines.value(first - 1).line_break() == "\r"
        {
            first -= 1;
            let prev: Vec<Char> = self.lines.value(first).chars().copied().collect();
            content.splice(0..0, prev);
        }

        let mut replacement = split_lines(self.char_block_size, content);
        if last + 1 < self.lines.len() {
            // Content ends with the last line's break: the final segment is empty
            replacement.pop();
        }

        let old_count = last - first + 1;
        tracing::trace!(
            first,
            old_count,
            new_count = replacement.len(),
            "re-split lines"
        );
        if old_count == 1 && replacement.len() == 1 {
            if let Some(line) = replacement.pop() {
                self.lines.set(first, line);
            }
        } else {
            self.lines.remove_range(first, old_count);
            self.lines.insert_range(first, replacement);
        }
    }

    #[track_caller]
    fn check_range(&self, index: usize, count: usize) {
        let total = self.char_count();
        if index > total || count > total - index {
            panic!("{}", OutOfRange::range(index, count, total));
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// First occurrence of `substring` at or after `from`
    pub fn find(&self, substring: &str, from: usize) -> Option<usize> {
        self.find_with(&LiteralMatcher::new(substring), from)
            .map(|(index, _)| index)
    }

    /// First match at or after `from`, as `(index, length)`
    pub fn find_with(&self, matcher: &dyn TextMatcher, from: usize) -> Option<(usize, usize)> {
        let chars: Vec<char> = self.chars().collect();
        (from..chars.len()).find_map(|pos| matcher.match_at(&chars, pos).map(|len| (pos, len)))
    }

    /// Every non-overlapping match, left to right
    pub fn find_all_with(&self, matcher: &dyn TextMatcher) -> Vec<(usize, usize)> {
        let chars: Vec<char> = self.chars().collect();
        let mut matches = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            match matcher.match_at(&chars, pos) {
                Some(len) => {
                    matches.push((pos, len));
                    pos += len.max(1);
                }
                None => pos += 1,
            }
        }
        matches
    }

    // =========================================================================
    // Styles (annotation only, never part of undo)
    // =========================================================================

    /// Tag a character range with a style, clamped to the document.
    /// Weights never change, so the line index is not rebuilt.
    pub fn set_style_range(&mut self, range: StyleRange) {
        let total = self.char_count();
        let start = range.index.min(total);
        let end = range.index.saturating_add(range.count).min(total);
        if start >= end {
            return;
        }
        let first = self.place_of(start);
        let last = self.place_of(end);
        self.lines.modify_range_in_place(
            first.line,
            last.line - first.line + 1,
            |index, line| {
                let from = if index == first.line { first.column } else { 0 };
                let to = if index == last.line { last.column } else { line.len() };
                line.set_style_range(from, to, range.style);
            },
        );
    }

    pub fn style_at(&self, index: usize) -> u16 {
        if index >= self.char_count() {
            return 0;
        }
        let place = self.place_of(index);
        self.lines.value(place.line).style_at(place.column)
    }

    // =========================================================================
    // Word wrap and visual positions
    // =========================================================================

    pub fn wrap_width(&self) -> Option<usize> {
        self.wrap_width
    }

    pub fn set_wrap_width(&mut self, width: Option<usize>) {
        self.wrap_width = width.filter(|&w| w > 0);
        self.update_wrap();
    }

    /// Re-wrap every line block whose cached row count is stale
    pub fn update_wrap(&mut self) {
        let Some(width) = self.wrap_width else {
            return;
        };
        let tab_size = self.tab_size;
        let mut rewrapped = 0;
        for bi in 0..self.lines.blocks_count() {
            if self.lines.block(bi).wrapped_rows(width).is_some() {
                continue;
            }
            let rows = self.lines.modify_block_in_place(bi, |lines| {
                lines
                    .iter_mut()
                    .map(|line| {
                        line.wrap(width, tab_size);
                        line.wrapped_rows()
                    })
                    .sum()
            });
            self.lines.set_block_wrapped_rows(bi, width, rows);
            rewrapped += 1;
        }
        if rewrapped > 0 {
            tracing::trace!(width, blocks = rewrapped, "re-wrapped line blocks");
        }
    }

    /// Total visual rows (line count without wrap)
    pub fn rows_count(&self) -> usize {
        match self.wrap_width {
            None => self.lines.len(),
            Some(width) => self
                .lines
                .blocks()
                .iter()
                .map(|block| block_rows(block.wrapped_rows(width), block.values()))
                .sum(),
        }
    }

    fn rows_before(&self, line: usize, width: usize) -> usize {
        let Some(bi) = self.lines.block_index(line) else {
            return self.rows_count();
        };
        let blocks = self.lines.blocks();
        let before: usize = blocks[..bi]
            .iter()
            .map(|block| block_rows(block.wrapped_rows(width), block.values()))
            .sum();
        let block = &blocks[bi];
        before
            + block.values()[..line - block.offset()]
                .iter()
                .map(Line::wrapped_rows)
                .sum::<usize>()
    }

    /// Visual position of `place`
    pub fn pos_of(&self, place: Place) -> Pos {
        let line_index = place.line.min(self.lines.len() - 1);
        let line = self.lines.value(line_index);
        let column = place.column.min(line.len());
        match self.wrap_width {
            None => Pos::new(line_index, line.pos_of_index(column, self.tab_size)),
            Some(width) => {
                let pos = line.wrap_pos_of_index(column);
                Pos::new(self.rows_before(line_index, width) + pos.row, pos.column)
            }
        }
    }

    /// Place at visual `pos`, clamped to existing rows and to row text
    pub fn place_of_pos(&self, pos: Pos) -> Place {
        let last = self.lines.len() - 1;
        let Some(width) = self.wrap_width else {
            let line_index = pos.row.min(last);
            let line = self.lines.value(line_index);
            return Place::new(line_index, line.normal_index_of_pos(pos.column, self.tab_size));
        };
        let mut row = pos.row;
        for block in self.lines.blocks() {
            let rows = block_rows(block.wrapped_rows(width), block.values());
            if row >= rows {
                row -= rows;
                continue;
            }
            for (k, line) in block.values().iter().enumerate() {
                let line_rows = line.wrapped_rows();
                if row < line_rows {
                    return Place::new(
                        block.offset() + k,
                        line.wrap_normal_index_of_pos(pos.column, row),
                    );
                }
                row -= line_rows;
            }
        }
        let line = self.lines.value(last);
        Place::new(
            last,
            line.wrap_normal_index_of_pos(pos.column, line.wrapped_rows() - 1),
        )
    }

    /// Visual columns of `index` as `(unwrapped, wrapped)`, the values a
    /// selection remembers for vertical movement
    pub fn preferred_pos(&self, index: usize) -> (usize, usize) {
        let place = self.place_of(index);
        let line = self.lines.value(place.line);
        let column = line.pos_of_index(place.column, self.tab_size);
        match self.wrap_width {
            None => (column, column),
            Some(_) => (column, line.wrap_pos_of_index(place.column).column),
        }
    }

    /// Cursor over flat indices that steps over `\r\n` as one character
    pub fn char_cursor(&self, index: usize) -> CharCursor<'_> {
        CharCursor {
            document: self,
            position: index.min(self.char_count()),
        }
    }
}

fn block_rows(cached: Option<usize>, lines: &[Line]) -> usize {
    cached.unwrap_or_else(|| lines.iter().map(Line::wrapped_rows).sum())
}

/// Split characters into lines after each break; the final segment (possibly
/// empty) is always returned.
fn split_lines(block_size: usize, chars: Vec<Char>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    let mut iter = chars.into_iter().peekable();
    while let Some(ch) = iter.next() {
        current.push(ch);
        let line_ends = match ch.c {
            '\n' => true,
            '\r' => !iter.peek().is_some_and(|next| next.c == '\n'),
            _ => false,
        };
        if line_ends {
            lines.push(Line::from_chars(block_size, std::mem::take(&mut current)));
        }
    }
    lines.push(Line::from_chars(block_size, current));
    lines
}

/// Walks the flat index space one visible step at a time.
///
/// `'\0'` stands for "no character" at either document edge.
#[derive(Debug, Clone)]
pub struct CharCursor<'a> {
    document: &'a Document,
    position: usize,
}

impl CharCursor<'_> {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn place(&self) -> Place {
        self.document.place_of(self.position)
    }

    pub fn right_char(&self) -> char {
        self.document.char_at(self.position).unwrap_or('\0')
    }

    pub fn left_char(&self) -> char {
        self.position
            .checked_sub(1)
            .and_then(|i| self.document.char_at(i))
            .unwrap_or('\0')
    }

    /// Step right, over `\r\n` at once. False at the document end.
    pub fn move_right(&mut self) -> bool {
        match self.right_char() {
            '\0' if self.position >= self.document.char_count() => false,
            '\r' if self.document.char_at(self.position + 1) == Some('\n') => {
                self.position += 2;
                true
            }
            _ => {
                self.position += 1;
                true
            }
        }
    }

    /// Step left, over `\r\n` at once. False at the document start.
    pub fn move_left(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        let crlf = self.left_char() == '\n'
            && self.position >= 2
            && self.document.char_at(self.position - 2) == Some('\r');
        self.position -= if crlf { 2 } else { 1 };
        true
    }
}
