//! Document coordinates

use serde::Serialize;

/// A (line, column) coordinate, column counted in characters.
///
/// Derived from a flat character index on demand; never the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Place {
    pub line: usize,
    pub column: usize,
}

impl Place {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A (visual row, visual column) coordinate after tab expansion and word wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Pos {
    pub row: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}
