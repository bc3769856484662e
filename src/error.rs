//! Error types for the editing core.
//!
//! Only programmer errors live here. Vetoed commands, clamped coordinates and
//! undo/redo past either end of history are not errors and are reported as
//! plain `bool`/clamped values by the APIs that produce them.

use thiserror::Error;

/// An index or range fell outside a [`BlockArray`](crate::blocks::BlockArray).
///
/// Container accesses never clamp: a bad index would corrupt the offset
/// bookkeeping, so the panicking APIs abort with this message and the `try_*`
/// APIs hand it back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OutOfRange {
    /// Read, write or remove of a single element.
    #[error("index={index} is out of [0, {count})")]
    Index { index: usize, count: usize },

    /// Insert position (one past the end is allowed).
    #[error("index={index} is out of [0, {count}]")]
    Insert { index: usize, count: usize },

    /// Range removal.
    #[error("index={index}, count={len} is out of [0, {count})")]
    Range {
        index: usize,
        len: usize,
        count: usize,
    },
}

impl OutOfRange {
    pub fn index(index: usize, count: usize) -> Self {
        Self::Index { index, count }
    }

    pub fn insert(index: usize, count: usize) -> Self {
        Self::Insert { index, count }
    }

    pub fn range(index: usize, len: usize, count: usize) -> Self {
        Self::Range { index, len, count }
    }
}
