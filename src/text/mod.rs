//! Text storage: lines of styled characters and the document index over them

pub mod document;
pub mod line;
pub mod place;
pub mod words;

pub use document::{CharCursor, Document, StyleRange};
pub use line::{Char, Line};
pub use place::{Place, Pos};
