//! Utility modules

pub mod text;

pub use text::{char_type, is_identifier, is_line_break, is_space_or_line_break, CharType};
