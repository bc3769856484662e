//! Token editing core - multi-cursor text storage with grouped undo
//!
//! Text lives in a two-level block structure: a [`Document`] indexes lines
//! through a [`BlockArray`], and every [`text::Line`] stores its characters
//! in one as well. A [`Controller`] owns a document, its [`SelectionSet`]
//! and the [`History`] of reversible [`Command`]s.

pub mod blocks;
pub mod command;
pub mod config;
pub mod config_paths;
pub mod controller;
pub mod debug_dump;
pub mod error;
pub mod matcher;
pub mod selection;
pub mod text;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use blocks::{BlockArray, Weighted};
pub use command::{Clock, Command, CommandKind, CommandType, History, ManualClock};
pub use config::{CoreConfig, LineBreak};
pub use controller::Controller;
pub use error::OutOfRange;
pub use matcher::{LiteralMatcher, TextMatcher};
pub use selection::{Selection, SelectionSet};
pub use text::{Document, Place, Pos};
