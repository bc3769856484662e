//! Diagnostics: subscriber setup and caret snapshots for debug logs
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=token_core::controller=debug` - grouping, undo and redo
//! - `RUST_LOG=token_core::blocks=trace` - block splits and merges
//!
//! # Log Files
//!
//! Logs are written to `~/.config/token-editor/logs/token-core.log` with daily rotation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::selection::SelectionSet;
use crate::text::{Document, Place};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG and defaults to `warn`. The file layer
/// always logs at debug level. Calling it twice is a no-op.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "token-core.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Caret and anchor places of every selection, for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretSnapshot {
    pub count: usize,
    pub primary: usize,
    pub carets: Vec<CaretInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretInfo {
    pub caret: Place,
    pub anchor: Place,
    pub selection_empty: bool,
}

impl CaretSnapshot {
    pub fn capture(document: &Document, selections: &SelectionSet) -> Self {
        Self {
            count: selections.len(),
            primary: selections.primary_index(),
            carets: selections
                .iter()
                .map(|s| CaretInfo {
                    caret: document.place_of(s.caret),
                    anchor: document.place_of(s.anchor),
                    selection_empty: s.is_empty(),
                })
                .collect(),
        }
    }

    /// Describe what changed between two snapshots, `None` if nothing did
    pub fn diff(&self, other: &CaretSnapshot) -> Option<String> {
        if self.count != other.count {
            return Some(format!("selection count: {} → {}", self.count, other.count));
        }

        let mut changes = Vec::new();
        if self.primary != other.primary {
            changes.push(format!("primary: #{} → #{}", self.primary, other.primary));
        }
        for (i, (before, after)) in self.carets.iter().zip(&other.carets).enumerate() {
            if before.caret != after.caret {
                changes.push(format!(
                    "#{}: ({},{}) → ({},{})",
                    i, before.caret.line, before.caret.column, after.caret.line, after.caret.column
                ));
            }
            if before.selection_empty != after.selection_empty {
                let status = if after.selection_empty {
                    "cleared"
                } else {
                    "active"
                };
                changes.push(format!("#{}: selection {}", i, status));
            }
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
