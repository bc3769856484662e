//! Editing core configuration
//!
//! Stored in `~/.config/token-editor/core.yaml`. Every field is optional in
//! the file; missing fields take their defaults.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Line break written by line-break insertion and `FixLineBreaks`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreak {
    #[default]
    Lf,
    Crlf,
    Cr,
}

impl LineBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::Crlf => "\r\n",
            LineBreak::Cr => "\r",
        }
    }
}

/// Configuration of one editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Capacity of the character blocks inside a line
    pub char_block_size: usize,
    /// Capacity of the line blocks inside a document
    pub line_block_size: usize,
    /// Visual width of a tab stop
    pub tab_size: usize,
    /// Insert spaces when a tab is typed
    pub spaces_instead_tabs: bool,
    pub line_break: LineBreak,
    /// Idle time after which the next edit starts a new undo step
    pub group_idle_ms: u64,
    /// Maximum number of commands kept in history
    pub history_limit: usize,
    /// Word-wrap width in visual columns; `None` disables wrapping
    pub wrap_width: Option<usize>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            char_block_size: 64,
            line_block_size: 64,
            tab_size: 4,
            spaces_instead_tabs: false,
            line_break: LineBreak::Lf,
            group_idle_ms: 1000,
            history_limit: 1000,
            wrap_width: None,
        }
    }
}

impl CoreConfig {
    /// Load config from disk, or return defaults if not found or invalid
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::core_config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Core config not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded core config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load and validate config from `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to a map
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.char_block_size >= 2,
            "char_block_size must be at least 2, got {}",
            self.char_block_size
        );
        ensure!(
            self.line_block_size >= 2,
            "line_block_size must be at least 2, got {}",
            self.line_block_size
        );
        ensure!(self.tab_size >= 1, "tab_size must be at least 1");
        ensure!(
            self.wrap_width != Some(0),
            "wrap_width must be positive when set"
        );
        Ok(())
    }

    /// Text inserted for one indentation level
    pub fn indent_unit(&self) -> String {
        if self.spaces_instead_tabs {
            " ".repeat(self.tab_size)
        } else {
            "\t".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = CoreConfig::from_yaml_str("tab_size: 2\nline_break: crlf\n").expect("parse");
        assert_eq!(config.tab_size, 2);
        assert_eq!(config.line_break, LineBreak::Crlf);
        assert_eq!(config.group_idle_ms, 1000);
        assert_eq!(config.history_limit, 1000);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            CoreConfig::from_yaml_str("  \n").expect("parse"),
            CoreConfig::default()
        );
    }

    #[test]
    fn test_invalid_block_size_rejected() {
        let err = CoreConfig::from_yaml_str("char_block_size: 1").unwrap_err();
        assert!(err.to_string().contains("char_block_size"));
    }

    #[test]
    fn test_indent_unit() {
        let mut config = CoreConfig::default();
        assert_eq!(config.indent_unit(), "\t");
        config.spaces_instead_tabs = true;
        config.tab_size = 2;
        assert_eq!(config.indent_unit(), "  ");
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = CoreConfig {
            wrap_width: Some(80),
            line_break: LineBreak::Cr,
            ..CoreConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).expect("serialize");
        assert_eq!(CoreConfig::from_yaml_str(&yaml).expect("parse"), config);
    }
}
