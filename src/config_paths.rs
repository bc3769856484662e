//! Centralized configuration paths for the editing core
//!
//! All files live under:
//! - Unix/macOS: `~/.config/token-editor/`
//! - Windows: `%APPDATA%\token-editor\`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const APP_DIR: &str = "token-editor";

/// Base config directory
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/token-editor`
///   - Else: `~/.config/token-editor`
///
/// Windows:
///   - `%APPDATA%\token-editor`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/token-editor/core.yaml`
pub fn core_config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("core.yaml"))
}

/// `~/.config/token-editor/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))
}

/// Ensure the logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir().context("No config directory available")?;
    ensure_dir(&logs)?;
    Ok(logs)
}
