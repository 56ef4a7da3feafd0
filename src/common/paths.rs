//! Configuration and log locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/exttest/`, `~/.local/share/exttest/logs/`
//! - macOS: `~/Library/Application Support/exttest/`
//! - Windows: `%APPDATA%\exttest\`

use std::path::{Path, PathBuf};

/// Application name used for config and data directories
const APP_NAME: &str = "exttest";

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV: &str = "EXTTEST_CONFIG";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `EXTTEST_CONFIG` wins over the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}

/// Make a path absolute against `base` without touching the filesystem
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
