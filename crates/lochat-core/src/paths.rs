//! Filesystem locations
//!
//! Everything lives under `~/.lochat` so a single directory can be wiped to reset.

use std::path::PathBuf;

use crate::constants;

/// Root config directory (`~/.lochat`)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::ui::CONFIG_DIR_NAME)
}

/// Path of the optional TOML config file
pub fn config_file() -> PathBuf {
    config_dir().join(constants::ui::CONFIG_FILE_NAME)
}

/// Directory for log files
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Default SQLite database holding the session snapshot
pub fn database_path() -> PathBuf {
    config_dir().join(constants::storage::DATABASE_FILE)
}
