//! Storage location configuration.
//!
//! # Responsibility
//! - Resolve where the note file lives.
//! - Keep development runs away from production data.
//!
//! # Invariants
//! - `data_dir` is always absolute.
//! - Development mode appends ` (development)` to the app directory name.

use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "notekeeper";
pub const DEFAULT_NOTES_FILE_NAME: &str = "notes.json";
const DEV_DIR_SUFFIX: &str = " (development)";

/// Resolved location of durable note storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
}

impl StoreConfig {
    /// Builds a config rooted at an explicit directory.
    ///
    /// # Errors
    /// - Returns an error when `data_dir` is empty or not absolute.
    pub fn from_data_dir(data_dir: &str) -> Result<Self, String> {
        let trimmed = data_dir.trim();
        if trimmed.is_empty() {
            return Err("data_dir cannot be empty".to_string());
        }
        let path = Path::new(trimmed);
        if !path.is_absolute() {
            return Err(format!(
                "data_dir must be an absolute path, got `{trimmed}`"
            ));
        }
        Ok(Self {
            data_dir: path.to_path_buf(),
            file_name: DEFAULT_NOTES_FILE_NAME.to_string(),
        })
    }

    /// Resolves the per-user platform data directory.
    ///
    /// Returns an error when the platform exposes no data directory.
    pub fn platform_default(dev_mode: bool) -> Result<Self, String> {
        let base = dirs::data_dir()
            .ok_or_else(|| "platform data directory is unavailable".to_string())?;
        let dir_name = if dev_mode {
            format!("{APP_DIR_NAME}{DEV_DIR_SUFFIX}")
        } else {
            APP_DIR_NAME.to_string()
        };
        Ok(Self {
            data_dir: base.join(dir_name),
            file_name: DEFAULT_NOTES_FILE_NAME.to_string(),
        })
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Full path of the note file.
    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}
