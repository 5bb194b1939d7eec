//! User settings persistence
//!
//! The navigation controller consumes this store (show-hidden flag, last
//! opened folder) but does not own its format.

use crate::error::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    pub show_hidden_files: bool,
    pub last_opened_folder: Option<PathBuf>,

    /// Where this instance persists to; `None` means in-memory only
    /// (used by tests and embedded callers that persist elsewhere).
    #[serde(skip)]
    storage: Option<PathBuf>,
}

impl Settings {
    /// Get the settings file path (~/.config/fex/settings.json)
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fex").join("settings.json"))
    }

    /// Load settings from disk, or defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::settings_path().ok_or_else(|| {
            ExplorerError::Config("could not determine config directory".to_string())
        })?;

        if !path.exists() {
            return Ok(Settings {
                storage: Some(path),
                ..Settings::default()
            });
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| ExplorerError::Config(format!("failed to read settings: {}", e)))?;
        let mut settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| ExplorerError::Config(format!("failed to parse settings: {}", e)))?;
        settings.storage = Some(path);
        Ok(settings)
    }

    /// A settings instance that never touches disk.
    pub fn in_memory() -> Self {
        Settings::default()
    }

    /// Save to the storage path; a no-op for in-memory instances.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.storage else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ExplorerError::Config(format!("failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ExplorerError::Config(format!("failed to serialize settings: {}", e)))?;
        fs::write(path, contents)
            .map_err(|e| ExplorerError::Config(format!("failed to write settings: {}", e)))
    }
}
