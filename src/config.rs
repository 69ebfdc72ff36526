// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON under the platform config directory
//! (`~/.config/viewfinder/config.json` on Linux). A missing or unreadable file
//! yields the defaults; the camera must work on first launch.

use crate::backends::camera::QualityTier;
use crate::constants::DEFAULT_SAVE_FOLDER;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "viewfinder";

/// Config file name
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture quality preference
    pub quality_tier: QualityTier,
    /// Folder under the Pictures directory where photos are saved
    pub save_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality_tier: QualityTier::default(),
            save_folder: DEFAULT_SAVE_FOLDER.to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Load from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No config file, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Save to the default location
    pub fn save(&self) -> AppResult<()> {
        self.save_to(&Self::default_path())
    }

    /// Save to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("serialize failed: {}", e)))?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Photos directory derived from `save_folder`
    pub fn photo_dir(&self) -> PathBuf {
        crate::storage::photo_dir_for(&self.save_folder)
    }
}
