//! Inventory-wide settings.
//!
//! Settings are read-only inputs handed to containers at construction time
//! (usually behind an `Arc`), loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::extra::ExtraSchema;

/// Errors raised while reading or writing settings files.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Wrap IO errors.
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap TOML parse errors.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    /// Wrap TOML encode errors.
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Settings shared by every container of a session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InventorySettings {
    /// Master switch for strategy driven saving and loading. When false every
    /// save/load attempt is a no-op that reports failure.
    pub auto_save_on_transition: bool,
    /// When false, no two records ever stack.
    pub stacking_enabled: bool,
    /// Promote per-operation persistence logs from `debug` to `info`.
    pub verbose_logging: bool,
    /// Shape of every item's extension payload.
    pub extra_schema: Option<ExtraSchema>,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            auto_save_on_transition: true,
            stacking_enabled: true,
            verbose_logging: false,
            extra_schema: None,
        }
    }
}

impl InventorySettings {
    /// Load settings, falling back to defaults on any error.
    pub fn load_from_path(path: &Path) -> Self {
        match Self::try_load_from_path(path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("Settings not found at {}. Using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("Failed to load {}: {err}. Using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Load settings, reporting errors.
    pub fn try_load_from_path(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(contents)?)
    }

    /// Save settings as pretty TOML, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
