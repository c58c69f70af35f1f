use anyhow::{Context, Result};
use satchel_core::{catalog_from_file, InventorySettings, ItemCatalog};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/satchel.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// Root directory of the disk save store.
    pub save_dir: PathBuf,
    /// Optional JSON item pack used by `give`/`put`.
    pub catalog: Option<PathBuf>,
    /// Slot count for inventories created by `run`.
    pub default_capacity: usize,
    pub settings: InventorySettings,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            catalog: None,
            default_capacity: 10,
            settings: InventorySettings::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<CliConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    CliConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                CliConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Load the configured item pack, or an empty catalog when none is set.
    pub fn load_catalog(&self) -> Result<ItemCatalog> {
        match &self.catalog {
            Some(path) => catalog_from_file(path)
                .with_context(|| format!("failed to load item pack from {}", path.display())),
            None => Ok(ItemCatalog::default()),
        }
    }
}
