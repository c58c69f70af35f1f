#![warn(missing_docs)]
//! Core primitives shared across the workspace: item records, item type
//! keys, extension payloads, settings and the item catalog.

pub mod catalog;
pub mod extra;
pub mod item;
pub mod registry;
pub mod settings;

// Re-export commonly used types
pub use catalog::{catalog_from_file, catalog_from_str, CatalogError, ItemCatalog, ItemTemplate};
pub use extra::{ExtraInfo, ExtraSchema, ExtraValue};
pub use item::{InstanceId, ItemStack};
pub use registry::{ItemKey, ItemKeyError, DEFAULT_NAMESPACE};
pub use settings::{InventorySettings, SettingsError};
