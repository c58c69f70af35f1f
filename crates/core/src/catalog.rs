//! Item templates and the catalog loaded from JSON packs.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::extra::ExtraInfo;
use crate::item::ItemStack;
use crate::registry::{ItemKey, ItemKeyError};
use crate::settings::InventorySettings;

/// Errors emitted during catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read item pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse item pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// A template key failed validation.
    #[error(transparent)]
    Key(#[from] ItemKeyError),
    /// The same key was defined twice.
    #[error("item `{0}` is defined more than once")]
    Duplicate(ItemKey),
}

/// Authoring-time definition of an item type.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTemplate {
    /// Type identity shared by every record built from this template.
    pub key: ItemKey,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Icon reference.
    pub icon: Option<String>,
    /// Maximum stack size (1 = not stackable).
    pub max_quantity: u32,
    /// Default extension payload.
    pub extra: ExtraInfo,
}

impl ItemTemplate {
    /// Create a template with a max stack of 1.
    pub fn new(key: ItemKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            description: String::new(),
            icon: None,
            max_quantity: 1,
            extra: ExtraInfo::default(),
        }
    }

    /// Set max stack size (at least 1).
    pub fn with_max_quantity(mut self, max: u32) -> Self {
        self.max_quantity = max.max(1);
        self
    }

    /// Set description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build a fresh record holding `quantity` (clamped to the max).
    pub fn instantiate(&self, quantity: u32) -> ItemStack {
        let mut stack = ItemStack::new(self.key.clone(), quantity, self.max_quantity)
            .with_name(self.name.clone())
            .with_description(self.description.clone())
            .with_extra(self.extra.clone());
        stack.icon = self.icon.clone();
        stack
    }
}

/// JSON shape of a template entry.
#[derive(Debug, Deserialize)]
struct TemplateDefinition {
    key: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default = "default_max_quantity")]
    max_quantity: u32,
    #[serde(default)]
    extra: ExtraInfo,
}

fn default_max_quantity() -> u32 {
    1
}

/// Key-ordered registry of item templates.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    templates: BTreeMap<ItemKey, ItemTemplate>,
}

impl ItemCatalog {
    /// Build a catalog from templates, rejecting duplicate keys.
    pub fn new(templates: impl IntoIterator<Item = ItemTemplate>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for template in templates {
            if map.contains_key(&template.key) {
                return Err(CatalogError::Duplicate(template.key));
            }
            map.insert(template.key.clone(), template);
        }
        Ok(Self { templates: map })
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when the catalog holds no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Look up a template.
    pub fn get(&self, key: &ItemKey) -> Option<&ItemTemplate> {
        self.templates.get(key)
    }

    /// Iterate templates in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemTemplate> {
        self.templates.values()
    }

    /// Create a record of `key`, conforming its payload to the configured schema.
    pub fn instantiate(
        &self,
        key: &ItemKey,
        quantity: u32,
        settings: &InventorySettings,
    ) -> Option<ItemStack> {
        let template = self.templates.get(key)?;
        let mut stack = template.instantiate(quantity);
        if let Some(schema) = &settings.extra_schema {
            schema.conform(&mut stack.extra);
        }
        Some(stack)
    }
}

/// Load a catalog from the provided JSON file path.
pub fn catalog_from_file(path: &Path) -> Result<ItemCatalog, CatalogError> {
    let data = fs::read_to_string(path)?;
    catalog_from_str(&data)
}

/// Load a catalog from an in-memory JSON array of templates.
pub fn catalog_from_str(input: &str) -> Result<ItemCatalog, CatalogError> {
    let defs: Vec<TemplateDefinition> = serde_json::from_str(input)?;
    let mut templates = Vec::with_capacity(defs.len());
    for def in defs {
        templates.push(ItemTemplate {
            key: ItemKey::parse(&def.key)?,
            name: def.name,
            description: def.description,
            icon: def.icon,
            max_quantity: def.max_quantity.max(1),
            extra: def.extra,
        });
    }
    ItemCatalog::new(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extra::{ExtraSchema, ExtraValue};

    const PACK: &str = r#"[
        { "key": "apple", "name": "Apple", "max_quantity": 16 },
        { "key": "tools:pickaxe", "name": "Pickaxe", "description": "Digs." }
    ]"#;

    #[test]
    fn loads_templates_in_key_order() {
        let catalog = catalog_from_str(PACK).unwrap();
        assert_eq!(catalog.len(), 2);
        let keys: Vec<String> = catalog.iter().map(|t| t.key.to_string()).collect();
        assert_eq!(keys, vec!["satchel:apple", "tools:pickaxe"]);

        let pickaxe = catalog.get(&ItemKey::parse("tools:pickaxe").unwrap()).unwrap();
        assert_eq!(pickaxe.max_quantity, 1);
        assert_eq!(pickaxe.description, "Digs.");
    }

    #[test]
    fn rejects_duplicates_and_bad_keys() {
        let dup = r#"[{ "key": "apple", "name": "A" }, { "key": "satchel:apple", "name": "B" }]"#;
        assert!(matches!(catalog_from_str(dup), Err(CatalogError::Duplicate(_))));

        let bad = r#"[{ "key": "Apple!", "name": "A" }]"#;
        assert!(matches!(catalog_from_str(bad), Err(CatalogError::Key(_))));
    }

    #[test]
    fn instantiate_applies_schema() {
        let catalog = catalog_from_str(PACK).unwrap();
        let settings = InventorySettings {
            extra_schema: Some(ExtraSchema::new("food").with_default("calories", ExtraValue::Int(80))),
            ..InventorySettings::default()
        };
        let apple = catalog
            .instantiate(&ItemKey::parse("apple").unwrap(), 40, &settings)
            .unwrap();
        assert_eq!(apple.quantity(), 16);
        assert_eq!(apple.name, "Apple");
        assert_eq!(apple.extra.schema.as_deref(), Some("food"));

        let missing = catalog.instantiate(&ItemKey::parse("pear").unwrap(), 1, &settings);
        assert!(missing.is_none());
    }
}
