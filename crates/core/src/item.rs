//! Item records - one stack of a single item type held in a slot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::extra::ExtraInfo;
use crate::registry::ItemKey;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an item record.
///
/// Clones of a record share its instance; [`ItemStack::duplicate`] mints a
/// new one. Instances are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate a fresh instance id.
    pub fn next() -> Self {
        Self(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stack of one item type.
///
/// Invariant: `quantity <= max_quantity` and `max_quantity >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    #[serde(skip, default = "InstanceId::next")]
    instance: InstanceId,
    key: ItemKey,
    quantity: u32,
    max_quantity: u32,
    /// Display name (opaque to the inventory).
    pub name: String,
    /// Display description (opaque to the inventory).
    pub description: String,
    /// Icon reference (opaque to the inventory).
    pub icon: Option<String>,
    /// Extension payload.
    pub extra: ExtraInfo,
}

impl ItemStack {
    /// Create a new record. `max_quantity` is raised to at least 1 and
    /// `quantity` clamped to it.
    pub fn new(key: ItemKey, quantity: u32, max_quantity: u32) -> Self {
        let max_quantity = max_quantity.max(1);
        Self {
            instance: InstanceId::next(),
            key,
            quantity: quantity.min(max_quantity),
            max_quantity,
            name: String::new(),
            description: String::new(),
            icon: None,
            extra: ExtraInfo::default(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the icon reference.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the extension payload.
    pub fn with_extra(mut self, extra: ExtraInfo) -> Self {
        self.extra = extra;
        self
    }

    /// Identity of this record.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Item type identity.
    pub fn key(&self) -> &ItemKey {
        &self.key
    }

    /// Current amount in the stack.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Maximum amount the stack can hold.
    pub fn max_quantity(&self) -> u32 {
        self.max_quantity
    }

    /// Whether both records are the same item type.
    pub fn is_same_kind(&self, other: &ItemStack) -> bool {
        self.key == other.key
    }

    /// Whether the stack can take more items.
    pub fn has_room(&self) -> bool {
        self.quantity != self.max_quantity
    }

    /// Remaining space in this stack.
    pub fn remaining_space(&self) -> u32 {
        self.max_quantity.saturating_sub(self.quantity)
    }

    /// True when the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Set the quantity, clamped to `0..=max_quantity`. Returns the stored value.
    pub fn set_quantity(&mut self, quantity: u32) -> u32 {
        self.quantity = quantity.min(self.max_quantity);
        self.quantity
    }

    /// Change the maximum (at least 1), clamping the current quantity down.
    pub fn set_max_quantity(&mut self, max_quantity: u32) {
        self.max_quantity = max_quantity.max(1);
        if self.quantity > self.max_quantity {
            self.quantity = self.max_quantity;
        }
    }

    /// Try to add items to this stack, returning the amount that didn't fit.
    pub fn add(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.remaining_space());
        self.quantity += added;
        amount - added
    }

    /// Try to remove items from this stack, returning the amount actually removed.
    pub fn remove(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.quantity);
        self.quantity -= removed;
        removed
    }

    /// Copy metadata and quantity into a new record with a fresh instance.
    pub fn duplicate(&self) -> ItemStack {
        ItemStack {
            instance: InstanceId::next(),
            ..self.clone()
        }
    }

    /// Copy metadata into a new record holding `quantity` (clamped).
    pub fn duplicate_with_quantity(&self, quantity: u32) -> ItemStack {
        let mut copy = self.duplicate();
        copy.set_quantity(quantity);
        copy
    }
}

/// Merge as much of `incoming` into `target` as fits.
///
/// `incoming` keeps the leftover. Returns the amount moved. Callers are
/// responsible for checking that both records are the same item type.
pub fn merge_into(target: &mut ItemStack, incoming: &mut ItemStack) -> u32 {
    let offered = incoming.quantity;
    let leftover = target.add(offered);
    incoming.quantity = leftover;
    offered - leftover
}
