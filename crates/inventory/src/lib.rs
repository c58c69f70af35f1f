#![warn(missing_docs)]
//! Slot inventories: a fixed-capacity container with stacking, splitting,
//! swapping and cross-container transfers, plus pluggable persistence to
//! memory and disk.

mod container;
pub mod events;
mod hooks;
pub mod persist;
mod shared;

pub use container::{AddOutcome, ContainerId, Inventory};
pub use events::{EventBus, InventoryEvent, SubscriptionId};
pub use hooks::{DefaultHooks, InventoryHooks};
pub use persist::{
    DeactivationReason, DiskStore, LoadSource, MemoryStore, Owner, PersistError,
    PersistenceStrategy, SaveContext, SavePayload, SaveStore, SaveTarget, StrategyKind,
};
pub use shared::{transfer_between, SharedInventory};

pub use satchel_core::{InstanceId, InventorySettings, ItemKey, ItemStack};
