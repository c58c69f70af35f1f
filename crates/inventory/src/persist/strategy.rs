//! Persistence strategy: decides where a container's state goes when it is
//! activated or deactivated.
//!
//! | kind   | activate            | suspend | terminate | destroyed |
//! |--------|---------------------|---------|-----------|-----------|
//! | None   | -                   | -       | -         | -         |
//! | Disk   | disk                | disk    | disk      | disk      |
//! | Memory | memory              | memory  | memory    | memory    |
//! | Hybrid | memory, then disk   | memory  | disk      | memory    |
//!
//! Store failures are logged and reported as `false`; they never propagate.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use super::disk::DiskStore;
use super::memory::MemoryStore;
use super::payload::{apply, capture, SavePayload};
use super::save_id::{DefaultSaveIdPolicy, Owner, SaveIdPolicy};
use super::store::SaveStore;
use super::PersistError;
use crate::container::Inventory;
use crate::events::InventoryEvent;

/// Default save class (disk sub-directory).
pub const DEFAULT_SAVE_CLASS: &str = "inventory";

/// Which persistence behaviour a container uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Never saves or loads.
    #[default]
    None,
    /// Disk only.
    Disk,
    /// Process memory only.
    Memory,
    /// Memory for short absences, disk on termination.
    Hybrid,
}

/// Why a container is being deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeactivationReason {
    /// Temporarily out of play (level change, streaming out).
    Suspend,
    /// The session is ending.
    Terminate,
    /// The owner was destroyed.
    Destroyed,
}

/// Where `activate` restored state from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadSource {
    /// The in-memory store.
    Memory,
    /// The disk store.
    Disk,
}

/// Explicit destination for [`Inventory::save_to`] / [`Inventory::load_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveTarget {
    /// The in-memory store.
    Memory,
    /// The disk store.
    Disk,
}

/// Stores available to a lifecycle call. A missing store makes the
/// corresponding save or load fail.
#[derive(Default)]
pub struct SaveContext<'a> {
    memory: Option<&'a mut MemoryStore>,
    disk: Option<&'a DiskStore>,
}

impl<'a> SaveContext<'a> {
    /// Context without any store.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Attach the in-memory store.
    pub fn with_memory(mut self, store: &'a mut MemoryStore) -> Self {
        self.memory = Some(store);
        self
    }

    /// Attach the disk store.
    pub fn with_disk(mut self, store: &'a DiskStore) -> Self {
        self.disk = Some(store);
        self
    }
}

/// Persistence state machine attached to a container.
pub struct PersistenceStrategy {
    kind: StrategyKind,
    save_id: Option<String>,
    resolved_id: Option<String>,
    save_class: String,
    policy: Box<dyn SaveIdPolicy>,
}

impl Default for PersistenceStrategy {
    fn default() -> Self {
        Self::new(StrategyKind::None)
    }
}

impl fmt::Debug for PersistenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceStrategy")
            .field("kind", &self.kind)
            .field("save_id", &self.save_id)
            .field("resolved_id", &self.resolved_id)
            .field("save_class", &self.save_class)
            .finish()
    }
}

impl PersistenceStrategy {
    /// Strategy of `kind` with the default save-id policy and class.
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            save_id: None,
            resolved_id: None,
            save_class: DEFAULT_SAVE_CLASS.to_owned(),
            policy: Box::new(DefaultSaveIdPolicy),
        }
    }

    /// Disk-only strategy.
    pub fn disk() -> Self {
        Self::new(StrategyKind::Disk)
    }

    /// Memory-only strategy.
    pub fn memory() -> Self {
        Self::new(StrategyKind::Memory)
    }

    /// Hybrid strategy.
    pub fn hybrid() -> Self {
        Self::new(StrategyKind::Hybrid)
    }

    /// Use a fixed save-id. Empty ids are ignored at resolution time.
    pub fn with_save_id(mut self, id: impl Into<String>) -> Self {
        self.save_id = Some(id.into());
        self.resolved_id = None;
        self
    }

    /// Save into a different class (disk sub-directory).
    pub fn with_save_class(mut self, class: impl Into<String>) -> Self {
        self.save_class = class.into();
        self
    }

    /// Replace the owner-based save-id derivation.
    pub fn with_policy(mut self, policy: impl SaveIdPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self.resolved_id = None;
        self
    }

    /// Strategy kind.
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Save class.
    pub fn save_class(&self) -> &str {
        &self.save_class
    }

    /// Explicit save-id, if one was configured.
    pub fn save_id(&self) -> Option<&str> {
        self.save_id.as_deref()
    }

    /// Effective save-id: the explicit one if non-empty, else the cached
    /// one, else whatever the policy derives from `owner`. A derived id is
    /// cached for later calls.
    pub fn resolve_save_id(&mut self, owner: Option<&Owner>) -> Option<String> {
        if let Some(id) = self.save_id.as_deref().filter(|id| !id.is_empty()) {
            return Some(id.to_owned());
        }
        if let Some(id) = &self.resolved_id {
            return Some(id.clone());
        }
        let id = self.policy.resolve(owner).filter(|id| !id.is_empty())?;
        self.resolved_id = Some(id.clone());
        Some(id)
    }

    /// Container became active. Returns where state was restored from.
    pub fn on_activate(
        &mut self,
        inventory: &mut Inventory,
        ctx: &mut SaveContext<'_>,
    ) -> Option<LoadSource> {
        match self.kind {
            StrategyKind::None => None,
            StrategyKind::Disk => self
                .load(SaveTarget::Disk, inventory, ctx)
                .then_some(LoadSource::Disk),
            StrategyKind::Memory => self
                .load(SaveTarget::Memory, inventory, ctx)
                .then_some(LoadSource::Memory),
            StrategyKind::Hybrid => {
                if self.load(SaveTarget::Memory, inventory, ctx) {
                    Some(LoadSource::Memory)
                } else if self.load(SaveTarget::Disk, inventory, ctx) {
                    Some(LoadSource::Disk)
                } else {
                    None
                }
            }
        }
    }

    /// Container is going away for `reason`.
    pub fn on_deactivate(
        &mut self,
        inventory: &mut Inventory,
        reason: DeactivationReason,
        ctx: &mut SaveContext<'_>,
    ) {
        let target = match (self.kind, reason) {
            (StrategyKind::None, _) => return,
            (StrategyKind::Disk, _) => SaveTarget::Disk,
            (StrategyKind::Memory, _) => SaveTarget::Memory,
            (StrategyKind::Hybrid, DeactivationReason::Terminate) => SaveTarget::Disk,
            (StrategyKind::Hybrid, DeactivationReason::Suspend)
            | (StrategyKind::Hybrid, DeactivationReason::Destroyed) => SaveTarget::Memory,
        };
        self.save(target, inventory, ctx);
    }

    /// Capture `inventory` and write it to `target`.
    pub fn save(
        &mut self,
        target: SaveTarget,
        inventory: &mut Inventory,
        ctx: &mut SaveContext<'_>,
    ) -> bool {
        let verbose = inventory.settings().verbose_logging;
        let Some(id) = self.gate(inventory, "save") else {
            return false;
        };

        let payload = capture(inventory);
        let result = match target {
            SaveTarget::Memory => match ctx.memory.as_deref_mut() {
                Some(store) => store.store(&id, &payload),
                None => return self.unavailable(target, &id),
            },
            SaveTarget::Disk => match ctx.disk {
                Some(disk) => {
                    disk.scoped(&self.save_class)
                        .and_then(|mut store| store.store(&id, &payload))
                }
                None => return self.unavailable(target, &id),
            },
        };

        match result {
            Ok(()) => {
                report(verbose, "saved inventory", target, &id, &payload);
                inventory.emit(InventoryEvent::Saved);
                true
            }
            Err(err) => {
                warn!(save_id = %id, ?target, %err, "inventory save failed");
                false
            }
        }
    }

    /// Read `target` and apply it to `inventory`.
    pub fn load(
        &mut self,
        target: SaveTarget,
        inventory: &mut Inventory,
        ctx: &mut SaveContext<'_>,
    ) -> bool {
        let verbose = inventory.settings().verbose_logging;
        let Some(id) = self.gate(inventory, "load") else {
            return false;
        };

        let result: Result<Option<SavePayload>, PersistError> = match target {
            SaveTarget::Memory => match ctx.memory.as_deref_mut() {
                Some(store) => store.retrieve(&id),
                None => return self.unavailable(target, &id),
            },
            SaveTarget::Disk => match ctx.disk {
                Some(disk) => disk
                    .scoped(&self.save_class)
                    .and_then(|mut store| store.retrieve(&id)),
                None => return self.unavailable(target, &id),
            },
        };

        match result {
            Ok(Some(payload)) => {
                report(verbose, "loaded inventory", target, &id, &payload);
                apply(inventory, payload);
                inventory.emit(InventoryEvent::Loaded);
                true
            }
            Ok(None) => {
                debug!(save_id = %id, ?target, "no saved inventory");
                false
            }
            Err(err) => {
                warn!(save_id = %id, ?target, %err, "inventory load failed");
                false
            }
        }
    }

    fn gate(&mut self, inventory: &Inventory, op: &str) -> Option<String> {
        if !inventory.settings().auto_save_on_transition {
            debug!(op, "persistence disabled by settings");
            return None;
        }
        let id = self.resolve_save_id(inventory.owner());
        if id.is_none() {
            warn!(op, owner = ?inventory.owner(), "no save-id for inventory");
        }
        id
    }

    fn unavailable(&self, target: SaveTarget, id: &str) -> bool {
        warn!(save_id = %id, ?target, "save store not available");
        false
    }
}

fn report(verbose: bool, what: &str, target: SaveTarget, id: &str, payload: &SavePayload) {
    let occupied = payload.occupied();
    if verbose {
        info!(save_id = %id, ?target, capacity = payload.capacity, occupied, "{what}");
    } else {
        debug!(save_id = %id, ?target, capacity = payload.capacity, occupied, "{what}");
    }
}
