//! Fixed-capacity slot container.
//!
//! Slots are addressed by 0-based index and hold at most one item record.
//! The slot vector always has exactly `capacity` entries.

use satchel_core::item::merge_into;
use satchel_core::{InstanceId, InventorySettings, ItemStack};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::events::{EventBus, InventoryEvent, SubscriptionId};
use crate::hooks::{DefaultHooks, InventoryHooks};
use crate::persist::{
    DeactivationReason, LoadSource, Owner, PersistenceStrategy, SaveContext, SavePayload,
    SaveTarget,
};

static NEXT_CONTAINER: AtomicU64 = AtomicU64::new(1);

/// Process-unique container identity. Also the lock order for
/// [`crate::SharedInventory`] transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    fn next() -> Self {
        Self(NEXT_CONTAINER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Result of [`Inventory::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AddOutcome {
    /// The remainder was placed in the given empty slot.
    Placed(usize),
    /// Everything merged into existing stacks.
    Absorbed,
    /// No room left; the caller's record keeps the unplaced quantity.
    Rejected,
}

impl AddOutcome {
    /// True when the add hit a full container.
    pub fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Slot inventory with stacking, splitting, swapping and transfers.
pub struct Inventory {
    id: ContainerId,
    capacity: usize,
    slots: Vec<Option<ItemStack>>,
    owner: Option<Owner>,
    settings: Arc<InventorySettings>,
    hooks: Box<dyn InventoryHooks>,
    persistence: PersistenceStrategy,
    events: EventBus,
}

impl Inventory {
    /// Create an empty inventory with default settings. Capacity is at least 1.
    pub fn new(capacity: usize) -> Self {
        Self::with_settings(capacity, Arc::new(InventorySettings::default()))
    }

    /// Create an empty inventory sharing `settings`.
    pub fn with_settings(capacity: usize, settings: Arc<InventorySettings>) -> Self {
        let capacity = capacity.max(1);
        Self {
            id: ContainerId::next(),
            capacity,
            slots: vec![None; capacity],
            owner: None,
            settings,
            hooks: Box::new(DefaultHooks),
            persistence: PersistenceStrategy::default(),
            events: EventBus::new(),
        }
    }

    /// Preset slot contents, padded or truncated to the capacity.
    pub fn with_items(mut self, items: Vec<Option<ItemStack>>) -> Self {
        self.slots = items;
        self.slots.resize(self.capacity, None);
        self
    }

    /// Attach an owner (used for save-id resolution).
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Replace the default hooks.
    pub fn with_hooks(mut self, hooks: impl InventoryHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Select the persistence strategy.
    pub fn with_persistence(mut self, strategy: PersistenceStrategy) -> Self {
        self.persistence = strategy;
        self
    }

    /// Container identity.
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Configured slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots (always equal to the capacity).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Item in a slot, if any.
    pub fn get(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index)?.as_ref()
    }

    /// Copy of every slot.
    pub fn items(&self) -> Vec<Option<ItemStack>> {
        self.slots.clone()
    }

    /// Iterate occupied slots with their indexes.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (index, item)))
    }

    /// Shared settings.
    pub fn settings(&self) -> &InventorySettings {
        &self.settings
    }

    /// Owner, if one was attached.
    pub fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    /// Attach or detach the owner.
    pub fn set_owner(&mut self, owner: Option<Owner>) {
        self.owner = owner;
    }

    /// Active persistence strategy.
    pub fn persistence(&self) -> &PersistenceStrategy {
        &self.persistence
    }

    /// Mutable access to the persistence strategy.
    pub fn persistence_mut(&mut self) -> &mut PersistenceStrategy {
        &mut self.persistence
    }

    /// Register a change listener.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&InventoryEvent) + Send + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Remove a change listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, event: InventoryEvent) {
        self.events.emit(event);
    }

    fn emit_slot(&mut self, index: usize) {
        let item = self.slots.get(index).cloned().flatten();
        self.events.emit(InventoryEvent::ItemUpdated { index, item });
    }

    /// Clear every slot and resize to the capacity.
    pub fn create_new(&mut self) {
        self.slots.clear();
        self.slots.resize(self.capacity, None);
        self.emit(InventoryEvent::Refreshed);
    }

    /// Change the slot count. Ignored below 1; shrinking drops the items in
    /// the cut-off slots.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity < 1 {
            return;
        }
        self.capacity = capacity;
        if self.slots.len() != capacity {
            if capacity < self.slots.len() {
                let dropped = self.slots[capacity..].iter().flatten().count();
                if dropped > 0 {
                    debug!(container = ?self.id, dropped, "capacity shrink discarded items");
                }
            }
            self.slots.resize(capacity, None);
            self.emit(InventoryEvent::Refreshed);
        }
    }

    /// First empty slot.
    pub fn find_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Slot holding the record with this identity.
    pub fn find_item_index(&self, instance: InstanceId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|item| item.instance() == instance))
    }

    /// No slot is free.
    pub fn is_full(&self) -> bool {
        self.occupied() >= self.capacity && self.find_empty_slot().is_none()
    }

    /// Whether `incoming` may merge into `existing`.
    pub fn can_stack(&self, incoming: &ItemStack, existing: &ItemStack) -> bool {
        self.settings.stacking_enabled
            && incoming.is_same_kind(existing)
            && existing.has_room()
            && self.hooks.can_stack(incoming, existing)
    }

    /// First slot `incoming` can merge into.
    pub fn find_stackable_item(&self, incoming: &ItemStack) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|existing| self.can_stack(incoming, existing))
        })
    }

    fn stack_into(&mut self, index: usize, incoming: &mut ItemStack) -> u32 {
        match self.slots.get_mut(index).and_then(Option::as_mut) {
            Some(existing) => merge_into(existing, incoming),
            None => 0,
        }
    }

    /// Add `item`, merging into existing stacks first and placing the rest in
    /// the first empty slot. Afterwards `item` holds only what did not fit:
    /// nothing unless the outcome is [`AddOutcome::Rejected`].
    pub fn add_item(&mut self, item: &mut ItemStack) -> AddOutcome {
        while item.quantity() > 0 {
            if let Some(index) = self.find_stackable_item(item) {
                self.stack_into(index, item);
                self.emit_slot(index);
                continue;
            }

            let empty = if self.is_full() {
                None
            } else {
                self.find_empty_slot()
            };
            return match empty {
                Some(index) => {
                    self.slots[index] = Some(item.clone());
                    item.set_quantity(0);
                    self.emit_slot(index);
                    AddOutcome::Placed(index)
                }
                None => {
                    debug!(container = ?self.id, key = %item.key(), left = item.quantity(), "inventory full");
                    self.hooks.on_full(item);
                    self.emit(InventoryEvent::Full);
                    AddOutcome::Rejected
                }
            };
        }
        AddOutcome::Absorbed
    }

    /// Clear a slot, returning what it held. Invalid or empty slots are ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<ItemStack> {
        let removed = self.slots.get_mut(index)?.take()?;
        self.emit_slot(index);
        Some(removed)
    }

    /// Clear several slots.
    pub fn remove_many_by_index(&mut self, indexes: &[usize]) {
        for &index in indexes {
            self.remove_at(index);
        }
    }

    /// Clear the slots holding these records; unknown records are skipped.
    pub fn remove_many_by_object(&mut self, instances: &[InstanceId]) {
        for &instance in instances {
            if let Some(index) = self.find_item_index(instance) {
                self.remove_at(index);
            }
        }
    }

    /// Place `item` at `index`, or merge it into a stack already there.
    ///
    /// A merge reports success as soon as anything moved, even if `item`
    /// keeps a leftover. Different item types, a full stack or an invalid
    /// index fail. As with [`Inventory::add_item`], `item` is left holding
    /// whatever was not placed.
    pub fn add_at_index(&mut self, item: &mut ItemStack, index: usize) -> bool {
        let stackable = match self.slots.get(index) {
            None => return false,
            Some(None) => None,
            Some(Some(existing)) => Some(self.can_stack(item, existing)),
        };

        match stackable {
            Some(false) => false,
            Some(true) => {
                let moved = self.stack_into(index, item);
                if moved > 0 {
                    self.emit_slot(index);
                }
                moved > 0
            }
            None => {
                self.slots[index] = Some(item.clone());
                item.set_quantity(0);
                self.emit_slot(index);
                true
            }
        }
    }

    fn pair_mut(
        &mut self,
        a: usize,
        b: usize,
    ) -> (&mut Option<ItemStack>, &mut Option<ItemStack>) {
        debug_assert_ne!(a, b);
        if a < b {
            let (left, right) = self.slots.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.slots.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }

    fn valid_pair(&self, a: usize, b: usize) -> bool {
        a < self.slots.len() && b < self.slots.len() && a != b
    }

    /// Exchange two slots. Same-type stacks merge source into target instead
    /// while stacking is enabled; a source left with nothing is cleared.
    pub fn swap(&mut self, source: usize, target: usize) -> bool {
        if !self.valid_pair(source, target) || self.slots[source].is_none() {
            return false;
        }

        let merge = self.settings.stacking_enabled
            && matches!(
                (&self.slots[source], &self.slots[target]),
                (Some(a), Some(b)) if a.is_same_kind(b)
            );

        let (source_slot, target_slot) = self.pair_mut(source, target);
        if merge {
            if let (Some(incoming), Some(existing)) = (source_slot.as_mut(), target_slot.as_mut()) {
                merge_into(existing, incoming);
            }
            if source_slot.as_ref().is_some_and(ItemStack::is_empty) {
                *source_slot = None;
            }
        } else {
            std::mem::swap(source_slot, target_slot);
        }

        self.emit_slot(source);
        self.emit_slot(target);
        true
    }

    /// Move `amount` from `source` into `target`, which must be empty or hold
    /// the same item type (the latter only while stacking is enabled).
    pub fn split(&mut self, source: usize, target: usize, amount: u32) -> bool {
        if !self.valid_pair(source, target) || amount == 0 {
            return false;
        }
        let Some(available) = self.get(source).map(ItemStack::quantity) else {
            return false;
        };
        if available < amount {
            return false;
        }
        if let (Some(from), Some(to)) = (&self.slots[source], &self.slots[target]) {
            if !from.is_same_kind(to) || !self.settings.stacking_enabled {
                return false;
            }
        }

        let (source_slot, target_slot) = self.pair_mut(source, target);
        let Some(from) = source_slot.as_mut() else {
            return false;
        };
        let moved = if let Some(to) = target_slot.as_mut() {
            amount - to.add(amount)
        } else {
            *target_slot = Some(from.duplicate_with_quantity(amount));
            amount
        };
        if moved == 0 {
            return false;
        }

        from.remove(moved);
        if from.is_empty() {
            *source_slot = None;
        }

        self.emit_slot(source);
        self.emit_slot(target);
        true
    }

    /// Copy the record at `source` into `target` (at `target_index`, or
    /// anywhere). The source slot is cleared when the copy ended up in the
    /// target or was fully absorbed; otherwise the source keeps whatever the
    /// copy could not place.
    pub fn transfer_one(
        &mut self,
        target: &mut Inventory,
        source: usize,
        target_index: Option<usize>,
    ) -> bool {
        let Some(original) = self.get(source) else {
            return false;
        };
        let mut copy = original.duplicate();

        match target_index {
            Some(index) => {
                if !target.add_at_index(&mut copy, index) {
                    return false;
                }
            }
            None => {
                let _ = target.add_item(&mut copy);
            }
        }

        let in_target = target.find_item_index(copy.instance()).is_some();
        if in_target || copy.is_empty() {
            self.remove_at(source);
            return true;
        }

        debug!(
            from = ?self.id,
            to = ?target.id,
            source,
            remainder = copy.quantity(),
            "partial transfer"
        );
        if let Some(item) = self.slots[source].as_mut() {
            item.set_quantity(copy.quantity());
        }
        self.emit_slot(source);
        false
    }

    /// Transfer each index independently; returns the ones that failed.
    pub fn transfer_many_by_index(&mut self, target: &mut Inventory, indexes: &[usize]) -> Vec<usize> {
        indexes
            .iter()
            .copied()
            .filter(|&index| !self.transfer_one(target, index, None))
            .collect()
    }

    /// Transfer each record independently; returns the ones that failed.
    /// Records not in this container are skipped.
    pub fn transfer_many_by_object(
        &mut self,
        target: &mut Inventory,
        instances: &[InstanceId],
    ) -> Vec<InstanceId> {
        let mut failed = Vec::new();
        for &instance in instances {
            let Some(index) = self.find_item_index(instance) else {
                continue;
            };
            if !self.transfer_one(target, index, None) {
                failed.push(instance);
            }
        }
        failed
    }

    /// The container starts being used: let the strategy restore state, or
    /// fall back to the preset items / a fresh inventory.
    pub fn activate(&mut self, ctx: &mut SaveContext<'_>) -> Option<LoadSource> {
        let mut strategy = std::mem::take(&mut self.persistence);
        let loaded = strategy.on_activate(self, ctx);
        self.persistence = strategy;
        if loaded.is_some() {
            return loaded;
        }

        if self.is_empty() {
            self.create_new();
        } else {
            self.slots.resize(self.capacity, None);
            self.emit(InventoryEvent::Refreshed);
        }
        None
    }

    /// The container stops being used.
    pub fn deactivate(&mut self, reason: DeactivationReason, ctx: &mut SaveContext<'_>) {
        let mut strategy = std::mem::take(&mut self.persistence);
        strategy.on_deactivate(self, reason, ctx);
        self.persistence = strategy;
    }

    /// Save now through the strategy's save-id, regardless of its kind.
    pub fn save_to(&mut self, target: SaveTarget, ctx: &mut SaveContext<'_>) -> bool {
        let mut strategy = std::mem::take(&mut self.persistence);
        let saved = strategy.save(target, self, ctx);
        self.persistence = strategy;
        saved
    }

    /// Load now through the strategy's save-id, regardless of its kind.
    pub fn load_from(&mut self, target: SaveTarget, ctx: &mut SaveContext<'_>) -> bool {
        let mut strategy = std::mem::take(&mut self.persistence);
        let loaded = strategy.load(target, self, ctx);
        self.persistence = strategy;
        loaded
    }

    pub(crate) fn snapshot(&self) -> SavePayload {
        SavePayload {
            capacity: self.capacity,
            slots: self.slots.clone(),
        }
    }

    pub(crate) fn restore(&mut self, payload: SavePayload) {
        self.capacity = payload.capacity.max(1);
        self.slots = payload.slots;
        for item in self.slots.iter_mut().flatten() {
            *item = item.duplicate();
            let max = item.max_quantity();
            item.set_max_quantity(max);
        }
        if self.slots.len() != self.capacity {
            self.slots.resize(self.capacity, None);
        }
        self.emit(InventoryEvent::Refreshed);
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(5)
    }
}

impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("slots", &self.slots)
            .field("owner", &self.owner)
            .field("persistence", &self.persistence)
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use satchel_core::ItemKey;

    fn stack(key: &str, quantity: u32, max: u32) -> ItemStack {
        ItemStack::new(ItemKey::parse(key).unwrap(), quantity, max)
    }

    fn quantity(inv: &Inventory, index: usize) -> Option<u32> {
        inv.get(index).map(ItemStack::quantity)
    }

    fn record(inv: &mut Inventory) -> Arc<Mutex<Vec<InventoryEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        inv.subscribe(move |event| sink.lock().push(event.clone()));
        log
    }

    #[test]
    fn create_new_resets_slots() {
        let mut inv = Inventory::new(3).with_items(vec![Some(stack("apple", 1, 10))]);
        assert_eq!(inv.len(), 3);
        assert_eq!(inv.occupied(), 1);

        let events = record(&mut inv);
        inv.create_new();
        assert!(inv.is_empty());
        assert_eq!(inv.len(), 3);
        assert_eq!(*events.lock(), vec![InventoryEvent::Refreshed]);
    }

    #[test]
    fn set_capacity_resizes_and_notifies_on_change() {
        let mut inv = Inventory::new(5);
        let events = record(&mut inv);

        inv.set_capacity(0);
        assert_eq!(inv.capacity(), 5);
        inv.set_capacity(5);
        assert!(events.lock().is_empty());

        inv.set_capacity(8);
        assert_eq!(inv.len(), 8);
        inv.set_capacity(2);
        assert_eq!(inv.len(), 2);
        assert_eq!(events.lock().len(), 2);
    }

    #[test]
    fn add_item_places_in_first_slot() {
        let mut inv = Inventory::new(5);
        let mut apples = stack("apple", 5, 10);

        assert_eq!(inv.add_item(&mut apples), AddOutcome::Placed(0));
        assert_eq!(quantity(&inv, 0), Some(5));
        assert_eq!(apples.quantity(), 0);
        assert_eq!(inv.find_item_index(apples.instance()), Some(0));
        assert_eq!(inv.find_empty_slot(), Some(1));
    }

    #[test]
    fn add_item_merges_exact_fit() {
        let mut inv = Inventory::new(5);
        let _ = inv.add_item(&mut stack("apple", 5, 10));
        let mut more = stack("apple", 5, 10);

        assert_eq!(inv.add_item(&mut more), AddOutcome::Absorbed);
        assert_eq!(quantity(&inv, 0), Some(10));
        assert_eq!(more.quantity(), 0);
        assert_eq!(inv.occupied(), 1);
    }

    #[test]
    fn add_item_overflows_into_new_slot() {
        let mut inv = Inventory::new(5);
        let _ = inv.add_item(&mut stack("apple", 6, 10));
        let mut more = stack("apple", 6, 10);

        assert_eq!(inv.add_item(&mut more), AddOutcome::Placed(1));
        assert_eq!(quantity(&inv, 0), Some(10));
        assert_eq!(quantity(&inv, 1), Some(2));
        assert_eq!(more.quantity(), 0);
    }

    #[test]
    fn add_item_spreads_over_several_stacks() {
        let mut inv = Inventory::new(4).with_items(vec![
            Some(stack("apple", 8, 10)),
            Some(stack("pear", 1, 10)),
            Some(stack("apple", 7, 10)),
        ]);
        let events = record(&mut inv);
        let mut incoming = stack("apple", 9, 10);

        assert_eq!(inv.add_item(&mut incoming), AddOutcome::Placed(3));
        assert_eq!(quantity(&inv, 0), Some(10));
        assert_eq!(quantity(&inv, 2), Some(10));
        assert_eq!(quantity(&inv, 3), Some(4));

        let indexes: Vec<usize> = events
            .lock()
            .iter()
            .filter_map(|event| match event {
                InventoryEvent::ItemUpdated { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indexes, vec![0, 2, 3]);
    }

    #[test]
    fn add_item_rejects_when_full_and_keeps_remainder() {
        struct CountFull(Arc<Mutex<u32>>);
        impl InventoryHooks for CountFull {
            fn on_full(&mut self, rejected: &ItemStack) {
                *self.0.lock() += rejected.quantity();
            }
        }

        let unplaced = Arc::new(Mutex::new(0));
        let mut inv = Inventory::new(1)
            .with_items(vec![Some(stack("apple", 8, 10))])
            .with_hooks(CountFull(Arc::clone(&unplaced)));
        let events = record(&mut inv);
        let mut incoming = stack("apple", 5, 10);

        let outcome = inv.add_item(&mut incoming);
        assert!(outcome.is_rejected());
        assert_eq!(incoming.quantity(), 3);
        assert_eq!(quantity(&inv, 0), Some(10));
        assert_eq!(*unplaced.lock(), 3);
        assert_eq!(events.lock().last(), Some(&InventoryEvent::Full));
    }

    #[test]
    fn add_item_with_nothing_is_absorbed() {
        let mut inv = Inventory::new(2);
        let mut empty = stack("apple", 0, 10);
        assert_eq!(inv.add_item(&mut empty), AddOutcome::Absorbed);
        assert!(inv.is_empty());
    }

    #[test]
    fn stacking_respects_hooks_and_settings() {
        struct NoStacking;
        impl InventoryHooks for NoStacking {
            fn can_stack(&self, _: &ItemStack, _: &ItemStack) -> bool {
                false
            }
        }

        let mut inv = Inventory::new(3).with_hooks(NoStacking);
        let _ = inv.add_item(&mut stack("apple", 1, 10));
        assert_eq!(inv.add_item(&mut stack("apple", 1, 10)), AddOutcome::Placed(1));

        let settings = Arc::new(InventorySettings {
            stacking_enabled: false,
            ..InventorySettings::default()
        });
        let mut inv = Inventory::with_settings(3, settings);
        let _ = inv.add_item(&mut stack("apple", 1, 10));
        assert!(inv.find_stackable_item(&stack("apple", 1, 10)).is_none());
    }

    #[test]
    fn can_stack_requires_room_and_same_kind() {
        let inv = Inventory::new(1);
        let full = stack("apple", 10, 10);
        let partial = stack("apple", 3, 10);
        let pear = stack("pear", 3, 10);

        assert!(!inv.can_stack(&partial, &full));
        assert!(inv.can_stack(&full, &partial));
        assert!(!inv.can_stack(&pear, &partial));
    }

    #[test]
    fn is_full_tracks_empty_slots() {
        let mut inv = Inventory::new(2);
        assert!(!inv.is_full());
        let _ = inv.add_item(&mut stack("apple", 1, 1));
        let _ = inv.add_item(&mut stack("apple", 1, 1));
        assert!(inv.is_full());
        assert_eq!(inv.find_empty_slot(), None);

        inv.set_capacity(1);
        assert!(inv.is_full());
        assert_eq!(inv.find_empty_slot(), None);

        inv.set_capacity(3);
        assert!(!inv.is_full());
    }

    #[test]
    fn remove_variants_clear_slots() {
        let a = stack("apple", 1, 10);
        let b = stack("pear", 1, 10);
        let c = stack("plum", 1, 10);
        let mut inv = Inventory::new(4).with_items(vec![
            Some(a.clone()),
            Some(b.clone()),
            Some(c.clone()),
        ]);
        let events = record(&mut inv);

        assert!(inv.remove_at(9).is_none());
        assert!(inv.remove_at(3).is_none());
        assert!(events.lock().is_empty());

        assert_eq!(inv.remove_at(0).map(|item| item.instance()), Some(a.instance()));
        assert_eq!(
            events.lock().as_slice(),
            &[InventoryEvent::ItemUpdated { index: 0, item: None }]
        );

        let unknown = stack("apple", 1, 10);
        inv.remove_many_by_object(&[b.instance(), unknown.instance()]);
        assert_eq!(inv.find_item_index(b.instance()), None);

        inv.remove_many_by_index(&[2, 2, 7]);
        assert!(inv.is_empty());
        assert_eq!(events.lock().len(), 3);
    }

    #[test]
    fn add_at_index_places_or_merges() {
        let mut inv = Inventory::new(5);
        let mut sword = stack("sword", 1, 1);
        assert!(inv.add_at_index(&mut sword, 2));
        assert_eq!(sword.quantity(), 0);
        assert!(inv.get(0).is_none());
        assert_eq!(inv.find_item_index(sword.instance()), Some(2));

        assert!(!inv.add_at_index(&mut stack("shield", 1, 1), 2));
        assert!(!inv.add_at_index(&mut stack("sword", 1, 1), 2));
        assert!(!inv.add_at_index(&mut stack("sword", 1, 1), 5));
    }

    #[test]
    fn add_at_index_partial_merge_still_succeeds() {
        let mut inv = Inventory::new(2).with_items(vec![Some(stack("apple", 8, 10))]);
        let mut incoming = stack("apple", 5, 10);

        assert!(inv.add_at_index(&mut incoming, 0));
        assert_eq!(quantity(&inv, 0), Some(10));
        assert_eq!(incoming.quantity(), 3);
    }

    #[test]
    fn swap_exchanges_different_items() {
        let mut inv = Inventory::new(3).with_items(vec![
            Some(stack("apple", 10, 10)),
            None,
            Some(stack("sword", 1, 1)),
        ]);
        let events = record(&mut inv);

        assert!(inv.swap(0, 2));
        assert_eq!(inv.get(0).map(|i| i.key().path()), Some("sword"));
        assert_eq!(inv.get(2).map(|i| i.key().path()), Some("apple"));
        assert_eq!(events.lock().len(), 2);

        assert!(inv.swap(0, 1));
        assert!(inv.get(0).is_none());
        assert_eq!(inv.get(1).map(|i| i.key().path()), Some("sword"));
    }

    #[test]
    fn swap_rejects_bad_arguments() {
        let mut inv = Inventory::new(2).with_items(vec![None, Some(stack("apple", 1, 10))]);
        assert!(!inv.swap(0, 0));
        assert!(!inv.swap(0, 4));
        assert!(!inv.swap(0, 1));
    }

    #[test]
    fn swap_same_kind_merges_one_way() {
        let mut inv = Inventory::new(2).with_items(vec![
            Some(stack("apple", 4, 10)),
            Some(stack("apple", 3, 10)),
        ]);
        assert!(inv.swap(0, 1));
        assert!(inv.get(0).is_none());
        assert_eq!(quantity(&inv, 1), Some(7));

        let mut inv = Inventory::new(2).with_items(vec![
            Some(stack("apple", 6, 10)),
            Some(stack("apple", 8, 10)),
        ]);
        assert!(inv.swap(0, 1));
        assert_eq!(quantity(&inv, 0), Some(4));
        assert_eq!(quantity(&inv, 1), Some(10));
    }

    #[test]
    fn disabled_stacking_blocks_swap_and_split_merges() {
        let settings = Arc::new(InventorySettings {
            stacking_enabled: false,
            ..InventorySettings::default()
        });
        let mut inv = Inventory::with_settings(3, settings).with_items(vec![
            Some(stack("apple", 4, 10)),
            Some(stack("apple", 3, 10)),
            Some(stack("apple", 2, 10)),
        ]);

        assert!(inv.swap(0, 1));
        assert_eq!(quantity(&inv, 0), Some(3));
        assert_eq!(quantity(&inv, 1), Some(4));

        assert!(!inv.split(2, 1, 1));
        assert_eq!(quantity(&inv, 1), Some(4));
        assert_eq!(quantity(&inv, 2), Some(2));

        inv.remove_at(1);
        assert!(inv.split(2, 1, 1));
        assert_eq!(quantity(&inv, 1), Some(1));
        assert_eq!(quantity(&inv, 2), Some(1));
    }

    #[test]
    fn split_into_empty_then_existing() {
        let mut inv = Inventory::new(3).with_items(vec![Some(stack("apple", 10, 20))]);
        let source_instance = inv.get(0).map(ItemStack::instance);

        assert!(inv.split(0, 1, 5));
        assert_eq!(quantity(&inv, 0), Some(5));
        assert_eq!(quantity(&inv, 1), Some(5));
        assert_ne!(inv.get(1).map(ItemStack::instance), source_instance);

        assert!(inv.split(0, 1, 3));
        assert_eq!(quantity(&inv, 0), Some(2));
        assert_eq!(quantity(&inv, 1), Some(8));

        assert!(inv.split(0, 1, 2));
        assert!(inv.get(0).is_none());
        assert_eq!(quantity(&inv, 1), Some(10));
    }

    #[test]
    fn split_rejects_invalid_requests() {
        let mut inv = Inventory::new(4).with_items(vec![
            Some(stack("apple", 5, 10)),
            Some(stack("pear", 1, 10)),
            Some(stack("apple", 10, 10)),
        ]);
        assert!(!inv.split(0, 0, 1));
        assert!(!inv.split(0, 9, 1));
        assert!(!inv.split(3, 0, 1));
        assert!(!inv.split(0, 3, 0));
        assert!(!inv.split(0, 3, 6));
        assert!(!inv.split(0, 1, 1));
        // target stack already full: nothing moves, source untouched
        assert!(!inv.split(0, 2, 2));
        assert_eq!(quantity(&inv, 0), Some(5));
    }

    #[test]
    fn transfer_one_moves_whole_stack() {
        let mut source = Inventory::new(3).with_items(vec![Some(stack("apple", 10, 10))]);
        let mut target = Inventory::new(1);
        let original = source.get(0).map(ItemStack::instance);

        assert!(source.transfer_one(&mut target, 0, None));
        assert!(source.get(0).is_none());
        assert_eq!(quantity(&target, 0), Some(10));
        assert_ne!(target.get(0).map(ItemStack::instance), original);
    }

    #[test]
    fn transfer_one_partial_keeps_remainder() {
        let mut source = Inventory::new(3).with_items(vec![Some(stack("apple", 10, 10))]);
        let mut target = Inventory::new(1).with_items(vec![Some(stack("apple", 5, 10))]);
        let events = record(&mut source);

        assert!(!source.transfer_one(&mut target, 0, None));
        assert_eq!(quantity(&source, 0), Some(5));
        assert_eq!(quantity(&target, 0), Some(10));
        assert!(matches!(
            events.lock().last(),
            Some(InventoryEvent::ItemUpdated { index: 0, item: Some(_) })
        ));
    }

    #[test]
    fn transfer_one_to_index() {
        let mut source = Inventory::new(2).with_items(vec![
            Some(stack("apple", 4, 10)),
            Some(stack("apple", 6, 10)),
        ]);
        let mut target = Inventory::new(3).with_items(vec![None, Some(stack("apple", 8, 10))]);

        assert!(source.transfer_one(&mut target, 0, Some(2)));
        assert_eq!(quantity(&target, 2), Some(4));
        assert!(source.get(0).is_none());

        // merge onto slot 1 takes 2 of 6; the copy is not in the target and
        // not drained, so the source keeps 4
        assert!(!source.transfer_one(&mut target, 1, Some(1)));
        assert_eq!(quantity(&target, 1), Some(10));
        assert_eq!(quantity(&source, 1), Some(4));

        assert!(!source.transfer_one(&mut target, 1, Some(9)));
        assert!(!source.transfer_one(&mut target, 0, None));
    }

    #[test]
    fn transfer_many_reports_failures_in_order() {
        let mut source = Inventory::new(4).with_items(vec![
            Some(stack("apple", 3, 10)),
            Some(stack("sword", 1, 1)),
            None,
            Some(stack("shield", 1, 1)),
        ]);
        let mut target = Inventory::new(2).with_items(vec![Some(stack("apple", 9, 10))]);

        let failed = source.transfer_many_by_index(&mut target, &[0, 2, 1, 3]);
        // apple: 1 merges, 2 placed in slot 1 -> success
        // 2: empty -> failure; sword: target full -> failure; shield: failure
        assert_eq!(failed, vec![2, 1, 3]);
        assert!(source.get(0).is_none());
        assert_eq!(quantity(&target, 1), Some(2));
    }

    #[test]
    fn transfer_many_by_object_skips_unknown() {
        let sword = stack("sword", 1, 1);
        let shield = stack("shield", 1, 1);
        let stranger = stack("plum", 1, 1);
        let mut source = Inventory::new(2).with_items(vec![Some(sword.clone()), Some(shield.clone())]);
        let mut target = Inventory::new(1);

        let failed = source.transfer_many_by_object(
            &mut target,
            &[stranger.instance(), sword.instance(), shield.instance()],
        );
        assert_eq!(failed, vec![shield.instance()]);
        assert_eq!(source.find_item_index(sword.instance()), None);
        assert_eq!(source.find_item_index(shield.instance()), Some(1));
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let inv = Inventory::new(4).with_items(vec![
            Some(stack("apple", 3, 10)),
            None,
            Some(stack("sword", 1, 1)),
        ]);
        let payload = inv.snapshot();
        let saved_apple = inv.get(0).map(ItemStack::instance);

        let mut fresh = Inventory::new(1);
        let events = record(&mut fresh);
        fresh.restore(payload);

        assert_eq!(fresh.capacity(), 4);
        assert_eq!(fresh.len(), 4);
        assert_eq!(quantity(&fresh, 0), Some(3));
        assert!(fresh.get(1).is_none());
        assert_eq!(fresh.get(2).map(|i| i.key().path()), Some("sword"));
        assert_ne!(fresh.get(0).map(ItemStack::instance), saved_apple);
        assert_eq!(inv.find_item_index(fresh.get(0).map(ItemStack::instance).unwrap()), None);
        assert_eq!(*events.lock(), vec![InventoryEvent::Refreshed]);
    }

    #[test]
    fn restore_enforces_length() {
        let mut inv = Inventory::new(2);
        inv.restore(SavePayload {
            capacity: 3,
            slots: vec![Some(stack("apple", 1, 10))],
        });
        assert_eq!(inv.len(), 3);

        inv.restore(SavePayload {
            capacity: 0,
            slots: Vec::new(),
        });
        assert_eq!(inv.capacity(), 1);
        assert_eq!(inv.len(), 1);
    }
}
