use parking_lot::Mutex;
use satchel_inventory::{Inventory, InventoryEvent, SubscriptionId};
use std::sync::Arc;

/// Collects every event a container emits.
///
/// Clones share the same buffer, so one recorder can watch several
/// containers.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<InventoryEvent>>>,
}

impl EventRecorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `inventory`.
    pub fn attach(&self, inventory: &mut Inventory) -> SubscriptionId {
        let events = Arc::clone(&self.events);
        inventory.subscribe(move |event| events.lock().push(event.clone()))
    }

    /// Unsubscribe from `inventory`.
    pub fn detach(&self, inventory: &mut Inventory, id: SubscriptionId) -> bool {
        inventory.unsubscribe(id)
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<InventoryEvent> {
        self.events.lock().clone()
    }

    /// Event labels in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(InventoryEvent::kind).collect()
    }

    /// Slot indexes of `ItemUpdated` events in order.
    pub fn updated_indexes(&self) -> Vec<usize> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                InventoryEvent::ItemUpdated { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}
