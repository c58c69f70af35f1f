//! Change notifications broadcast by a container.
//!
//! Subscribers are plain callbacks kept in subscription order. Every
//! `subscribe` hands back a [`SubscriptionId`] that must be passed to
//! `unsubscribe` when the listener goes away; nothing is cleaned up
//! implicitly.

use satchel_core::ItemStack;
use std::fmt;

/// Notification emitted after a container changes.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    /// A slot changed; `item` is the slot's new content.
    ItemUpdated {
        /// Slot index.
        index: usize,
        /// New slot content (`None` = cleared).
        item: Option<ItemStack>,
    },
    /// An add was rejected because no slot was free.
    Full,
    /// The whole slot array changed (resize, reset, restore).
    Refreshed,
    /// State was restored from a save store.
    Loaded,
    /// State was written to a save store.
    Saved,
}

impl InventoryEvent {
    /// Short label used in logs and recordings.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ItemUpdated { .. } => "item_updated",
            Self::Full => "full",
            Self::Refreshed => "refreshed",
            Self::Loaded => "loaded",
            Self::Saved => "saved",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&InventoryEvent) + Send>;

/// Ordered list of subscriber callbacks.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&InventoryEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True when nobody listens.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver `event` to every subscriber in subscription order.
    pub fn emit(&mut self, event: InventoryEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn delivers_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Arc::clone(&log);
        bus.subscribe(move |event| first.lock().push(format!("a:{}", event.kind())));
        let second = Arc::clone(&log);
        bus.subscribe(move |event| second.lock().push(format!("b:{}", event.kind())));

        bus.emit(InventoryEvent::Full);
        assert_eq!(*log.lock(), vec!["a:full", "b:full"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let counter = Arc::clone(&count);
        let id = bus.subscribe(move |_| *counter.lock() += 1);

        bus.emit(InventoryEvent::Refreshed);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(InventoryEvent::Refreshed);

        assert_eq!(*count.lock(), 1);
        assert!(bus.is_empty());
    }
}
