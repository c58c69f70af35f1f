use lru::LruCache;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use super::error::PersistError;
use super::payload::SavePayload;
use super::store::SaveStore;

/// Process-lifetime save store.
///
/// Entries live in a `BTreeMap` so listings are key ordered. An optional bound
/// evicts the least recently used slot once exceeded.
pub struct MemoryStore {
    entries: BTreeMap<String, SavePayload>,
    lru: Option<LruCache<String, ()>>,
}

impl MemoryStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            lru: None,
        }
    }

    /// Store holding at most `capacity` slots (at least 1).
    pub fn bounded(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: BTreeMap::new(),
            lru: Some(LruCache::new(cap)),
        }
    }

    /// Number of stored slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored slot names in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Insert or replace a payload.
    pub fn insert(&mut self, key: &str, payload: SavePayload) {
        if !self.entries.contains_key(key) {
            self.evict_if_needed();
        }
        self.entries.insert(key.to_owned(), payload);
        self.touch(key);
    }

    /// Copy of the payload under `key`, marking it recently used.
    pub fn get(&mut self, key: &str) -> Option<SavePayload> {
        let payload = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(payload)
    }

    /// Remove and return the payload under `key`.
    pub fn take(&mut self, key: &str) -> Option<SavePayload> {
        if let Some(lru) = self.lru.as_mut() {
            lru.pop(key);
        }
        self.entries.remove(key)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(lru) = self.lru.as_mut() {
            lru.clear();
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(lru) = self.lru.as_mut() {
            lru.put(key.to_owned(), ());
        }
    }

    fn evict_if_needed(&mut self) {
        let Some(lru) = self.lru.as_mut() else {
            return;
        };
        while self.entries.len() >= lru.cap().get() {
            match lru.pop_lru() {
                Some((oldest, _)) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("slots", &self.entries.keys().collect::<Vec<_>>())
            .field("bound", &self.lru.as_ref().map(|lru| lru.cap().get()))
            .finish()
    }
}

impl SaveStore for MemoryStore {
    fn store(&mut self, key: &str, payload: &SavePayload) -> Result<(), PersistError> {
        self.insert(key, payload.clone());
        Ok(())
    }

    fn retrieve(&mut self, key: &str) -> Result<Option<SavePayload>, PersistError> {
        Ok(self.get(key))
    }

    fn remove(&mut self, key: &str) -> Result<bool, PersistError> {
        Ok(self.take(key).is_some())
    }

    fn clear_all(&mut self) -> Result<(), PersistError> {
        self.clear();
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(capacity: usize) -> SavePayload {
        SavePayload {
            capacity,
            slots: vec![None; capacity],
        }
    }

    #[test]
    fn store_retrieve_remove() {
        let mut store = MemoryStore::new();
        store.store("Inv_chest", &payload(3)).unwrap();
        assert!(store.contains("Inv_chest"));
        assert_eq!(store.retrieve("Inv_chest").unwrap(), Some(payload(3)));
        assert_eq!(store.retrieve("missing").unwrap(), None);

        assert!(store.remove("Inv_chest").unwrap());
        assert!(!store.remove("Inv_chest").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn overwrite_replaces_payload() {
        let mut store = MemoryStore::new();
        store.insert("slot", payload(1));
        store.insert("slot", payload(4));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("slot").map(|p| p.capacity), Some(4));
    }

    #[test]
    fn keys_are_ordered() {
        let mut store = MemoryStore::new();
        for key in ["b", "c", "a"] {
            store.insert(key, payload(1));
        }
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        store.clear_all().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn bounded_store_evicts_least_recent() {
        let mut store = MemoryStore::bounded(2);
        store.insert("a", payload(1));
        store.insert("b", payload(1));
        // touching "a" makes "b" the eviction candidate
        assert!(store.get("a").is_some());
        store.insert("c", payload(1));

        assert_eq!(store.len(), 2);
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
        assert!(store.contains("c"));

        // replacing an existing key never evicts
        store.insert("c", payload(2));
        assert_eq!(store.len(), 2);
        assert!(store.contains("a"));
    }
}
