//! Containers shared between threads.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use crate::container::{ContainerId, Inventory};
use crate::persist::{capture, SavePayload};

/// Cloneable handle to a container behind a mutex.
#[derive(Clone)]
pub struct SharedInventory {
    id: ContainerId,
    inner: Arc<Mutex<Inventory>>,
}

impl SharedInventory {
    /// Wrap `inventory`.
    pub fn new(inventory: Inventory) -> Self {
        Self {
            id: inventory.id(),
            inner: Arc::new(Mutex::new(inventory)),
        }
    }

    /// Identity of the wrapped container.
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Lock the container.
    pub fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inner.lock()
    }

    /// Owned snapshot, taken under the lock and usable after it is released.
    pub fn snapshot(&self) -> SavePayload {
        capture(&self.lock())
    }

    /// Transfer `indexes` into `target`; see [`transfer_between`].
    pub fn transfer_to(&self, target: &SharedInventory, indexes: &[usize]) -> Vec<usize> {
        transfer_between(self, target, indexes)
    }
}

impl std::fmt::Debug for SharedInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedInventory").field("id", &self.id).finish()
    }
}

/// Transfer slots between two shared containers, returning the indexes that
/// failed. Both locks are taken in ascending [`ContainerId`] order. Transfers
/// within one container fail for every index.
pub fn transfer_between(
    source: &SharedInventory,
    target: &SharedInventory,
    indexes: &[usize],
) -> Vec<usize> {
    if source.id == target.id {
        return indexes.to_vec();
    }

    let (mut from, mut to) = if source.id < target.id {
        let from = source.lock();
        let to = target.lock();
        (from, to)
    } else {
        let to = target.lock();
        let from = source.lock();
        (from, to)
    };
    from.transfer_many_by_index(&mut to, indexes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::{ItemKey, ItemStack};
    use std::thread;

    fn swords(count: usize) -> Inventory {
        let items = (0..count)
            .map(|_| Some(ItemStack::new(ItemKey::parse("sword").unwrap(), 1, 1)))
            .collect();
        Inventory::new(count * 2).with_items(items)
    }

    #[test]
    fn same_container_fails_every_index() {
        let shared = SharedInventory::new(swords(2));
        let clone = shared.clone();
        assert_eq!(transfer_between(&shared, &clone, &[0, 1]), vec![0, 1]);
        assert_eq!(shared.lock().occupied(), 2);
    }

    #[test]
    fn moves_items_between_handles() {
        let a = SharedInventory::new(swords(2));
        let b = SharedInventory::new(Inventory::new(4));
        assert!(a.transfer_to(&b, &[0, 1]).is_empty());
        assert_eq!(a.snapshot().occupied(), 0);
        assert_eq!(b.snapshot().occupied(), 2);
    }

    #[test]
    fn opposite_transfers_do_not_deadlock() {
        let a = SharedInventory::new(swords(8));
        let b = SharedInventory::new(swords(8));

        let forward = {
            let (a, b) = (a.clone(), b.clone());
            thread::spawn(move || {
                for _ in 0..200 {
                    a.transfer_to(&b, &[0, 1, 2, 3]);
                }
            })
        };
        let backward = {
            let (a, b) = (a.clone(), b.clone());
            thread::spawn(move || {
                for _ in 0..200 {
                    b.transfer_to(&a, &[0, 1, 2, 3]);
                }
            })
        };
        forward.join().unwrap();
        backward.join().unwrap();

        assert_eq!(a.snapshot().occupied() + b.snapshot().occupied(), 16);
    }
}
