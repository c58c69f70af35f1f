use satchel_core::ItemStack;
use serde::{Deserialize, Serialize};

use crate::container::Inventory;

/// Everything needed to rebuild a container's contents.
///
/// Item instance ids are not part of the payload; restored records get
/// fresh ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    /// Slot count at capture time.
    pub capacity: usize,
    /// Slot contents, `None` for empty slots.
    pub slots: Vec<Option<ItemStack>>,
}

impl SavePayload {
    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Sum of quantities over all records.
    pub fn total_quantity(&self) -> u64 {
        self.slots
            .iter()
            .flatten()
            .map(|item| u64::from(item.quantity()))
            .sum()
    }
}

/// Take an owned snapshot of `inventory`. The snapshot can outlive any lock
/// on the container and be written later.
pub fn capture(inventory: &Inventory) -> SavePayload {
    inventory.snapshot()
}

/// Replace `inventory`'s contents with `payload` and emit `Refreshed`.
pub fn apply(inventory: &mut Inventory, payload: SavePayload) {
    inventory.restore(payload);
}
