//! Caller-supplied policy hooks.

use satchel_core::ItemStack;

/// Extension points a container consults while placing items.
///
/// Both methods have defaults, so implementors only override what they need.
pub trait InventoryHooks: Send {
    /// Extra stacking condition checked after the built-in ones (same key,
    /// room left). Defaults to always allowing the merge.
    fn can_stack(&self, _incoming: &ItemStack, _existing: &ItemStack) -> bool {
        true
    }

    /// Called when an add is rejected for lack of space. `rejected` still
    /// holds the quantity that could not be placed.
    fn on_full(&mut self, _rejected: &ItemStack) {}
}

/// Hooks with every default in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl InventoryHooks for DefaultHooks {}
