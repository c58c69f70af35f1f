//! Save-id derivation from a container's owner.

/// Whoever holds a container. Only used to derive a save-id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    /// Display name of the owning entity.
    pub name: String,
    /// Index of the local player controlling the owner, if any.
    pub local_player: Option<u32>,
}

impl Owner {
    /// Owner with no player attached.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_player: None,
        }
    }

    /// Owner controlled by local player `index`.
    pub fn local_player(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            local_player: Some(index),
        }
    }
}

/// Derives a save-id from the owner when none was given explicitly.
pub trait SaveIdPolicy: Send {
    /// Save-id for `owner`, or `None` when no id can be derived.
    fn resolve(&self, owner: Option<&Owner>) -> Option<String>;
}

/// `PlayerInv_Local_{index}` for player-controlled owners, `Inv_{name}`
/// otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSaveIdPolicy;

impl SaveIdPolicy for DefaultSaveIdPolicy {
    fn resolve(&self, owner: Option<&Owner>) -> Option<String> {
        let owner = owner?;
        match owner.local_player {
            Some(index) => Some(format!("PlayerInv_Local_{index}")),
            None if owner.name.is_empty() => None,
            None => Some(format!("Inv_{}", owner.name)),
        }
    }
}
