//! Saving and restoring container state.
//!
//! A [`PersistenceStrategy`] reacts to container lifecycle transitions and
//! moves [`SavePayload`] snapshots in and out of a [`MemoryStore`] and/or a
//! [`DiskStore`], both reached through the [`SaveStore`] contract.

mod disk;
mod error;
mod memory;
mod payload;
mod save_id;
mod store;
mod strategy;

pub use disk::{decode_save, encode_save, DiskStore};
pub use error::PersistError;
pub use memory::MemoryStore;
pub use payload::{apply, capture, SavePayload};
pub use save_id::{DefaultSaveIdPolicy, Owner, SaveIdPolicy};
pub use store::SaveStore;
pub use strategy::{
    DeactivationReason, LoadSource, PersistenceStrategy, SaveContext, SaveTarget, StrategyKind,
    DEFAULT_SAVE_CLASS,
};
