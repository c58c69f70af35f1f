use super::error::PersistError;
use super::payload::SavePayload;

/// Keyed storage for save payloads.
///
/// Implemented once for process memory and once for the filesystem.
pub trait SaveStore {
    /// Store `payload` under `key`, replacing any previous value.
    fn store(&mut self, key: &str, payload: &SavePayload) -> Result<(), PersistError>;

    /// Fetch the payload under `key`.
    fn retrieve(&mut self, key: &str) -> Result<Option<SavePayload>, PersistError>;

    /// Drop the payload under `key`. Returns whether anything was removed.
    fn remove(&mut self, key: &str) -> Result<bool, PersistError>;

    /// Drop every payload.
    fn clear_all(&mut self) -> Result<(), PersistError>;

    /// Whether a payload exists under `key`.
    fn contains(&self, key: &str) -> bool;
}
