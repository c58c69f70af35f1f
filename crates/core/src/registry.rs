//! Namespaced item keys.
//!
//! An [`ItemKey`] is the type identity of an item: two stacks can merge only
//! when their keys are equal. Keys are stable string identifiers of the form
//! `namespace:path` (e.g., `satchel:apple`) so they survive persistence and
//! sort deterministically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "satchel";

/// Error returned when parsing an invalid [`ItemKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid item key `{input}`: {reason}")]
pub struct ItemKeyError {
    input: String,
    reason: &'static str,
}

impl ItemKeyError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }

    /// Why the key was rejected.
    pub fn reason(&self) -> &str {
        self.reason
    }
}

/// Item type identity of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemKey {
    namespace: String,
    path: String,
}

impl ItemKey {
    /// Parse `namespace:path`, or a bare `path` in [`DEFAULT_NAMESPACE`].
    pub fn parse(input: &str) -> Result<Self, ItemKeyError> {
        let trimmed = input.trim();
        let (namespace, path) = trimmed
            .split_once(':')
            .unwrap_or((DEFAULT_NAMESPACE, trimmed));

        if namespace.is_empty() || path.is_empty() {
            return Err(ItemKeyError::new(input, "namespace and path must be non-empty"));
        }
        if !namespace.bytes().all(|b| is_key_byte(b, false)) {
            return Err(ItemKeyError::new(input, "namespace allows only a-z0-9_.-"));
        }
        if !path.bytes().all(|b| is_key_byte(b, true)) {
            return Err(ItemKeyError::new(input, "path allows only a-z0-9_./-"));
        }

        Ok(Self {
            namespace: namespace.to_owned(),
            path: path.to_owned(),
        })
    }

    /// Key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_key_byte(b: u8, in_path: bool) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.') || (in_path && b == b'/')
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ItemKey {
    type Err = ItemKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemKey {
    type Error = ItemKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemKey> for String {
    fn from(key: ItemKey) -> Self {
        key.to_string()
    }
}
