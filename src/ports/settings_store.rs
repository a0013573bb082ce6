//! Key-value storage port for persisted preferences.

use crate::error::GenerationError;

/// A string-keyed, string-valued persistent store.
///
/// Values are opaque to the store; structured values are serialized by the
/// caller.
pub trait KeyValueStore {
    /// Read a value. Missing keys yield `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, persisting it immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), GenerationError>;
}
