//! Durable key-value storage.

use crate::error::Result;
use async_trait::async_trait;

/// Key under which the serialized session credential is persisted.
pub const SESSION_TOKEN_KEY: &str = "token";

/// Durable string storage that survives process restarts.
///
/// The session layer only ever touches [`SESSION_TOKEN_KEY`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never set or was removed.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
