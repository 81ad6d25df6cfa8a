//! Cache store trait.

use async_trait::async_trait;

use crate::error::CacheResult;

/// Key-value store with a fixed TTL per instance.
///
/// Implementations must be safe for concurrent `set`/`get`/`delete` from any
/// number of tasks. There is no ordering guarantee between concurrent
/// writers, but per-key writes linearize.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Inserts or replaces an entry. The entry expires one TTL after the
    /// write completes.
    async fn set(&self, key: &str, value: Vec<u8>) -> CacheResult<()>;

    /// Gets an entry.
    ///
    /// Returns `None` when the key does not exist or the entry has expired;
    /// the two cases are indistinguishable.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Gets and deletes an entry in one step.
    ///
    /// Used for consume-once blobs: pending authentication requests and
    /// artifacts must not be replayable.
    async fn take(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Deletes an entry. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;
}
