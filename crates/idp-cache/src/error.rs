//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
///
/// Missing and expired entries are reported as `Ok(None)` from reads, not as
/// errors; callers must not be able to distinguish the two.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store rejected the operation.
    #[error("cache store error: {0}")]
    Store(String),

    /// An entry could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(String),
}
