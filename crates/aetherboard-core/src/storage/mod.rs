//! Storage abstraction for persisted preferences.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Entry not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value backend holding serialized (JSON) preference blobs.
///
/// Implementations must be usable from any thread; the workspace store
/// shares one backend behind an `Arc`.
pub trait PreferenceStorage: Send + Sync {
    /// Store a value under a key, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Load the value stored under a key.
    fn load(&self, key: &str) -> StorageResult<String>;

    /// Remove a key. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all stored keys.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;
}
