//! Persisted tracker state
//!
//! A small key/value interface stands in for durable client storage. The
//! tracker only ever touches two keys, through [`ActiveJobRegistry`]: the id
//! of the job being watched and whether the tracker should be shown.
//!
//! Backends are trait-based so the poller can be tested without touching disk.

mod file;
mod memory;
mod registry;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use registry::{ACTIVE_JOB_KEY, ActiveJobRegistry, SHOW_TRACKER_KEY};

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store contents are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable string key/value storage
pub trait KeyValueStore: Send + Sync {
    /// Reads a key
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;
}
