//! Persistence for the request collection.
//!
//! The whole collection lives under a single storage key as one serialized
//! JSON array — every load reads it in full and every save rewrites it in
//! full. There is no schema migration and no partial write; durability is
//! last-write-wins on the blob.

use async_trait::async_trait;
use deskflow_core::Request;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// The single key the collection blob is stored under.
pub const STORAGE_KEY: &str = "jd-requests";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted blob is malformed. Recoverable: callers may fall back
    /// to an empty collection.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Full-collection load/save over the storage blob.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Read the entire collection. A missing blob is an empty collection.
    async fn load(&self) -> Result<Vec<Request>, StoreError>;

    /// Overwrite the entire collection.
    async fn save(&self, requests: &[Request]) -> Result<(), StoreError>;
}
