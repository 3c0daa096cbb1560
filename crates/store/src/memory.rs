//! In-memory store for tests and fixtures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use deskflow_core::Request;
use tokio::sync::RwLock;

use crate::{RequestStore, StoreError};

/// Keeps the collection in memory; supports failure injection so callers
/// can exercise the malformed-blob path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    requests: RwLock<Vec<Request>>,
    fail_loads: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an initial collection.
    pub fn with_requests(requests: Vec<Request>) -> Self {
        Self {
            requests: RwLock::new(requests),
            ..Self::default()
        }
    }

    /// Make every subsequent `load` fail as if the blob were malformed.
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored collection.
    pub async fn snapshot(&self) -> Vec<Request> {
        self.requests.read().await.clone()
    }
}

fn malformed_blob_error() -> StoreError {
    // Manufacture a representative serde_json error.
    let err = serde_json::from_str::<Vec<Request>>("not json").unwrap_err();
    StoreError::Serialization(err)
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Request>, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(malformed_blob_error());
        }
        Ok(self.requests.read().await.clone())
    }

    async fn save(&self, requests: &[Request]) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.requests.write().await = requests.to_vec();
        Ok(())
    }
}
