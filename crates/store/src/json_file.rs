//! File-backed store: one JSON file per storage key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use deskflow_core::Request;

use crate::{RequestStore, StoreError, STORAGE_KEY};

/// Stores the collection as `<data_dir>/<key>.json`.
///
/// Saves are atomic: the new blob is written to a sibling temp file and
/// renamed over the live one, so a crash mid-save leaves the previous blob
/// intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `data_dir`, using the default storage key.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    /// Path of the live blob file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RequestStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Request>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No collection blob yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let requests = serde_json::from_slice(&bytes)?;
        Ok(requests)
    }

    async fn save(&self, requests: &[Request]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec(requests)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            records = requests.len(),
            "Saved collection blob"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use deskflow_core::types::Timestamp;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn temp_store() -> (JsonFileStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("deskflow-store-{}", uuid::Uuid::new_v4()));
        (JsonFileStore::new(&dir), dir)
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let (store, dir) = temp_store();
        let requests = store.load().await.unwrap();
        assert!(requests.is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let (store, dir) = temp_store();
        let record = Request::new_request("ana", "IT", "t", "d", false, now());
        store.save(std::slice::from_ref(&record)).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, vec![record]);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn save_overwrites_previous_blob() {
        let (store, dir) = temp_store();
        let record = Request::new_request("ana", "IT", "t", "d", false, now());
        store.save(std::slice::from_ref(&record)).await.unwrap();
        store.save(&[]).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert!(loaded.is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn malformed_blob_is_a_serialization_error() {
        let (store, dir) = temp_store();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(store.path(), b"not json").unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn legacy_blob_with_scalar_acceptor_loads() {
        let (store, dir) = temp_store();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            store.path(),
            br#"[{"id":"r-1","type":"request","creator":"ana","department":"IT",
                 "title":"Fix printer","description":"","status":"In Process",
                 "acceptedBy":"ben"}]"#,
        )
        .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].is_accepted_by("ben"));
        let _ = std::fs::remove_dir_all(dir);
    }
}
