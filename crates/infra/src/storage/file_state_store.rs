//! JSON-file state store
//!
//! Keeps the pending authorization nonce on disk so a callback delivered to a
//! fresh process can still be validated. Writes go to a sibling temp file
//! that is then renamed over the target.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chainview_common::auth::{StateStore, StateStoreError};
use chainview_domain::constants::{APP_DIR_NAME, DEFAULT_STATE_FILE_NAME};
use chainview_domain::ChainViewError;
use tokio::sync::Mutex;
use tracing::debug;

/// Default location: `<local data dir>/chainview/state.json`
///
/// # Errors
/// Returns `ChainViewError::Config` if the platform has no local data
/// directory.
pub fn default_state_path() -> chainview_domain::Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_STATE_FILE_NAME))
        .ok_or_else(|| {
            ChainViewError::Config("no local data directory; set CHAINVIEW_STATE_PATH".to_string())
        })
}

/// State store persisted as a flat JSON object
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStateStore {
    /// Store backed by `path`; the file is created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// Backing file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<HashMap<String, String>, StateStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(
        &self,
        entries: &HashMap<String, String>,
    ) -> Result<(), StateStoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn save(&self, key: &str, value: &str) -> Result<(), StateStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await?;
        debug!(path = %self.path.display(), key, "Persisted state entry");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StateStoreError> {
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));

        assert_eq!(store.load("oauth_state").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("chainview").join("state.json");
        let store = FileStateStore::new(&path);

        store.save("oauth_state", "nonce-1").await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists(), "temp file should be renamed away");
    }

    #[tokio::test]
    async fn later_save_overwrites_and_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));

        store.save("oauth_state", "first").await.unwrap();
        store.save("other", "kept").await.unwrap();
        store.save("oauth_state", "second").await.unwrap();

        assert_eq!(store.load("oauth_state").await.unwrap().as_deref(), Some("second"));
        assert_eq!(store.load("other").await.unwrap().as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn value_survives_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        FileStateStore::new(&path).save("oauth_state", "persisted").await.unwrap();
        let reopened = FileStateStore::new(&path);

        assert_eq!(reopened.load("oauth_state").await.unwrap().as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = FileStateStore::new(&path).load("oauth_state").await.unwrap_err();
        assert!(matches!(err, StateStoreError::Serialization(_)));
    }
}
