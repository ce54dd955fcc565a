//! Directory-backed key-value store.
//!
//! Each key maps to one file inside the store directory. Filesystem calls are
//! blocking, so every operation runs on tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use blob_store::{BlobKey, BlobStore, BlobStoreError};
use camino::Utf8Path;
use tracing::debug;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// Key-value store persisting each key as a file under one directory.
///
/// Keys must be valid file names: ASCII letters, digits, `_`, `-` and `.`,
/// not starting with a dot.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    blobs: Arc<BlobStore>,
}

impl FileKeyValueStore {
    /// Open the store at `root`, creating the directory when missing.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueStoreError::Unavailable`] when the directory cannot
    /// be created or opened.
    pub fn open(root: impl AsRef<Utf8Path>) -> Result<Self, KeyValueStoreError> {
        let blobs = BlobStore::open(root).map_err(|err| map_blob_error(&err))?;
        debug!(root = %blobs.root(), "file key-value store opened");
        Ok(Self {
            blobs: Arc::new(blobs),
        })
    }

    /// Directory the store writes into.
    pub fn root(&self) -> &Utf8Path {
        self.blobs.root()
    }

    async fn run_blocking<T, F>(&self, key: &str, operation: F) -> Result<T, KeyValueStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&BlobStore, &BlobKey) -> Result<T, BlobStoreError> + Send + 'static,
    {
        let key = BlobKey::new(key)
            .map_err(|err| KeyValueStoreError::unavailable(format!("invalid store key: {err}")))?;
        let blobs = Arc::clone(&self.blobs);
        tokio::task::spawn_blocking(move || operation(&blobs, &key))
            .await
            .map_err(|err| {
                KeyValueStoreError::unavailable(format!("blocking store task failed: {err}"))
            })?
            .map_err(|err| map_blob_error(&err))
    }
}

fn map_blob_error(err: &BlobStoreError) -> KeyValueStoreError {
    match err {
        BlobStoreError::Open { .. } => KeyValueStoreError::unavailable(err.to_string()),
        BlobStoreError::Read { .. } => KeyValueStoreError::read(err.to_string()),
        BlobStoreError::Write { .. } | BlobStoreError::Remove { .. } => {
            KeyValueStoreError::write(err.to_string())
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        self.run_blocking(key, |blobs, key| blobs.read(key)).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueStoreError> {
        self.run_blocking(key, move |blobs, key| blobs.write(key, &value))
            .await
    }

    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        self.run_blocking(key, |blobs, key| blobs.remove(key).map(|_| ()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    #[fixture]
    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().join("ledger")).expect("utf-8 path");
        (dir, root)
    }

    #[rstest]
    #[tokio::test]
    async fn values_survive_reopen(temp_root: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = temp_root;
        let store = FileKeyValueStore::open(&root).expect("open");
        store
            .set("cosevif_qr_scans", "{\"schemaVersion\":1}".to_owned())
            .await
            .expect("set");

        let reopened = FileKeyValueStore::open(&root).expect("reopen");

        assert_eq!(
            reopened.get("cosevif_qr_scans").await.expect("get"),
            Some("{\"schemaVersion\":1}".to_owned())
        );
        assert_eq!(reopened.root(), root.as_path());
    }

    #[rstest]
    #[tokio::test]
    async fn removing_a_missing_key_succeeds(temp_root: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = temp_root;
        let store = FileKeyValueStore::open(&root).expect("open");

        store.remove("cosevif_qr_scans").await.expect("remove");

        assert_eq!(store.get("cosevif_qr_scans").await.expect("get"), None);
    }

    #[rstest]
    #[case("../escape")]
    #[case(".hidden")]
    #[case("")]
    #[tokio::test]
    async fn unusable_keys_are_rejected(
        temp_root: (TempDir, Utf8PathBuf),
        #[case] key: &str,
    ) {
        let (_guard, root) = temp_root;
        let store = FileKeyValueStore::open(&root).expect("open");

        let err = store.get(key).await.expect_err("invalid key");

        assert!(matches!(err, KeyValueStoreError::Unavailable { .. }));
    }
}
