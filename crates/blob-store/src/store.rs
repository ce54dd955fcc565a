//! The directory-backed blob store.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::atomic_io::write_atomic;
use crate::error::BlobStoreError;
use crate::key::BlobKey;

/// Stores named text blobs as files under one directory.
///
/// All access goes through a `cap-std` [`Dir`] handle, so operations are
/// confined to the directory passed to [`BlobStore::open`].
#[derive(Debug)]
pub struct BlobStore {
    dir: Dir,
    root: Utf8PathBuf,
}

impl BlobStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Open`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Utf8Path>) -> Result<Self, BlobStoreError> {
        let root = root.as_ref().to_path_buf();
        let open_error = |err: io::Error| BlobStoreError::Open {
            path: root.clone(),
            message: err.to_string(),
        };
        Dir::create_ambient_dir_all(&root, ambient_authority()).map_err(open_error)?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority()).map_err(open_error)?;
        Ok(Self { dir, root })
    }

    /// Directory the store was opened at.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Read a blob, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Read`] for any failure other than a missing
    /// file.
    pub fn read(&self, key: &BlobKey) -> Result<Option<String>, BlobStoreError> {
        match self.dir.read_to_string(key.as_str()) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(BlobStoreError::Read {
                key: key.to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Create or atomically replace a blob.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Write`] when the temporary file cannot be
    /// written or renamed into place.
    pub fn write(&self, key: &BlobKey, contents: &str) -> Result<(), BlobStoreError> {
        write_atomic(&self.dir, key.as_str(), contents).map_err(|err| BlobStoreError::Write {
            key: key.to_string(),
            message: err.to_string(),
        })
    }

    /// Delete a blob. Returns `false` when there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Remove`] for any failure other than a missing
    /// file.
    pub fn remove(&self, key: &BlobKey) -> Result<bool, BlobStoreError> {
        match self.dir.remove_file(key.as_str()) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(BlobStoreError::Remove {
                key: key.to_string(),
                message: err.to_string(),
            }),
        }
    }
}
