//! Error types for the blob store.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while opening the store or touching a blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobStoreError {
    /// The store directory could not be created or opened.
    #[error("failed to open blob directory '{path}': {message}")]
    Open {
        /// Directory the store was asked to open.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A blob exists but could not be read.
    #[error("failed to read blob '{key}': {message}")]
    Read {
        /// Key of the blob.
        key: String,
        /// Description of the I/O error.
        message: String,
    },

    /// A blob could not be written or replaced.
    #[error("failed to write blob '{key}': {message}")]
    Write {
        /// Key of the blob.
        key: String,
        /// Description of the I/O error.
        message: String,
    },

    /// A blob exists but could not be deleted.
    #[error("failed to remove blob '{key}': {message}")]
    Remove {
        /// Key of the blob.
        key: String,
        /// Description of the I/O error.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_the_directory() {
        let err = BlobStoreError::Open {
            path: Utf8PathBuf::from("/var/lib/gate"),
            message: "permission denied".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "failed to open blob directory '/var/lib/gate': permission denied"
        );
    }

    #[test]
    fn write_error_names_the_key() {
        let err = BlobStoreError::Write {
            key: "cosevif_qr_scans".to_owned(),
            message: "disk full".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write blob 'cosevif_qr_scans': disk full"
        );
    }
}
