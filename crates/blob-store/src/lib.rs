//! Directory-backed storage for named text blobs.
//!
//! Each blob lives in its own file inside a single directory opened through a
//! `cap-std` capability, so keys can never escape the store root. Writes go
//! through a temporary file that is renamed over the target, which means a
//! reader observes either the previous contents or the new contents and never
//! a partial write.
//!
//! # Example
//!
//! ```
//! use blob_store::{BlobKey, BlobStore};
//!
//! let root = tempfile::tempdir().expect("temp dir");
//! let root = camino::Utf8Path::from_path(root.path()).expect("utf-8 temp dir");
//! let store = BlobStore::open(root).expect("open store");
//! let key = BlobKey::new("cosevif_qr_scans").expect("valid key");
//!
//! assert_eq!(store.read(&key).expect("read"), None);
//! store.write(&key, r#"{"schemaVersion":1,"scans":{}}"#).expect("write");
//! assert!(store.read(&key).expect("read").is_some());
//! assert!(store.remove(&key).expect("remove"));
//! ```

mod atomic_io;
mod error;
mod key;
mod store;

pub use error::BlobStoreError;
pub use key::{BLOB_KEY_MAX_LEN, BlobKey, BlobKeyError};
pub use store::BlobStore;
