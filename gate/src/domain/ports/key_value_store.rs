//! Port abstraction for the device-local key-value persistence.
//!
//! The [`KeyValueStore`] trait mirrors the small asynchronous key-value API a
//! mobile device offers: whole values are read, written and removed by key.
//! The scan ledger keeps its entire state under a single key.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by key-value store adapters.
    pub enum KeyValueStoreError {
        /// The backing store could not be reached or opened.
        Unavailable { message: String } => "key-value store unavailable: {message}",
        /// A value exists but could not be read.
        Read { message: String } => "key-value store read failed: {message}",
        /// A value could not be written or removed.
        Write { message: String } => "key-value store write failed: {message}",
    }
}

/// Port for whole-value persistence keyed by string.
///
/// Implementations only need to guarantee that a single `set` is observed
/// either completely or not at all. Read-modify-write sequences are
/// serialized by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueStoreError>;

    /// Delete the value under `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError>;
}
