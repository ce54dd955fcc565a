//! Process-local key-value store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{KeyValueStore, KeyValueStoreError};

/// Key-value store holding values in memory for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, KeyValueStoreError> {
        self.values
            .lock()
            .map_err(|_| KeyValueStoreError::unavailable("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KeyValueStoreError> {
        self.lock()?.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KeyValueStoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn values_round_trip_by_key() {
        let store = InMemoryKeyValueStore::new();

        store
            .set("cosevif_qr_scans", "{}".to_owned())
            .await
            .expect("set");

        assert_eq!(
            store.get("cosevif_qr_scans").await.expect("get"),
            Some("{}".to_owned())
        );
        assert_eq!(store.get("other").await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryKeyValueStore::with_entries([("cosevif_qr_scans", "{}")]);

        store.remove("cosevif_qr_scans").await.expect("remove");
        store.remove("cosevif_qr_scans").await.expect("remove again");

        assert_eq!(store.get("cosevif_qr_scans").await.expect("get"), None);
    }
}
