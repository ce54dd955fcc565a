//! Scan ledger service implementing the scan command and query ports.
//!
//! The ledger lives under one key of a [`KeyValueStore`]. Every mutation loads
//! the whole ledger, applies one transition and writes it back while holding a
//! ledger-wide async mutex, so interleaved calls cannot lose updates.
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::domain::ports::{KeyValueStore, KeyValueStoreError, QrScanCommand, QrScanQuery};
use crate::domain::{
    DecodedLedger, Error, LEDGER_SCHEMA_VERSION, QrCode, ScanLedger, ScanRecord,
    ScanRegistration, VisitSummary, decode_ledger, encode_ledger,
};

/// Key the ledger is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "cosevif_qr_scans";

/// Scan ledger service backed by a key-value store.
///
/// Clones share the store and the write lock, so every handle to the same
/// ledger is serialized against the others.
pub struct QrScanService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    storage_key: Arc<str>,
    write_lock: Arc<Mutex<()>>,
}

impl<S> Clone for QrScanService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            storage_key: Arc::clone(&self.storage_key),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S> QrScanService<S> {
    /// Create a service storing the ledger under [`DEFAULT_STORAGE_KEY`].
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use gate::domain::QrScanService;
    /// # use gate::outbound::persistence::InMemoryKeyValueStore;
    /// # use mockable::DefaultClock;
    /// let service = QrScanService::new(
    ///     Arc::new(InMemoryKeyValueStore::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// assert_eq!(service.storage_key(), "cosevif_qr_scans");
    /// ```
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self::with_storage_key(store, clock, DEFAULT_STORAGE_KEY)
    }

    /// Create a service storing the ledger under `storage_key`.
    pub fn with_storage_key(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        storage_key: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            clock,
            storage_key: storage_key.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Key the ledger is stored under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl<S> QrScanService<S>
where
    S: KeyValueStore + 'static,
{
    /// Run `operation` while holding the write lock.
    ///
    /// The operation runs on its own task together with the lock guard, so a
    /// caller that stops waiting cannot abort a write halfway. Nothing in the
    /// returned future runs before the lock is held.
    async fn exclusive<T, F, Fut>(&self, operation: F) -> Result<T, Error>
    where
        F: FnOnce(LedgerAccess<S>) -> Fut,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
        T: Send + 'static,
    {
        let task = operation(LedgerAccess {
            store: Arc::clone(&self.store),
            key: Arc::clone(&self.storage_key),
            clock: Arc::clone(&self.clock),
        });
        let guard = Arc::clone(&self.write_lock).lock_owned().await;
        tokio::spawn(async move {
            let _guard = guard;
            task.await
        })
        .await
        .map_err(|err| Error::internal(format!("scan ledger task failed: {err}")))?
    }
}

/// What a locked ledger operation works with.
struct LedgerAccess<S> {
    store: Arc<S>,
    key: Arc<str>,
    clock: Arc<dyn Clock>,
}

impl<S> LedgerAccess<S>
where
    S: KeyValueStore,
{
    fn now_ms(&self) -> i64 {
        self.clock.utc().timestamp_millis()
    }

    async fn load(&self) -> Result<DecodedLedger, Error> {
        load_ledger(self.store.as_ref(), &self.key).await
    }

    async fn persist(&self, ledger: &ScanLedger) -> Result<(), Error> {
        persist_ledger(self.store.as_ref(), &self.key, ledger).await
    }
}

async fn load_ledger<S>(store: &S, key: &str) -> Result<DecodedLedger, Error>
where
    S: KeyValueStore + ?Sized,
{
    let blob = store
        .get(key)
        .await
        .map_err(|err| storage_error("read", &err))?;
    match blob {
        None => Ok(DecodedLedger {
            ledger: ScanLedger::new(),
            schema_version: LEDGER_SCHEMA_VERSION,
        }),
        Some(blob) => decode_ledger(&blob)
            .map_err(|err| Error::storage_failure(format!("scan ledger unreadable: {err}"))),
    }
}

async fn persist_ledger<S>(store: &S, key: &str, ledger: &ScanLedger) -> Result<(), Error>
where
    S: KeyValueStore + ?Sized,
{
    let blob = encode_ledger(ledger).map_err(|err| Error::internal(err.to_string()))?;
    store.set(key, blob).await.map_err(|err| {
        error!(error = %err, key, "failed to persist scan ledger");
        storage_error("write", &err)
    })
}

fn storage_error(action: &str, err: &KeyValueStoreError) -> Error {
    Error::storage_failure(format!("failed to {action} scan ledger: {err}"))
}

#[async_trait]
impl<S> QrScanCommand for QrScanService<S>
where
    S: KeyValueStore + 'static,
{
    async fn register_qr_scan(&self, qr_code: &QrCode) -> Result<ScanRegistration, Error> {
        let qr_code = qr_code.clone();
        self.exclusive(move |ledger_access| async move {
            let DecodedLedger {
                mut ledger,
                schema_version,
            } = ledger_access.load().await?;
            let registration = ledger.record_scan(&qr_code, ledger_access.now_ms());
            if registration.is_already_completed() {
                debug!(%qr_code, "scan ignored; visit already completed");
                return Ok(registration);
            }
            ledger_access.persist(&ledger).await?;
            debug!(
                %qr_code,
                status = %registration.status(),
                scan_count = registration.scan_count(),
                stored_schema = schema_version,
                "scan recorded"
            );
            Ok(registration)
        })
        .await
    }

    async fn clear_all_qr_scans(&self) -> Result<(), Error> {
        self.exclusive(|ledger_access| async move {
            let LedgerAccess { store, key, .. } = ledger_access;
            store.remove(&key).await.map_err(|err| {
                error!(error = %err, key = %key, "failed to clear scan ledger");
                storage_error("clear", &err)
            })?;
            debug!(key = %key, "scan ledger cleared");
            Ok(())
        })
        .await
    }

    async fn prune_qr_scans(&self, older_than: DateTime<Utc>) -> Result<usize, Error> {
        let cutoff_ms = older_than.timestamp_millis();
        self.exclusive(move |ledger_access| async move {
            let DecodedLedger { mut ledger, .. } = ledger_access.load().await?;
            let removed = ledger.prune_older_than(cutoff_ms);
            if removed > 0 {
                ledger_access.persist(&ledger).await?;
            }
            debug!(removed, cutoff_ms, "scan ledger pruned");
            Ok(removed)
        })
        .await
    }
}

#[async_trait]
impl<S> QrScanQuery for QrScanService<S>
where
    S: KeyValueStore + 'static,
{
    async fn qr_scan_data(&self, qr_code: &QrCode) -> Option<ScanRecord> {
        self.try_qr_scan_data(qr_code).await.unwrap_or_else(|err| {
            warn!(error = %err, %qr_code, "scan lookup degraded to absent");
            None
        })
    }

    async fn try_qr_scan_data(&self, qr_code: &QrCode) -> Result<Option<ScanRecord>, Error> {
        let decoded = load_ledger(self.store.as_ref(), &self.storage_key).await?;
        Ok(decoded.ledger.get(qr_code).cloned())
    }

    async fn all_qr_scans(&self) -> ScanLedger {
        self.try_all_qr_scans().await.unwrap_or_else(|err| {
            warn!(error = %err, "scan ledger listing degraded to empty");
            ScanLedger::new()
        })
    }

    async fn try_all_qr_scans(&self) -> Result<ScanLedger, Error> {
        load_ledger(self.store.as_ref(), &self.storage_key)
            .await
            .map(|decoded| decoded.ledger)
    }

    async fn update_visits_with_scan_data(&self, visits: Vec<VisitSummary>) -> Vec<VisitSummary> {
        match self.try_all_qr_scans().await {
            Ok(ledger) => ledger.annotate(&visits),
            Err(err) => {
                warn!(error = %err, "visit annotation skipped; ledger unreadable");
                visits
            }
        }
    }
}

#[cfg(test)]
#[path = "qr_scan_service_tests.rs"]
mod tests;
