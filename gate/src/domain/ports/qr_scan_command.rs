//! Driving port for scan ledger mutations.
//!
//! Inbound adapters and the guard checkpoint record scans through this port
//! without knowing where the ledger is kept.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, QrCode, ScanRegistration};

/// Driving port for scan ledger mutations.
///
/// Every mutation is a read-modify-write of the whole ledger and is applied
/// under one exclusive section, so concurrent calls never lose updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QrScanCommand: Send + Sync {
    /// Record one scan of `qr_code`.
    ///
    /// Returns the resulting status and count. A visit that is already
    /// completed yields [`ScanRegistration::AlreadyCompleted`] and nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns a `storage_failure` error when the ledger cannot be read or
    /// written. The stored ledger is unchanged in that case.
    async fn register_qr_scan(&self, qr_code: &QrCode) -> Result<ScanRegistration, Error>;

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Returns a `storage_failure` error when the ledger cannot be removed.
    async fn clear_all_qr_scans(&self) -> Result<(), Error>;

    /// Drop records whose last scan happened before `older_than`. Returns
    /// how many records were removed.
    ///
    /// # Errors
    ///
    /// Returns a `storage_failure` error when the ledger cannot be read or
    /// written.
    async fn prune_qr_scans(&self, older_than: DateTime<Utc>) -> Result<usize, Error>;
}
