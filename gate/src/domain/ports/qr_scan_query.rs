//! Driving port for scan ledger reads.
//!
//! The plain queries degrade to "nothing recorded" when storage fails so list
//! screens keep working offline; the `try_` variants surface the failure.

use async_trait::async_trait;

use crate::domain::{Error, QrCode, ScanLedger, ScanRecord, VisitSummary};

/// Driving port for scan ledger reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QrScanQuery: Send + Sync {
    /// Record for `qr_code`, or `None` when absent or unreadable.
    async fn qr_scan_data(&self, qr_code: &QrCode) -> Option<ScanRecord>;

    /// Record for `qr_code`.
    ///
    /// # Errors
    ///
    /// Returns a `storage_failure` error when the ledger cannot be read.
    async fn try_qr_scan_data(&self, qr_code: &QrCode) -> Result<Option<ScanRecord>, Error>;

    /// The whole ledger, or an empty one when unreadable.
    async fn all_qr_scans(&self) -> ScanLedger;

    /// The whole ledger.
    ///
    /// # Errors
    ///
    /// Returns a `storage_failure` error when the ledger cannot be read.
    async fn try_all_qr_scans(&self) -> Result<ScanLedger, Error>;

    /// `visits` with ledger status and count written onto matching rows.
    ///
    /// When the ledger cannot be read the rows are returned unchanged.
    async fn update_visits_with_scan_data(&self, visits: Vec<VisitSummary>) -> Vec<VisitSummary>;
}
