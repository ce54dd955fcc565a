//! In-memory scan ledger and its transition rules.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use super::{ScanRecord, ScanRegistration};
use crate::domain::{QrCode, VisitSummary};

/// Mapping from visit identifier to scan progress.
///
/// The ledger is a plain value: loading it from and saving it to storage is
/// the job of [`crate::domain::QrScanService`].
///
/// # Example
///
/// ```
/// use gate::domain::{QrCode, ScanLedger, ScanStatus};
///
/// let mut ledger = ScanLedger::new();
/// let code = QrCode::derive("12", "Ana López");
///
/// let statuses: Vec<ScanStatus> = (0..3)
///     .map(|offset| ledger.record_scan(&code, 1_000 + offset).status())
///     .collect();
/// assert_eq!(
///     statuses,
///     [ScanStatus::InProgress, ScanStatus::Completed, ScanStatus::Completed]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanLedger {
    scans: BTreeMap<QrCode, ScanRecord>,
}

impl ScanLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from records, keyed by each record's identifier.
    pub fn from_records(records: impl IntoIterator<Item = ScanRecord>) -> Self {
        let scans = records
            .into_iter()
            .map(|record| (record.qr_code().clone(), record))
            .collect();
        Self { scans }
    }

    /// Record for `qr_code`, if the visit was ever scanned.
    pub fn get(&self, qr_code: &QrCode) -> Option<&ScanRecord> {
        self.scans.get(qr_code)
    }

    /// Number of visits in the ledger.
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// Whether the ledger holds no visits.
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Records ordered by identifier.
    pub fn records(&self) -> impl Iterator<Item = &ScanRecord> {
        self.scans.values()
    }

    /// Apply one scan of `qr_code` at `now_ms`.
    ///
    /// Absent visits start at one scan, in-progress visits advance by exactly
    /// one, and completed visits are left untouched.
    pub fn record_scan(&mut self, qr_code: &QrCode, now_ms: i64) -> ScanRegistration {
        match self.scans.entry(qr_code.clone()) {
            Entry::Vacant(slot) => {
                let record = slot.insert(ScanRecord::first_scan(qr_code.clone(), now_ms));
                ScanRegistration::Recorded(record.progress())
            }
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                if record.advance(now_ms) {
                    ScanRegistration::Recorded(record.progress())
                } else {
                    ScanRegistration::AlreadyCompleted(record.progress())
                }
            }
        }
    }

    /// Drop records last scanned before `cutoff_ms`. Returns how many were
    /// removed.
    pub fn prune_older_than(&mut self, cutoff_ms: i64) -> usize {
        let before = self.scans.len();
        self.scans
            .retain(|_, record| record.last_scan_time() >= cutoff_ms);
        before - self.scans.len()
    }

    /// Copy of `visits` with ledger progress written onto matching rows.
    ///
    /// Rows whose `qrCode` is unknown to the ledger, blank, absent or not a
    /// string are returned unchanged.
    pub fn annotate(&self, visits: &[VisitSummary]) -> Vec<VisitSummary> {
        visits
            .iter()
            .cloned()
            .map(|mut visit| {
                let record = visit
                    .qr_code()
                    .and_then(|raw| QrCode::new(raw).ok())
                    .and_then(|code| self.scans.get(&code));
                if let Some(record) = record {
                    visit.set_progress(record.status().as_str(), u32::from(record.scan_count()));
                }
                visit
            })
            .collect()
    }
}
