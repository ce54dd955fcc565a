//! Per-visit scan records and registration outcomes.

use serde::Serialize;

use super::{MAX_SCANS, ScanStatus};
use crate::domain::QrCode;

/// Scan progress of one visit.
///
/// ## Invariants
/// - `scan_count` is at most [`MAX_SCANS`] and never decreases.
/// - `status` is always derived from `scan_count`, never stored separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "ScanRecordView")]
pub struct ScanRecord {
    qr_code: QrCode,
    scan_count: u8,
    last_scan_time: i64,
}

impl ScanRecord {
    /// Record for a visit scanned for the first time at `now_ms`.
    pub fn first_scan(qr_code: QrCode, now_ms: i64) -> Self {
        Self {
            qr_code,
            scan_count: 1,
            last_scan_time: now_ms,
        }
    }

    /// Rebuild a record from persisted values, clamping the count to
    /// [`MAX_SCANS`].
    pub fn restore(qr_code: QrCode, scan_count: u32, last_scan_time: i64) -> Self {
        let scan_count = u8::try_from(scan_count).map_or(MAX_SCANS, |count| count.min(MAX_SCANS));
        Self {
            qr_code,
            scan_count,
            last_scan_time,
        }
    }

    /// Ledger key.
    pub fn qr_code(&self) -> &QrCode {
        &self.qr_code
    }

    /// Number of recorded scans.
    pub fn scan_count(&self) -> u8 {
        self.scan_count
    }

    /// Epoch milliseconds of the most recent recorded scan.
    pub fn last_scan_time(&self) -> i64 {
        self.last_scan_time
    }

    /// Status implied by the scan count.
    pub fn status(&self) -> ScanStatus {
        ScanStatus::from_count(self.scan_count)
    }

    /// Whether no further scan can be recorded.
    pub fn is_completed(&self) -> bool {
        self.scan_count >= MAX_SCANS
    }

    /// The `{status, scanCount}` pair.
    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            status: self.status(),
            scan_count: self.scan_count,
        }
    }

    /// Count one more scan at `now_ms`. Returns `false`, leaving the record
    /// untouched, once the visit is completed.
    pub(crate) fn advance(&mut self, now_ms: i64) -> bool {
        if self.is_completed() {
            return false;
        }
        self.scan_count += 1;
        self.last_scan_time = now_ms;
        true
    }
}

/// Persisted shape of a record; `status` is written for readers of the raw
/// blob and ignored on load.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanRecordView {
    qr_code: QrCode,
    scan_count: u8,
    last_scan_time: i64,
    status: ScanStatus,
}

impl From<ScanRecord> for ScanRecordView {
    fn from(value: ScanRecord) -> Self {
        let status = value.status();
        Self {
            qr_code: value.qr_code,
            scan_count: value.scan_count,
            last_scan_time: value.last_scan_time,
            status,
        }
    }
}

/// Status and scan count of a visit after a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    /// Derived status.
    pub status: ScanStatus,
    /// Scan count.
    pub scan_count: u8,
}

/// Outcome of registering a scan.
///
/// Storage failures are reported as errors, so both variants describe a
/// ledger that was read successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanRegistration {
    /// The scan advanced the visit and was persisted.
    Recorded(ScanProgress),
    /// The visit was already completed; nothing changed.
    AlreadyCompleted(ScanProgress),
}

impl ScanRegistration {
    /// The resulting `{status, scanCount}` pair.
    pub fn progress(&self) -> ScanProgress {
        match self {
            Self::Recorded(progress) | Self::AlreadyCompleted(progress) => *progress,
        }
    }

    /// Resulting status.
    pub fn status(&self) -> ScanStatus {
        self.progress().status
    }

    /// Resulting scan count.
    pub fn scan_count(&self) -> u8 {
        self.progress().scan_count
    }

    /// Whether the scan hit the completed ceiling and changed nothing.
    pub fn is_already_completed(&self) -> bool {
        matches!(self, Self::AlreadyCompleted(_))
    }
}
