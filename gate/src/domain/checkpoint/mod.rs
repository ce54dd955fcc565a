//! Guard checkpoint: one presentation of a pass at the gate.
//!
//! A checkpoint parses the scanned text, records the scan in the ledger and
//! turns the guard's review into a [`GateRecord`]. It handles one scan at a
//! time; a second scan arriving while the first is still being recorded is
//! rejected rather than queued.

mod review;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mockable::Clock;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::ports::QrScanCommand;
use crate::domain::{Error, ScanRegistration, VisitDescriptor, parse};

pub use review::{EntryChecklist, EntryReview, GateMovement, GateRecord, ReviewRequirement};

/// A pass that was read and recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointScan {
    /// The visit as read from the pass.
    pub visit: VisitDescriptor,
    /// Ledger outcome of the scan.
    pub registration: ScanRegistration,
}

impl CheckpointScan {
    /// Entry or exit, or `None` when the visit had already completed.
    pub fn movement(&self) -> Option<GateMovement> {
        GateMovement::from_registration(&self.registration)
    }
}

/// Guard checkpoint over a scan ledger.
pub struct GateCheckpoint<C> {
    scans: Arc<C>,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
}

impl<C> GateCheckpoint<C> {
    /// Create a checkpoint recording scans through `scans`.
    pub fn new(scans: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scans,
            clock,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a scan is currently being processed.
    pub fn is_scanning(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Turn the guard's review of `scan` into a gate record.
    ///
    /// # Errors
    ///
    /// Returns a `confirmation_incomplete` error when the visit had already
    /// completed before this presentation, or when the review is missing an
    /// authorization or a required photo. Details list what is missing.
    pub fn confirm(&self, scan: &CheckpointScan, review: EntryReview) -> Result<GateRecord, Error> {
        let Some(movement) = scan.movement() else {
            return Err(Error::confirmation_incomplete(format!(
                "visit {} was already completed",
                scan.visit.qr_code
            )));
        };
        let missing = review.missing_requirements(&scan.visit);
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(ReviewRequirement::as_str).collect();
            return Err(Error::confirmation_incomplete(format!(
                "review is missing: {}",
                names.join(", ")
            ))
            .with_details(serde_json::json!({ "missing": names })));
        }

        let progress = scan.registration.progress();
        info!(
            qr_code = %scan.visit.qr_code,
            ?movement,
            scan_count = progress.scan_count,
            "gate movement confirmed"
        );
        Ok(GateRecord {
            visit: scan.visit.clone(),
            status: progress.status,
            scan_count: progress.scan_count,
            movement,
            checklist: review.checklist,
            observations: review.observations,
            trunk_photo: review.trunk_photo,
            plate_photo: review.plate_photo,
            processed_at: self.clock.utc(),
        })
    }
}

impl<C> GateCheckpoint<C>
where
    C: QrScanCommand,
{
    /// Read `raw_text` and record the scan.
    ///
    /// # Errors
    ///
    /// - `scan_in_flight` when another scan on this checkpoint is unfinished.
    /// - `invalid_payload` when the text is not a complete pass.
    /// - `storage_failure` when the ledger could not be updated.
    pub async fn process_scan(&self, raw_text: &str) -> Result<CheckpointScan, Error> {
        let _scan = ScanGuard::acquire(&self.in_flight)?;
        let visit = parse(raw_text).into_descriptor()?;
        let registration = self.scans.register_qr_scan(&visit.qr_code).await?;
        debug!(
            qr_code = %visit.qr_code,
            status = %registration.status(),
            already_completed = registration.is_already_completed(),
            "checkpoint scan processed"
        );
        Ok(CheckpointScan {
            visit,
            registration,
        })
    }
}

/// Holds the in-flight flag for the lifetime of one scan.
struct ScanGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ScanGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, Error> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { flag })
            .map_err(|_| Error::scan_in_flight("a scan is already being processed"))
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests;
