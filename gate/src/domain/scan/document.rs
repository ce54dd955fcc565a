//! Persisted layout of the scan ledger.
//!
//! The ledger is stored as one JSON document:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "scans": {
//!     "12-ana-lópez": {
//!       "qrCode": "12-ana-lópez",
//!       "scanCount": 1,
//!       "lastScanTime": 1760800000000,
//!       "status": "in_progress"
//!     }
//!   }
//! }
//! ```
//!
//! Ledgers written before versioning are a bare `qrCode → record` object and
//! decode as schema version 0. Encoding always produces the current version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::{ScanLedger, ScanRecord};
use crate::domain::QrCode;

/// Schema version written by [`encode_ledger`].
pub const LEDGER_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_FIELD: &str = "schemaVersion";

/// Errors raised while decoding or encoding the ledger document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerCodecError {
    /// The stored blob is not a ledger document.
    #[error("stored ledger is malformed: {message}")]
    Malformed {
        /// Description of the decoding failure.
        message: String,
    },
    /// The stored blob was written by a newer schema.
    #[error("stored ledger uses schema version {found}; this build supports up to {supported}")]
    UnsupportedVersion {
        /// Version found in the blob.
        found: u64,
        /// Newest version this build understands.
        supported: u32,
    },
    /// The ledger could not be serialized.
    #[error("failed to encode ledger: {message}")]
    Encode {
        /// Description of the serialization failure.
        message: String,
    },
}

/// A decoded ledger together with the schema version it was stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLedger {
    /// The ledger contents.
    pub ledger: ScanLedger,
    /// Schema version of the stored blob; 0 for unversioned blobs.
    pub schema_version: u32,
}

impl DecodedLedger {
    /// Whether the next write will rewrite the blob in the current schema.
    pub fn needs_upgrade(&self) -> bool {
        self.schema_version < LEDGER_SCHEMA_VERSION
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    scan_count: u32,
    last_scan_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument {
    #[serde(default)]
    scans: BTreeMap<String, StoredRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentView<'a> {
    schema_version: u32,
    scans: &'a ScanLedger,
}

/// Decode a stored ledger blob.
///
/// Record keys are authoritative; a stored `status` is ignored and
/// recomputed from `scanCount`. Entries with a blank key are skipped.
///
/// # Errors
///
/// Returns [`LedgerCodecError::Malformed`] when the blob is not a JSON object
/// of records, and [`LedgerCodecError::UnsupportedVersion`] when it declares a
/// schema newer than [`LEDGER_SCHEMA_VERSION`].
pub fn decode_ledger(blob: &str) -> Result<DecodedLedger, LedgerCodecError> {
    let value: Value = serde_json::from_str(blob).map_err(malformed)?;
    let Value::Object(object) = &value else {
        return Err(LedgerCodecError::Malformed {
            message: "expected a JSON object".to_owned(),
        });
    };

    let (schema_version, scans) = match object.get(SCHEMA_VERSION_FIELD) {
        Some(version) => {
            let found = version.as_u64().ok_or_else(|| LedgerCodecError::Malformed {
                message: format!("{SCHEMA_VERSION_FIELD} must be a non-negative integer"),
            })?;
            if found > u64::from(LEDGER_SCHEMA_VERSION) {
                return Err(LedgerCodecError::UnsupportedVersion {
                    found,
                    supported: LEDGER_SCHEMA_VERSION,
                });
            }
            let document: StoredDocument = serde_json::from_value(value).map_err(malformed)?;
            (LEDGER_SCHEMA_VERSION, document.scans)
        }
        None => {
            let scans: BTreeMap<String, StoredRecord> =
                serde_json::from_value(value).map_err(malformed)?;
            (0, scans)
        }
    };

    let records = scans
        .into_iter()
        .filter_map(|(key, stored)| match QrCode::new(key) {
            Ok(code) => Some(ScanRecord::restore(
                code,
                stored.scan_count,
                stored.last_scan_time,
            )),
            Err(err) => {
                warn!(error = %err, "skipping stored scan with an unusable key");
                None
            }
        });

    Ok(DecodedLedger {
        ledger: ScanLedger::from_records(records),
        schema_version,
    })
}

/// Encode a ledger in the current schema.
///
/// # Errors
///
/// Returns [`LedgerCodecError::Encode`] if serialization fails.
pub fn encode_ledger(ledger: &ScanLedger) -> Result<String, LedgerCodecError> {
    serde_json::to_string(&DocumentView {
        schema_version: LEDGER_SCHEMA_VERSION,
        scans: ledger,
    })
    .map_err(|err| LedgerCodecError::Encode {
        message: err.to_string(),
    })
}

fn malformed(err: serde_json::Error) -> LedgerCodecError {
    LedgerCodecError::Malformed {
        message: err.to_string(),
    }
}
