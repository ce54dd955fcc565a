//! Domain primitives and services for the visit gate.
//!
//! Purpose: read visit passes, track how often each visit has been scanned
//! and turn a guard's review into a gate record. Nothing here knows how the
//! ledger is persisted; adapters plug in through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failures with stable codes.
//! - parse / ParsedPayload / VisitDescriptor: pass decoding.
//! - ScanLedger / ScanRecord / ScanStatus: ledger state and transitions.
//! - QrScanService: ledger service over a `KeyValueStore`.
//! - GateCheckpoint: one-scan-at-a-time guard workflow.

pub mod checkpoint;
pub mod error;
pub mod ports;
mod qr_scan_service;
pub mod scan;
pub mod visit;

pub use self::checkpoint::{
    CheckpointScan, EntryChecklist, EntryReview, GateCheckpoint, GateMovement, GateRecord,
    ReviewRequirement,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::qr_scan_service::{DEFAULT_STORAGE_KEY, QrScanService};
pub use self::scan::{
    DecodedLedger, LEDGER_SCHEMA_VERSION, LedgerCodecError, MAX_SCANS, ParseScanStatusError,
    ScanLedger, ScanProgress, ScanRecord, ScanRegistration, ScanStatus, decode_ledger,
    encode_ledger,
};
pub use self::visit::{
    Headcount, ParsedPayload, PayloadEncoding, QrCode, QrCodeValidationError, RequiredField,
    VisitDescriptor, VisitFields, VisitSummary, parse,
};
