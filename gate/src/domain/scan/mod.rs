//! Visit scan ledger: per-visit progress, transition rules and the persisted
//! layout.

mod document;
mod ledger;
mod record;
mod status;

pub use document::{
    DecodedLedger, LEDGER_SCHEMA_VERSION, LedgerCodecError, decode_ledger, encode_ledger,
};
pub use ledger::ScanLedger;
pub use record::{ScanProgress, ScanRecord, ScanRegistration};
pub use status::{MAX_SCANS, ParseScanStatusError, ScanStatus};
