//! Visit descriptors and the QR payload parser.
//!
//! - [`parse`]: decode scanned text into a [`ParsedPayload`].
//! - [`VisitDescriptor`]: a complete visit with its ledger [`QrCode`].
//! - [`VisitFields`]: whatever a payload yielded before validation.
//! - [`VisitSummary`]: a backend list row that can be annotated with scan
//!   progress.

mod descriptor;
mod parser;
mod qr_code;
mod summary;

pub use descriptor::{Headcount, PayloadEncoding, RequiredField, VisitDescriptor, VisitFields};
pub use parser::{ParsedPayload, parse};
pub use qr_code::{QrCode, QrCodeValidationError};
pub use summary::VisitSummary;
