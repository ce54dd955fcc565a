//! Offline visit-pass scanning for a residential gate.
//!
//! A guard scans the QR code printed on a visit pass. The pass is decoded
//! into a visit descriptor, the scan is counted in a persistent ledger
//! (first scan is the entry, second is the exit) and the guard's review is
//! turned into a gate record.
//!
//! - [`domain`]: pass parsing, ledger rules, services and ports.
//! - [`outbound`]: key-value stores backing the ledger.
//! - [`inbound`]: the `gate-scan` command-line adapter.
//! - [`config`]: settings loaded from the environment.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
