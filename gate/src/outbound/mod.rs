//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: key-value stores backing the scan ledger.
//!
//! Adapters translate between the port contract and their backing storage.
//! They contain no ledger rules.

pub mod persistence;
