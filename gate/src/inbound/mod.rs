//! Inbound adapters that translate external requests into domain calls.
//!
//! The command-line adapter lives under [`cli`].

pub mod cli;
