//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod key_value_store;
mod qr_scan_command;
mod qr_scan_query;

#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{KeyValueStore, KeyValueStoreError};
#[cfg(test)]
pub use qr_scan_command::MockQrScanCommand;
pub use qr_scan_command::QrScanCommand;
#[cfg(test)]
pub use qr_scan_query::MockQrScanQuery;
pub use qr_scan_query::QrScanQuery;
