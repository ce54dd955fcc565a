//! Gate configuration loaded via OrthoConfig.

use std::path::PathBuf;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_STORAGE_KEY;

const DEFAULT_STORE_DIR: &str = ".gate";
const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Configuration values for the scan ledger and its storage.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GATE")]
pub struct GateSettings {
    /// Directory the ledger file is kept in.
    pub store_dir: Option<PathBuf>,
    /// Key (file name) the ledger is stored under.
    pub storage_key: Option<String>,
    /// Days a scan record is kept before `prune` may drop it.
    pub retention_days: Option<u32>,
}

impl GateSettings {
    /// Return the configured store directory, falling back to `.gate`.
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
    }

    /// Return the configured storage key, falling back to the default key.
    pub fn storage_key(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
    }

    /// Return the configured retention window in days.
    pub fn retention_days(&self) -> u32 {
        self.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS)
    }

    /// Return the retention window as a duration.
    pub fn retention(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.retention_days()))
    }
}
