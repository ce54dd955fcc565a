//! Visit progress status derived from the scan count.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of scans after which a visit is complete.
pub const MAX_SCANS: u8 = 2;

/// Progress of a visit through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Never scanned.
    Pending,
    /// Scanned once: the visitor has entered.
    InProgress,
    /// Scanned twice: the visitor has left. Terminal.
    Completed,
}

impl ScanStatus {
    /// Status implied by a scan count. Counts above [`MAX_SCANS`] are
    /// completed.
    ///
    /// # Example
    ///
    /// ```
    /// use gate::domain::ScanStatus;
    ///
    /// assert_eq!(ScanStatus::from_count(0), ScanStatus::Pending);
    /// assert_eq!(ScanStatus::from_count(1), ScanStatus::InProgress);
    /// assert_eq!(ScanStatus::from_count(2), ScanStatus::Completed);
    /// ```
    pub fn from_count(scan_count: u8) -> Self {
        match scan_count {
            0 => Self::Pending,
            1 => Self::InProgress,
            _ => Self::Completed,
        }
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`ScanStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseScanStatusError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseScanStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid scan status: {}", self.input)
    }
}

impl std::error::Error for ParseScanStatusError {}

impl FromStr for ScanStatus {
    type Err = ParseScanStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseScanStatusError {
                input: value.to_owned(),
            }),
        }
    }
}
