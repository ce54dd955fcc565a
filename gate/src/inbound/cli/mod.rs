//! `gate-scan` command-line adapter.
//!
//! Parses arguments with `clap`, drives the scan ports and renders every
//! result as JSON. The binary owns process concerns (runtime, logging,
//! configuration); this module only needs the ports, a clock and an input
//! reader, so commands can be exercised in tests without spawning a process.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use chrono::TimeDelta;
use clap::{Args, Parser, Subcommand};
use mockable::Clock;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::{QrScanCommand, QrScanQuery};
use crate::domain::{
    CheckpointScan, EntryChecklist, EntryReview, Error, GateCheckpoint, GateMovement, GateRecord,
    QrCode, VisitSummary,
};

/// `gate-scan` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gate-scan",
    about = "Record visit pass scans at a residential gate",
    version
)]
pub struct Cli {
    /// Directory holding the scan ledger. Overrides `GATE_STORE_DIR`.
    #[arg(long = "store-dir", value_name = "path", global = true)]
    pub store_dir: Option<PathBuf>,
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations offered by `gate-scan`.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Read a pass and record the scan; confirm it when `--confirm` is set.
    Scan(ScanArgs),
    /// Show the ledger record for one visit.
    Status {
        /// Ledger key of the visit.
        #[arg(value_name = "qr-code")]
        qr_code: String,
    },
    /// Show the whole ledger.
    List,
    /// Overlay ledger progress onto a JSON array of visit rows.
    Annotate {
        /// Path to the visit list.
        #[arg(value_name = "path")]
        file: PathBuf,
    },
    /// Remove every ledger record.
    Clear,
    /// Drop records not scanned within the retention window.
    Prune {
        /// Retention window in days. Falls back to `GATE_RETENTION_DAYS`.
        #[arg(long = "older-than-days", value_name = "days")]
        older_than_days: Option<u32>,
    },
}

/// Arguments of the `scan` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Scanned text. Read from standard input when omitted.
    #[arg(long, value_name = "text")]
    pub payload: Option<String>,
    /// Confirm the movement with the review below.
    #[arg(long)]
    pub confirm: bool,
    /// The visitor's identification matches the pass.
    #[arg(long)]
    pub name_match: bool,
    /// The number of people matches the pass.
    #[arg(long)]
    pub people_match: bool,
    /// The vehicle matches the pass.
    #[arg(long)]
    pub vehicle_match: bool,
    /// The guard authorizes the movement.
    #[arg(long)]
    pub authorized: bool,
    /// Free-text notes.
    #[arg(long, value_name = "text")]
    pub observations: Option<String>,
    /// Reference to the trunk photo.
    #[arg(long, value_name = "ref")]
    pub trunk_photo: Option<String>,
    /// Reference to the licence plate photo.
    #[arg(long, value_name = "ref")]
    pub plate_photo: Option<String>,
}

impl ScanArgs {
    /// The guard review described by the flags.
    pub fn review(&self) -> EntryReview {
        EntryReview {
            checklist: EntryChecklist {
                name_match: self.name_match,
                people_match: self.people_match,
                vehicle_match: self.vehicle_match,
                authorized: self.authorized,
            },
            observations: self.observations.clone(),
            trunk_photo: self.trunk_photo.clone(),
            plate_photo: self.plate_photo.clone(),
        }
    }
}

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Standard input could not be read.
    #[error("failed to read the scanned payload: {message}")]
    Input {
        /// Description of the read failure.
        message: String,
    },
    /// A file named on the command line could not be read.
    #[error("failed to read '{path}': {message}")]
    ReadFile {
        /// Path that was requested.
        path: PathBuf,
        /// Description of the read failure.
        message: String,
    },
    /// The visit list is not a JSON array of visit rows.
    #[error("invalid visit list: {message}")]
    InvalidVisits {
        /// Parser error message.
        message: String,
    },
    /// The supplied identifier is blank.
    #[error("invalid qr code: {message}")]
    InvalidQrCode {
        /// Validation error message.
        message: String,
    },
    /// The retention window reaches past the earliest representable time.
    #[error("retention window of {days} days is too long")]
    RetentionOutOfRange {
        /// Requested window in days.
        days: i64,
    },
    /// A result could not be rendered as JSON.
    #[error("failed to render output: {message}")]
    Render {
        /// Serializer error message.
        message: String,
    },
    /// The domain rejected the operation.
    #[error(transparent)]
    Domain(#[from] Error),
}

/// JSON shape of the `scan` command result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanReport {
    #[serde(flatten)]
    scan: CheckpointScan,
    movement: Option<GateMovement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<GateRecord>,
}

/// Dependencies the commands run against.
pub struct CliContext<P> {
    scans: Arc<P>,
    clock: Arc<dyn Clock>,
    retention: TimeDelta,
}

impl<P> CliContext<P>
where
    P: QrScanCommand + QrScanQuery,
{
    /// Create a context over `scans`, using `retention` when `prune` has no
    /// explicit window.
    pub fn new(scans: Arc<P>, clock: Arc<dyn Clock>, retention: TimeDelta) -> Self {
        Self {
            scans,
            clock,
            retention,
        }
    }

    /// Run `command` and return its JSON result.
    ///
    /// `input` is read only by `scan` without `--payload`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when input cannot be read or the domain rejects
    /// the operation.
    pub async fn run(&self, command: Command, input: &mut dyn Read) -> Result<Value, CliError> {
        match command {
            Command::Scan(args) => self.scan(args, input).await,
            Command::Status { qr_code } => {
                let qr_code = QrCode::new(qr_code).map_err(|err| CliError::InvalidQrCode {
                    message: err.to_string(),
                })?;
                let record = self.scans.try_qr_scan_data(&qr_code).await?;
                render(&record)
            }
            Command::List => render(&self.scans.try_all_qr_scans().await?),
            Command::Annotate { file } => {
                let text = read_text_file(&file)?;
                let visits: Vec<VisitSummary> =
                    serde_json::from_str(&text).map_err(|err| CliError::InvalidVisits {
                        message: err.to_string(),
                    })?;
                render(&self.scans.update_visits_with_scan_data(visits).await)
            }
            Command::Clear => {
                self.scans.clear_all_qr_scans().await?;
                Ok(json!({ "cleared": true }))
            }
            Command::Prune { older_than_days } => {
                let window = older_than_days
                    .map_or(self.retention, |days| TimeDelta::days(i64::from(days)));
                let cutoff = self.clock.utc().checked_sub_signed(window).ok_or(
                    CliError::RetentionOutOfRange {
                        days: window.num_days(),
                    },
                )?;
                let removed = self.scans.prune_qr_scans(cutoff).await?;
                Ok(json!({ "removed": removed, "cutoff": cutoff }))
            }
        }
    }

    async fn scan(&self, args: ScanArgs, input: &mut dyn Read) -> Result<Value, CliError> {
        let payload = match args.payload.clone() {
            Some(payload) => payload,
            None => read_payload(input)?,
        };
        let checkpoint = GateCheckpoint::new(Arc::clone(&self.scans), Arc::clone(&self.clock));
        let scan = checkpoint.process_scan(&payload).await?;
        let record = if args.confirm {
            Some(checkpoint.confirm(&scan, args.review())?)
        } else {
            None
        };
        debug!(confirmed = record.is_some(), "scan command finished");
        render(&ScanReport {
            movement: scan.movement(),
            scan,
            record,
        })
    }
}

fn read_payload(input: &mut dyn Read) -> Result<String, CliError> {
    let mut payload = String::new();
    input
        .read_to_string(&mut payload)
        .map_err(|err| CliError::Input {
            message: err.to_string(),
        })?;
    Ok(payload)
}

fn read_text_file(path: &Path) -> Result<String, CliError> {
    let read_error = |message: String| CliError::ReadFile {
        path: path.to_path_buf(),
        message,
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| read_error("path must name a file".to_owned()))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|err| read_error(err.to_string()))?;
    directory
        .read_to_string(file_name)
        .map_err(|err| read_error(err.to_string()))
}

fn render<T: Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|err| CliError::Render {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests;
