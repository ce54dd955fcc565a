//! `gate-scan` entry-point: wires the file-backed ledger to the CLI adapter.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use gate::config::GateSettings;
use gate::domain::QrScanService;
use gate::inbound::cli::{Cli, CliContext};
use gate::outbound::persistence::FileKeyValueStore;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = GateSettings::load_from_iter([OsString::from("gate-scan")])
        .map_err(|err| eyre!("failed to load gate settings: {err}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main(cli, settings))
}

async fn async_main(cli: Cli, settings: GateSettings) -> Result<()> {
    let store_dir = cli.store_dir.unwrap_or_else(|| settings.store_dir());
    let store_dir = Utf8PathBuf::from_path_buf(store_dir)
        .map_err(|path| eyre!("store directory is not valid UTF-8: {}", path.display()))?;
    let store = FileKeyValueStore::open(&store_dir).wrap_err("open scan ledger store")?;

    let clock = Arc::new(DefaultClock);
    let service = QrScanService::with_storage_key(
        Arc::new(store),
        clock.clone(),
        settings.storage_key().to_owned(),
    );
    let context = CliContext::new(Arc::new(service), clock, settings.retention());

    let output = context.run(cli.command, &mut io::stdin().lock()).await?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output).wrap_err("write command output")?;
    writeln!(stdout).wrap_err("write command output")?;
    Ok(())
}
