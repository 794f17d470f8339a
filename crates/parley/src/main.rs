//! # parley
//!
//! Parley relay binary: loads settings, builds the engines and serves
//! `/translate` and `/ws` until Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use parley_core::EngineSet;
use parley_server::{ParleyServer, ServerConfig};
use parley_settings::{LogFormat, ParleySettings};
use tracing::{info, warn};

/// Blocking threads kept for the runtime's own use on top of the engine pool.
const BLOCKING_HEADROOM: usize = 16;

/// Parley speech translation relay.
#[derive(Parser, Debug)]
#[command(name = "parley", about = "Speech translation relay")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Settings file (default `~/.parley/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_parser = ["pretty", "json"])]
    log_format: Option<String>,

    /// Run without transliteration even if enabled in settings.
    #[arg(long)]
    no_transliteration: bool,
}

impl Cli {
    fn settings_path(&self) -> PathBuf {
        self.settings
            .clone()
            .unwrap_or_else(parley_settings::settings_path)
    }

    /// Apply command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut ParleySettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        match self.log_format.as_deref() {
            Some("json") => settings.logging.format = LogFormat::Json,
            Some("pretty") => settings.logging.format = LogFormat::Pretty,
            _ => {}
        }
        if self.no_transliteration {
            settings.engines.transliteration.enabled = false;
        }
    }
}

fn blocking_threads(workers: usize) -> usize {
    workers.saturating_add(BLOCKING_HEADROOM)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args.settings_path();
    let mut settings = parley_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    args.apply(&mut settings);

    parley_logging::init_subscriber(&settings.logging);
    info!(path = %settings_path.display(), "settings loaded");

    // Engine clients are blocking; they must be built and finally dropped
    // outside the async runtime.
    let engines = parley_engines::build_engines(
        &settings.engines,
        Duration::from_millis(settings.pipeline.engine_timeout_ms),
        settings.engines.transliteration.enabled,
    )
    .context("Failed to build engines")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("parley")
        .max_blocking_threads(blocking_threads(settings.pipeline.worker_threads))
        .build()
        .context("Failed to start runtime")?;

    let result = runtime.block_on(serve(&settings, engines.clone()));
    drop(runtime);
    drop(engines);
    result
}

async fn serve(settings: &ParleySettings, engines: EngineSet) -> Result<()> {
    let config = ServerConfig::from_settings(settings);
    let mut server = ParleyServer::new(config, engines);

    match parley_server::metrics::install_recorder() {
        Ok(handle) => server = server.with_metrics(handle),
        Err(e) => warn!(error = %e, "metrics recorder unavailable, /metrics disabled"),
    }

    let running = server.listen().await.context("Failed to bind server")?;
    info!("Parley listening on http://{}", running.local_addr());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("Shutting down...");
    if !running.shutdown().await {
        warn!("some tasks did not stop within the grace period");
    }
    info!("Shutdown complete");
    Ok(())
}
