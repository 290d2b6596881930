//! Taskpulse - task boards and uptime monitors from the terminal.
//!
//! This binary is a thin front-end over `taskpulse-core`: it restores the
//! stored session, gates private commands on it, and renders whatever the
//! API returns as plain text.

mod cli;
mod commands;
mod navigator;
mod render;

use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use taskpulse_core::api::ReqwestTransport;
use taskpulse_core::auth::SessionStore;
use taskpulse_core::config::Config;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use commands::{App, Outcome};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr, or to a daily rolling file when a log directory is
/// given. The returned guard must live until exit so buffered lines flush.
fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("taskpulse")
                .filename_suffix("log")
                .build(dir)
                .with_context(|| format!("Failed to open log directory {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}

fn build_app(cli: &Cli) -> Result<App> {
    let mut config = Config::load()?.with_env()?;
    if let Some(ref server) = cli.server {
        config.server_url = server.clone();
    }
    debug!(server = %config.server_url, backend = %config.session_backend, "Loaded config");

    let session = if cli.no_persist {
        SessionStore::ephemeral()
    } else {
        SessionStore::open(config.session_storage()?)
    };

    let transport = ReqwestTransport::new(config.request_timeout())?;
    Ok(App::new(config, Arc::new(transport), session))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guard = match init_tracing(cli.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("taskpulse starting");

    let result = match build_app(&cli) {
        Ok(mut app) => app.run(cli.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::LoginRequired) => ExitCode::from(2),
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
