//! docwatch - watch, transpile and live-preview documentation.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod logger;
mod pipeline;
mod reload;
mod transpiler;
mod utils;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::ProjectConfig;

/// How long background tasks get to wind down after the command returns
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = ProjectConfig::load(&cli)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let result = runtime.block_on(cli::tasks::run(cli.command(), config));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
