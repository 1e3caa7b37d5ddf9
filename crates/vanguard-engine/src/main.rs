//! # Vanguard Engine
//!
//! Headless entry point for Vanguard.
//!
//! Runs a scripted skirmish on the combat core:
//! - Config: sandbox layout and timing (TOML)
//! - Timing: fixed-step clock
//! - Skirmish: stage setup, attack script, event tally
//!
//! Usage: `vanguard [CONFIG]` runs the fight described by `CONFIG`
//! (default `vanguard.toml`); `vanguard --init [CONFIG]` writes the default
//! config there and exits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod skirmish;
mod timing;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{SandboxConfig, CONFIG_FILE};
use crate::skirmish::Skirmish;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("vanguard=info".parse()?))
        .init();

    info!("Vanguard starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let mut config = match args.next().as_deref() {
        Some("--init") => {
            let path = args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
            SandboxConfig::default()
                .save_to(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            return Ok(());
        },
        Some(path) => SandboxConfig::load_from(path),
        None => SandboxConfig::load(),
    };
    config.validate();

    let report = Skirmish::from_config(&config)?.run()?;
    info!(
        hits = report.hits,
        knockbacks = report.knockbacks,
        defeats = report.defeats,
        "Vanguard shutdown complete"
    );
    Ok(())
}
