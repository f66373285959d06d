//! Collaborator-facing entry point: loads a `RunConfig` from TOML, reads
//! ticks from a flat replay file, and drives the pipeline until ctrl-c.
//!
//! Grounded on the teacher's per-combo binaries (`simple_spread_simulated`,
//! `simple_spread_paper`) for the "parse CLI args, init logging, run,
//! print stats" shape; collapsed to one binary since this pipeline only
//! ever wires `MarketMaker` + `ExecutionSimulator` (`hft_core::run` doesn't
//! take a strategy/executor choice the way the teacher's `Engine<S, E>`
//! did).

use anyhow::{Context, Result};
use clap::Parser;
use hft_bins::common::{init_logging, install_shutdown_handler};
use hft_core::market_data::FileTickSource;
use hft_core::{run, CancellationToken, RunConfig};
use std::fs::File;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs the market-making pipeline against a tick replay file")]
struct Args {
    /// Path to a TOML `RunConfig`.
    #[arg(short, long)]
    config: String,

    /// Path to a flat file of back-to-back `MarketDataTick` records.
    #[arg(short, long)]
    ticks: String,

    /// Log level, overridden by `RUST_LOG` if set.
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config_text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("reading config file {}", args.config))?;
    let config: RunConfig = toml::from_str(&config_text).context("parsing RunConfig TOML")?;
    config.validate().context("validating RunConfig")?;

    let tick_file = File::open(&args.ticks).with_context(|| format!("opening tick file {}", args.ticks))?;
    let tick_source = Box::new(FileTickSource::new(tick_file));

    let cancellation = CancellationToken::new();
    install_shutdown_handler(cancellation.clone())?;

    tracing::info!("starting pipeline");
    let handle = run(config, cancellation.clone(), tick_source)?;

    while !cancellation.is_cancelled() {
        std::thread::sleep(Duration::from_millis(100));
    }

    tracing::info!("stopping pipeline");
    let positions = handle.positions.clone();
    handle.stop_and_join();

    if let Some(position) = positions.get(1) {
        let snapshot = position.snapshot();
        // Copy out of the packed snapshot before logging: a `tracing` field
        // takes its value by reference, which a packed field can't give.
        let net_position = snapshot.net_position;
        let realized_pnl = snapshot.realized_pnl;
        let unrealized_pnl = snapshot.unrealized_pnl;
        tracing::info!(net_position, realized_pnl, unrealized_pnl, "final position");
    }

    Ok(())
}
