//! Shared CLI plumbing for the collaborator binaries: logging setup and the
//! ctrl-c-to-`CancellationToken` bridge. Grounded on the teacher's
//! `bog-bins::common`, trimmed of the CPU-pinning/real-time-priority flags
//! (this pipeline's `perf::cpu` helpers are wired from `RunConfig`, not CLI
//! flags the teacher's binaries set directly).

use anyhow::Result;
use hft_core::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes `tracing` with `RUST_LOG`, falling back to `level`.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    Ok(())
}

/// Installs a SIGINT handler that cancels `token` exactly once.
pub fn install_shutdown_handler(token: CancellationToken) -> Result<()> {
    ctrlc::set_handler(move || {
        tracing::warn!("received shutdown signal, stopping pipeline");
        token.cancel();
    })?;
    Ok(())
}
