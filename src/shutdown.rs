//! Cooperative shutdown signal handling.
//!
//! Both transport bindings stop on the same signals: SIGINT/SIGTERM on
//! Unix, Ctrl+C on Windows. Shutdown is cooperative — in-flight sessions
//! are allowed to drain, never aborted.

use std::io;

/// Resolves when a shutdown signal is received.
///
/// # Errors
///
/// Returns an error if the signal handler cannot be installed.
#[cfg(unix)]
pub async fn wait() -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

    tokio::select! {
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    Ok(())
}

/// Resolves when a shutdown signal is received.
///
/// # Errors
///
/// Returns an error if the signal handler cannot be installed.
#[cfg(windows)]
pub async fn wait() -> io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    Ok(())
}
