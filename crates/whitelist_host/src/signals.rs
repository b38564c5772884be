//! Shutdown signals for the console host.

use std::io;
use tokio::signal;

/// Resolves with the name of the first shutdown signal received.
///
/// Ctrl+C is watched everywhere; SIGTERM as well on Unix.
pub async fn wait_for_shutdown() -> io::Result<&'static str> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result.map(|()| "Ctrl+C"),
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map(|()| "Ctrl+C")
    }
}
