//! Background sweep driver.
//!
//! Long-running async function intended to be spawned via `tokio::spawn`;
//! accepts a [`CancellationToken`] for graceful shutdown when the owning
//! session ends.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::RequestEngine;

/// Run the periodic sweep loop.
///
/// The first tick fires immediately, covering the sweep-at-startup
/// requirement; after that the engine sweeps once per `interval` until
/// `cancel` is triggered.
pub async fn run_sweeper(engine: Arc<RequestEngine>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Sweep job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Sweep job stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = engine.sweep().await {
                    tracing::error!(error = %e, "Sweep failed");
                }
            }
        }
    }
}
