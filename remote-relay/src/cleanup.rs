//! Background cleanup task for idle devices.
//!
//! Runs periodically to evict devices that have not registered or polled
//! within `devices.expiry_secs`.

use crate::config::CleanupConfig;
use crate::server::RemoteRelay;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Spawn a background cleanup task.
///
/// Returns a handle that can be used to abort the task.
pub fn spawn_cleanup_task(
    relay: Arc<RemoteRelay>,
    config: CleanupConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !config.enabled {
            tracing::info!("Cleanup task disabled");
            return;
        }

        let interval_secs = config.interval_secs;
        tracing::info!("Cleanup task started (interval: {}s)", interval_secs);

        let mut timer = interval(Duration::from_secs(interval_secs));

        loop {
            timer.tick().await;

            let evicted = relay.evict_idle();
            if evicted > 0 {
                tracing::info!(
                    "Cleanup: evicted {} idle devices ({} remaining)",
                    evicted,
                    relay.total_devices()
                );
            } else {
                tracing::debug!("Cleanup: no idle devices");
            }
        }
    })
}
