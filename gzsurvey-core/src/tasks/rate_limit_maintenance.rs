// gzsurvey-core/src/tasks/rate_limit_maintenance.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use gzsurvey_common::traits::CounterStore;

/// Spawns a background task that drops expired rate-limit windows every `interval`.
pub fn spawn_rate_limit_purge_task(
    store: Arc<dyn CounterStore>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(n) => debug!("Purged {} expired rate-limit keys", n),
                Err(e) => error!("Rate-limit purge failed: {:?}", e),
            }
        }
    })
}
