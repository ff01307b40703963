// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::pipeline::Pipeline;

/// Spawn the periodic scrape loop. The first tick fires immediately, which
/// doubles as the startup scrape; later ticks follow the configured cadence.
pub fn spawn_scrape_scheduler(pipeline: Arc<Pipeline>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let found = pipeline.run_scheduled().await;
            tracing::info!(
                target: "scheduler",
                found = found.len(),
                interval_secs = interval.as_secs(),
                "scheduled scrape tick"
            );
        }
    })
}
