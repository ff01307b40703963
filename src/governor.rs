// src/governor.rs
//! Per-adapter rate limiting. Spacing is measured call-start to call-start,
//! and each adapter name has its own clock: throttling one source never
//! delays another.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(5);

pub struct RateGovernor {
    min_interval: Duration,
    // Next admissible call-start per adapter name. The lock is only held to
    // compute and record the slot, never across the sleep.
    next_start: Mutex<HashMap<&'static str, Instant>>,
}

impl RateGovernor {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_start: Mutex::new(HashMap::new()),
        }
    }

    /// Suspend until the adapter's minimum spacing since its previous
    /// call-start has elapsed. First call per name proceeds immediately.
    pub async fn wait_turn(&self, name: &'static str) {
        let deadline = {
            let mut next_start = self.next_start.lock().await;
            let now = Instant::now();
            let deadline = match next_start.get(name) {
                Some(prev_start) => (*prev_start + self.min_interval).max(now),
                None => now,
            };
            next_start.insert(name, deadline);
            deadline
        };
        tokio::time::sleep_until(deadline).await;
    }
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
