//! Minimum spacing between outbound model calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Enforces that at least `min_interval` passes between two successful
/// calls to `acquire`. The last-call timestamp is guarded by an async
/// mutex that is held across the wait, so concurrent callers are spaced
/// out one after another instead of all waking at the same instant.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the next call is allowed and record it. Only the
    /// calling task is suspended.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(prev) = *last_call {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!("Rate limited, waiting {:?}", wait);
                sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
