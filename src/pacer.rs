//! Fixed-delay pacing between consecutive page fetches.

use std::time::Duration;

/// Inserts a fixed pause between pages to stay under the remote rate limit.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait out the interval. A zero interval returns immediately.
    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}
