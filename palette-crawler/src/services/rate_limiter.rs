//! Page rate limiter
//!
//! Enforces a minimum interval between consecutive page fetches. The wait
//! can be interrupted by a `CancellationToken` so a shutdown request does
//! not sit out a full pause.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with the rate limit
    ///
    /// Returns `false` without recording a request when the token is
    /// cancelled first.
    pub async fn wait_or_cancel(&self, cancel: &CancellationToken) -> bool {
        let mut last = self.last_request.lock().await;

        if let Some(wait_time) = self.remaining(*last) {
            tracing::debug!("Rate limiting: waiting {:?}", wait_time);
            tokio::select! {
                _ = tokio::time::sleep(wait_time) => {}
                _ = cancel.cancelled() => return false,
            }
        }

        *last = Some(Instant::now());
        true
    }

    fn remaining(&self, last: Option<Instant>) -> Option<Duration> {
        let elapsed = last?.elapsed();
        (elapsed < self.min_interval).then(|| self.min_interval - elapsed)
    }
}
