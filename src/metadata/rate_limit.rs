//! Minimum-interval rate limiter shared by every outbound metadata call.
//!
//! Each caller reserves its own slot under the mutex before sleeping, so two
//! concurrent callers never compute the same window and permitted calls are
//! spaced at least `1 / rate` seconds apart.

use std::time::Duration;

use cinedex_common::{Error, Result};
use parking_lot::Mutex;
use tokio::time::Instant;

/// Spaces calls at a fixed minimum interval.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` calls per second.
    ///
    /// A non-positive or non-finite rate is a configuration error.
    pub fn new(rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::invalid_input(format!(
                "rate limit must be a positive number of requests per second, got {}",
                rate
            )));
        }

        Ok(Self {
            interval: Duration::from_secs_f64(1.0 / rate),
            last: Mutex::new(None),
        })
    }

    /// Minimum spacing between two permitted calls.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Suspend until this caller's slot arrives.
    pub async fn wait(&self) {
        let slot = {
            let mut last = self.last.lock();
            let now = Instant::now();
            let slot = match *last {
                Some(prev) => (prev + self.interval).max(now),
                None => now,
            };
            *last = Some(slot);
            slot
        };

        tokio::time::sleep_until(slot).await;

        // A late wake-up pushes the window forward so the next caller is
        // spaced from when this one actually proceeded.
        let now = Instant::now();
        let mut last = self.last.lock();
        if last.map_or(true, |l| l < now) {
            *last = Some(now);
        }
    }
}
