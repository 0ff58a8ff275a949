//! Token-bucket gate shared by every outbound request of one client.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as Governor};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{Error, ErrorKind, Result};

enum Bucket {
    Unlimited,
    Limited(DefaultDirectRateLimiter),
}

/// Caps request throughput at a steady rate with a burst of `max(round(rate), 1)`.
pub struct RateLimiter {
    bucket: Bucket,
    rate: Option<f64>,
    burst: u32,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.rate)
            .field("burst", &self.burst)
            .finish()
    }
}

impl RateLimiter {
    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self {
            bucket: Bucket::Unlimited,
            rate: None,
            burst: 0,
        }
    }

    /// A limiter allowing `per_second` requests per second.
    pub fn new(per_second: f64) -> Result<Self> {
        if !(per_second.is_finite() && per_second > 0.0) {
            return Err(Error::config(format!(
                "rate limit must be a positive number of requests per second, got {}",
                per_second
            )));
        }

        let burst = burst_for(per_second);
        // governor rejects a zero period; anything faster than 1ns is 1ns.
        let period = Duration::from_secs_f64(1.0 / per_second).max(Duration::from_nanos(1));
        let quota = Quota::with_period(period)
            .ok_or_else(|| Error::config(format!("rate limit {} is too high", per_second)))?
            .allow_burst(burst);

        Ok(Self {
            bucket: Bucket::Limited(Governor::direct(quota)),
            rate: Some(per_second),
            burst: burst.get(),
        })
    }

    /// Build from an optional configured rate; `None` is unlimited.
    pub fn from_config(rate: Option<f64>) -> Result<Self> {
        match rate {
            Some(per_second) => Self::new(per_second),
            None => Ok(Self::unlimited()),
        }
    }

    /// Configured requests per second, if limited.
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    /// Bucket capacity; 0 when unlimited.
    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Wait for a token, or fail with `Cancelled` once `cancel` fires.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::new(ErrorKind::Cancelled));
        }

        let Bucket::Limited(limiter) = &self.bucket else {
            return Ok(());
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!("Rate limiter wait cancelled");
                Err(Error::new(ErrorKind::Cancelled))
            }
            _ = limiter.until_ready() => Ok(()),
        }
    }
}

fn burst_for(per_second: f64) -> NonZeroU32 {
    let rounded = per_second.round().clamp(1.0, u32::MAX as f64) as u32;
    NonZeroU32::new(rounded).unwrap_or(NonZeroU32::MIN)
}
