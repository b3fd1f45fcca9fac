//! Per-host request pacing
//!
//! Each host gets a "next free slot" instant. A request reserves the
//! earliest slot at or after now and pushes the next slot forward by the
//! minimum delay plus random jitter, so concurrent tasks targeting the same
//! host are spaced out instead of firing together.

use crate::config::NetworkConfig;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Spaces requests to the same host by a jittered minimum delay
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    jitter: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum delay and jitter bound
    pub fn new(min_delay: Duration, jitter: Duration) -> Self {
        Self {
            min_delay,
            jitter,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a limiter from the network configuration
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.min_delay(), config.jitter())
    }

    /// Samples one inter-request delay: `min_delay + uniform(0..=jitter)`
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.min_delay;
        }
        self.min_delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    /// Reserves the next slot for `host` and returns how long to wait for it
    ///
    /// # Arguments
    ///
    /// * `host` - Host key of the request
    /// * `now` - The current time instant
    ///
    /// # Returns
    ///
    /// The wait before the request may be sent (zero for an idle host)
    pub fn reserve(&self, host: &str, now: Instant) -> Duration {
        let delay = self.next_delay();
        let mut slots = self.next_slot.lock();

        let slot = match slots.get(host) {
            Some(next) if *next > now => *next,
            _ => now,
        };
        slots.insert(host.to_string(), slot + delay);

        slot.saturating_duration_since(now)
    }

    /// Waits until a request to `host` may be sent
    pub async fn acquire(&self, host: &str) {
        let wait = self.reserve(host, Instant::now());
        if !wait.is_zero() {
            tracing::trace!("Pacing {}: waiting {:?}", host, wait);
            tokio::time::sleep(wait).await;
        }
    }
}
