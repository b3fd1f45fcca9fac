//! Per-host circuit breaker registry
//!
//! The registry maps host keys to [`HostHealth`] and is the only state
//! shared between concurrent link tasks. Every transition happens under a
//! single lock, so two tasks can never both flip the same host's circuit.

use crate::config::CircuitBreakerConfig;
use crate::state::{Admission, CircuitState, HostHealth};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Instant;

/// Registry of host health, owned by one run and shared by handle
#[derive(Debug)]
pub struct HostRegistry {
    config: CircuitBreakerConfig,
    hosts: Mutex<HashMap<String, HostHealth>>,
}

impl HostRegistry {
    /// Creates an empty registry
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Asks for clearance to send a request to `host` at `now`
    pub fn admit(&self, host: &str, now: Instant) -> Admission {
        let mut hosts = self.hosts.lock();
        let health = hosts
            .entry(host.to_string())
            .or_insert_with(|| HostHealth::new(host, &self.config));

        let before = health.state;
        let admission = health.admit(now);
        if before != health.state {
            tracing::info!("Circuit for {} is now {}", host, health.state);
        }
        admission
    }

    /// True if a request to `host` would be admitted at `now`
    ///
    /// Does not hand out a half-open trial; callers still go through
    /// [`admit`](Self::admit) right before the request.
    pub fn would_admit(&self, host: &str, now: Instant) -> bool {
        self.hosts
            .lock()
            .get(host)
            .map_or(true, |health| health.would_admit(now))
    }

    /// Records an answered request admitted under `generation`
    pub fn record_success(&self, host: &str, generation: u64) {
        let mut hosts = self.hosts.lock();
        if let Some(health) = hosts.get_mut(host) {
            let before = health.state;
            health.record_success(&self.config, generation);
            if before != health.state {
                tracing::info!("Circuit for {} closed after successful trial", host);
            }
        }
    }

    /// Records a transient failure for `host` at `now`
    ///
    /// Returns the host's circuit state after the failure.
    pub fn record_failure(&self, host: &str, generation: u64, now: Instant) -> CircuitState {
        let mut hosts = self.hosts.lock();
        let health = hosts
            .entry(host.to_string())
            .or_insert_with(|| HostHealth::new(host, &self.config));

        if health.record_failure(&self.config, generation, now) {
            tracing::warn!(
                "Circuit for {} opened after {} consecutive failure(s); cooling down for {:?}",
                host,
                health.consecutive_failures,
                health.cooldown
            );
        }
        health.state
    }

    /// Releases a half-open trial that ended without a verdict
    pub fn release_trial(&self, host: &str, generation: u64) {
        if let Some(health) = self.hosts.lock().get_mut(host) {
            health.release_trial(generation);
        }
    }

    /// Returns a copy of the health record for `host`
    pub fn snapshot(&self, host: &str) -> Option<HostHealth> {
        self.hosts.lock().get(host).cloned()
    }

    /// Current circuit state of `host` (Closed for unknown hosts)
    pub fn state(&self, host: &str) -> CircuitState {
        self.hosts
            .lock()
            .get(host)
            .map(|h| h.state)
            .unwrap_or(CircuitState::Closed)
    }

    /// Hosts whose circuit is currently not closed
    pub fn open_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self
            .hosts
            .lock()
            .values()
            .filter(|h| h.state != CircuitState::Closed)
            .map(|h| h.host.clone())
            .collect();
        hosts.sort();
        hosts
    }
}
