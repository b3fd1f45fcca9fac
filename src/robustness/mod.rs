//! Robustness layer: pacing, retry, and circuit breaking
//!
//! Every network call the pipeline makes goes through [`RobustnessManager`]:
//! - An open circuit fails fast before any pacing wait
//! - A rate-limiter slot is reserved for the host
//! - Admission is taken right before the request, so a circuit that opened
//!   during the pacing wait still rejects it
//! - The collaborator performs one attempt under a timeout
//! - The outcome is classified as success, transient, or permanent
//! - Transient failures feed the circuit breaker and are retried with
//!   exponential backoff until the attempt budget is spent
//!
//! Rendering goes through the same gate with a single attempt.
//!
//! # Failure classes
//!
//! | Outcome | Class | Retried | Counts against circuit |
//! |---------|-------|---------|------------------------|
//! | 2xx | success | - | resets |
//! | 408, 425, 429, 5xx | transient | yes | yes |
//! | timeout, connect, reset | transient | yes | yes |
//! | other 3xx/4xx | permanent | no | resets (host answered) |
//! | malformed response | permanent | no | no |
//! | render timeout, navigation failure | transient | no | yes |
//! | renderer unavailable, launch failure | permanent | no | no |

mod backoff;
mod circuit_breaker;
mod rate_limiter;

pub use backoff::BackoffPolicy;
pub use circuit_breaker::HostRegistry;
pub use rate_limiter::RateLimiter;

use crate::config::Config;
use crate::crawler::{
    FetchError, FetchResponse, Fetcher, HeaderProfile, RenderError, Renderer, WaitStrategy,
};
use crate::url::host_key;
use crate::LinkError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Failure class of an HTTP status or transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Worth retrying: timeout, 5xx, connection reset
    Transient,
    /// Never retried: 403, 404, malformed request or response
    Permanent,
}

/// Classifies an HTTP status; None means the response is usable
pub fn classify_status(status: u16) -> Option<FailureClass> {
    match status {
        200..=299 => None,
        408 | 425 | 429 => Some(FailureClass::Transient),
        500..=599 => Some(FailureClass::Transient),
        _ => Some(FailureClass::Permanent),
    }
}

/// Governs every network call made during a run
pub struct RobustnessManager {
    fetcher: Arc<dyn Fetcher>,
    registry: Arc<HostRegistry>,
    limiter: RateLimiter,
    backoff: BackoffPolicy,
    headers: HeaderProfile,
    timeout: Duration,
}

impl RobustnessManager {
    /// Creates a manager around a fetch collaborator and a host registry
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration (network, retry sections)
    /// * `fetcher` - The network collaborator
    /// * `registry` - Host health registry shared for the run
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>, registry: Arc<HostRegistry>) -> Self {
        Self {
            fetcher,
            registry,
            limiter: RateLimiter::from_config(&config.network),
            backoff: BackoffPolicy::from_config(&config.retry),
            headers: HeaderProfile::new(&config.network),
            timeout: config.network.timeout(),
        }
    }

    pub fn registry(&self) -> &Arc<HostRegistry> {
        &self.registry
    }

    /// Waits for a pacing slot and takes admission for one request
    ///
    /// Returns the circuit generation the request was admitted under, or
    /// None when the circuit rejects it.
    async fn clear(&self, host: &str) -> Option<u64> {
        if !self.registry.would_admit(host, Instant::now()) {
            return None;
        }
        self.limiter.acquire(host).await;
        self.registry.admit(host, Instant::now()).generation()
    }

    /// Fetches `url` under circuit, pacing, and retry control
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResponse)` - A 2xx response
    /// * `Err(LinkError::CircuitOpen)` - The host's circuit rejected the
    ///   request before any I/O
    /// * `Err(LinkError::Permanent)` - A non-retryable status or response
    /// * `Err(LinkError::Transient)` - The retry budget was exhausted, or the
    ///   circuit opened between attempts
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, LinkError> {
        let host = host_key(url);
        let mut attempts: u32 = 0;
        let mut last_reason = String::new();

        loop {
            let Some(generation) = self.clear(&host).await else {
                if attempts == 0 {
                    tracing::debug!("Skipping {}: circuit open for {}", url, host);
                    return Err(LinkError::CircuitOpen { host });
                }
                return Err(LinkError::Transient {
                    url: url.to_string(),
                    attempts,
                    reason: format!("{}; circuit opened", last_reason),
                });
            };
            attempts += 1;

            let headers = self.headers.next_headers(url.as_str());
            let result =
                match tokio::time::timeout(self.timeout, self.fetcher.fetch(url, &headers, self.timeout))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout),
                };

            let reason = match result {
                Ok(response) => match classify_status(response.status) {
                    None => {
                        self.registry.record_success(&host, generation);
                        return Ok(response);
                    }
                    Some(FailureClass::Permanent) => {
                        self.registry.record_success(&host, generation);
                        tracing::debug!("{} answered HTTP {}; not retrying", url, response.status);
                        return Err(LinkError::Permanent {
                            url: url.to_string(),
                            status: Some(response.status),
                            reason: format!("HTTP {}", response.status),
                        });
                    }
                    Some(FailureClass::Transient) => format!("HTTP {}", response.status),
                },
                Err(e) if e.is_transient() => e.to_string(),
                Err(e) => {
                    self.registry.release_trial(&host, generation);
                    return Err(LinkError::Permanent {
                        url: url.to_string(),
                        status: None,
                        reason: e.to_string(),
                    });
                }
            };

            self.registry.record_failure(&host, generation, Instant::now());

            if !self.backoff.should_retry(attempts) {
                tracing::debug!(
                    "Giving up on {} after {} attempt(s): {}",
                    url,
                    attempts,
                    reason
                );
                return Err(LinkError::Transient {
                    url: url.to_string(),
                    attempts,
                    reason,
                });
            }

            let delay = self.backoff.delay_for(attempts - 1);
            tracing::debug!(
                "Retrying {} in {:?} (attempt {}/{}): {}",
                url,
                delay,
                attempts,
                self.backoff.max_attempts,
                reason
            );
            last_reason = reason;
            tokio::time::sleep(delay).await;
        }
    }

    /// Renders `url` through `renderer` under circuit and pacing control
    ///
    /// Rendering is attempted once. A timeout or navigation failure counts
    /// against the host's circuit; a renderer that cannot start does not.
    pub async fn render(
        &self,
        renderer: &dyn Renderer,
        url: &Url,
        wait: &WaitStrategy,
    ) -> Result<String, LinkError> {
        let host = host_key(url);
        let Some(generation) = self.clear(&host).await else {
            tracing::debug!("Not rendering {}: circuit open for {}", url, host);
            return Err(LinkError::CircuitOpen { host });
        };

        let result = match tokio::time::timeout(self.timeout, renderer.render(url, wait, self.timeout))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout),
        };

        match result {
            Ok(markup) => {
                self.registry.record_success(&host, generation);
                Ok(markup)
            }
            Err(e @ (RenderError::Timeout | RenderError::Navigation { .. })) => {
                self.registry.record_failure(&host, generation, Instant::now());
                Err(LinkError::Transient {
                    url: url.to_string(),
                    attempts: 1,
                    reason: e.to_string(),
                })
            }
            Err(e) => {
                self.registry.release_trial(&host, generation);
                Err(LinkError::Permanent {
                    url: url.to_string(),
                    status: None,
                    reason: e.to_string(),
                })
            }
        }
    }
}
