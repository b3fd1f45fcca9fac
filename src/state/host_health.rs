use crate::config::CircuitBreakerConfig;
use std::fmt;
use std::time::{Duration, Instant};

/// Circuit state of a single host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Requests flow normally
    Closed,
    /// Requests fail fast until the cooldown elapses
    Open,
    /// One trial request decides between Closed and Open
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        };
        write!(f, "{}", s)
    }
}

/// Decision returned when a request to a host asks for clearance
///
/// Admitted requests carry the circuit generation they were admitted under.
/// Their verdict only counts while that generation is current, so a request
/// admitted before the circuit opened cannot decide a later trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit closed; the request may proceed
    Allowed { generation: u64 },
    /// Circuit half-open; this request is the single trial
    Trial { generation: u64 },
    /// Circuit open (or a trial is already in flight); no I/O allowed
    Rejected {
        /// Time until the circuit will consider a trial request
        retry_after: Duration,
    },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    /// Circuit generation of an admitted request
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::Allowed { generation } | Self::Trial { generation } => Some(*generation),
            Self::Rejected { .. } => None,
        }
    }
}

/// Tracks the health of a host during a run
///
/// This structure holds the circuit breaker state machine for one host.
/// It is mutated only through [`crate::robustness::HostRegistry`], which
/// serializes access across concurrent tasks.
#[derive(Debug, Clone)]
pub struct HostHealth {
    /// Host key (lowercase host, plus port when explicit)
    pub host: String,

    /// Transient failures since the last success
    pub consecutive_failures: u32,

    /// Current circuit state
    pub state: CircuitState,

    /// When the circuit last opened
    pub opened_at: Option<Instant>,

    /// Cooldown applied to the current open period
    pub cooldown: Duration,

    /// Whether the half-open trial request has been handed out
    pub trial_in_flight: bool,

    /// Number of times the circuit has opened during the run
    pub times_opened: u32,

    /// Bumped every time the circuit opens
    pub generation: u64,
}

impl HostHealth {
    /// Creates a new, closed HostHealth for a host
    pub fn new(host: impl Into<String>, config: &CircuitBreakerConfig) -> Self {
        Self {
            host: host.into(),
            consecutive_failures: 0,
            state: CircuitState::Closed,
            opened_at: None,
            cooldown: config.cooldown(),
            trial_in_flight: false,
            times_opened: 0,
            generation: 0,
        }
    }

    /// Asks for clearance to send a request at `now`
    ///
    /// An open circuit whose cooldown has elapsed moves to HalfOpen and hands
    /// out exactly one trial; later callers are rejected until the trial
    /// resolves.
    ///
    /// # Arguments
    ///
    /// * `now` - The current time instant
    ///
    /// # Returns
    ///
    /// The admission decision for this request
    pub fn admit(&mut self, now: Instant) -> Admission {
        let generation = self.generation;
        match self.state {
            CircuitState::Closed => Admission::Allowed { generation },
            CircuitState::Open => match self.time_until_half_open(now) {
                Some(retry_after) => Admission::Rejected { retry_after },
                None => {
                    self.state = CircuitState::HalfOpen;
                    self.trial_in_flight = true;
                    Admission::Trial { generation }
                }
            },
            CircuitState::HalfOpen => {
                if self.trial_in_flight {
                    Admission::Rejected {
                        retry_after: Duration::ZERO,
                    }
                } else {
                    self.trial_in_flight = true;
                    Admission::Trial { generation }
                }
            }
        }
    }

    /// True if [`admit`](Self::admit) would currently let a request through
    pub fn would_admit(&self, now: Instant) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => self.time_until_half_open(now).is_none(),
            CircuitState::HalfOpen => !self.trial_in_flight,
        }
    }

    /// Records a request that reached the host and got an answer
    ///
    /// A success while HalfOpen closes the circuit and restores the base
    /// cooldown. Verdicts from an earlier generation are ignored.
    pub fn record_success(&mut self, config: &CircuitBreakerConfig, generation: u64) {
        if generation != self.generation {
            return;
        }
        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures = 0;
            }
            CircuitState::HalfOpen if self.trial_in_flight => {
                self.state = CircuitState::Closed;
                self.consecutive_failures = 0;
                self.opened_at = None;
                self.cooldown = config.cooldown();
                self.trial_in_flight = false;
            }
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }

    /// Records a transient failure at `now`
    ///
    /// Returns true when this failure transitioned the circuit to Open.
    /// Failures from an earlier generation are ignored.
    pub fn record_failure(
        &mut self,
        config: &CircuitBreakerConfig,
        generation: u64,
        now: Instant,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                if self.consecutive_failures >= config.failure_threshold {
                    self.open(now);
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen if self.trial_in_flight => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                let grown = self.cooldown.as_secs_f64() * config.cooldown_multiplier;
                self.cooldown = Duration::from_secs_f64(grown).min(config.max_cooldown());
                self.trial_in_flight = false;
                self.open(now);
                true
            }
            CircuitState::HalfOpen | CircuitState::Open => false,
        }
    }

    /// Releases a half-open trial that ended without a verdict
    pub fn release_trial(&mut self, generation: u64) {
        if generation == self.generation && self.state == CircuitState::HalfOpen {
            self.trial_in_flight = false;
        }
    }

    /// Calculates the time until an open circuit allows a trial request
    ///
    /// Returns None if the circuit is not open or the cooldown has elapsed.
    pub fn time_until_half_open(&self, now: Instant) -> Option<Duration> {
        if self.state != CircuitState::Open {
            return None;
        }
        let opened_at = self.opened_at?;
        let elapsed = now.saturating_duration_since(opened_at);
        if elapsed < self.cooldown {
            Some(self.cooldown - elapsed)
        } else {
            None
        }
    }

    fn open(&mut self, now: Instant) {
        self.state = CircuitState::Open;
        self.opened_at = Some(now);
        self.times_opened += 1;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 3,
            cooldown_secs: 60,
            cooldown_multiplier: 2.0,
            max_cooldown_secs: 150,
        }
    }

    fn open_health(config: &CircuitBreakerConfig, now: Instant) -> HostHealth {
        let mut health = HostHealth::new("example.com", config);
        for _ in 0..config.failure_threshold {
            health.record_failure(config, 0, now);
        }
        health
    }

    fn trial_generation(admission: Admission) -> u64 {
        match admission {
            Admission::Trial { generation } => generation,
            other => panic!("expected a trial, got {:?}", other),
        }
    }

    #[test]
    fn test_new_host_health() {
        let config = create_test_config();
        let health = HostHealth::new("example.com", &config);
        assert_eq!(health.state, CircuitState::Closed);
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.generation, 0);
        assert!(health.opened_at.is_none());
        assert_eq!(health.cooldown, Duration::from_secs(60));
    }

    #[test]
    fn test_closed_admits() {
        let config = create_test_config();
        let mut health = HostHealth::new("example.com", &config);
        assert_eq!(
            health.admit(Instant::now()),
            Admission::Allowed { generation: 0 }
        );
    }

    #[test]
    fn test_opens_at_threshold() {
        let config = create_test_config();
        let mut health = HostHealth::new("example.com", &config);
        let now = Instant::now();

        assert!(!health.record_failure(&config, 0, now));
        assert!(!health.record_failure(&config, 0, now));
        assert_eq!(health.state, CircuitState::Closed);

        assert!(health.record_failure(&config, 0, now));
        assert_eq!(health.state, CircuitState::Open);
        assert_eq!(health.opened_at, Some(now));
        assert_eq!(health.times_opened, 1);
        assert_eq!(health.generation, 1);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let config = create_test_config();
        let mut health = HostHealth::new("example.com", &config);
        let now = Instant::now();

        health.record_failure(&config, 0, now);
        health.record_failure(&config, 0, now);
        health.record_success(&config, 0);
        health.record_failure(&config, 0, now);

        assert_eq!(health.consecutive_failures, 1);
        assert_eq!(health.state, CircuitState::Closed);
    }

    #[test]
    fn test_open_rejects_until_cooldown() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        let later = now + Duration::from_secs(20);
        assert!(!health.would_admit(later));
        match health.admit(later) {
            Admission::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(40));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(health.state, CircuitState::Open);
    }

    #[test]
    fn test_would_admit_does_not_hand_out_trial() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        let after = now + Duration::from_secs(61);
        assert!(health.would_admit(after));
        assert!(health.would_admit(after));
        assert_eq!(health.state, CircuitState::Open);

        health.admit(after);
        assert!(!health.would_admit(after));
    }

    #[test]
    fn test_half_open_allows_exactly_one_trial() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        let after = now + Duration::from_secs(61);
        assert_eq!(health.admit(after), Admission::Trial { generation: 1 });
        assert_eq!(health.state, CircuitState::HalfOpen);
        assert!(!health.admit(after).is_allowed());
        assert!(!health.admit(after).is_allowed());
    }

    #[test]
    fn test_trial_success_closes() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        let after = now + Duration::from_secs(61);
        let generation = trial_generation(health.admit(after));
        health.record_success(&config, generation);

        assert_eq!(health.state, CircuitState::Closed);
        assert_eq!(health.consecutive_failures, 0);
        assert!(health.admit(after).is_allowed());
    }

    #[test]
    fn test_trial_failure_reopens_with_larger_cooldown() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        let after = now + Duration::from_secs(61);
        let generation = trial_generation(health.admit(after));
        assert!(health.record_failure(&config, generation, after));

        assert_eq!(health.state, CircuitState::Open);
        assert_eq!(health.opened_at, Some(after));
        assert_eq!(health.cooldown, Duration::from_secs(120));
        assert_eq!(health.times_opened, 2);
    }

    #[test]
    fn test_cooldown_growth_is_capped() {
        let config = create_test_config();
        let mut now = Instant::now();
        let mut health = open_health(&config, now);

        for _ in 0..4 {
            now += health.cooldown + Duration::from_secs(1);
            let generation = trial_generation(health.admit(now));
            health.record_failure(&config, generation, now);
        }

        assert_eq!(health.cooldown, Duration::from_secs(150));
    }

    #[test]
    fn test_stale_success_does_not_close_open_circuit() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        health.record_success(&config, 0);
        assert_eq!(health.state, CircuitState::Open);
    }

    #[test]
    fn test_stale_verdicts_do_not_decide_trial() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        let after = now + Duration::from_secs(61);
        let generation = trial_generation(health.admit(after));

        // Admitted under generation 0, before the circuit opened
        health.record_success(&config, 0);
        assert_eq!(health.state, CircuitState::HalfOpen);
        assert!(!health.record_failure(&config, 0, after));
        assert_eq!(health.state, CircuitState::HalfOpen);
        health.release_trial(0);
        assert!(health.trial_in_flight);

        health.record_success(&config, generation);
        assert_eq!(health.state, CircuitState::Closed);
    }

    #[test]
    fn test_failures_after_opening_are_not_counted() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        assert!(!health.record_failure(&config, 0, now));
        assert_eq!(health.consecutive_failures, 3);
        assert_eq!(health.times_opened, 1);
    }

    #[test]
    fn test_release_trial_allows_new_trial() {
        let config = create_test_config();
        let now = Instant::now();
        let mut health = open_health(&config, now);

        let after = now + Duration::from_secs(61);
        let generation = trial_generation(health.admit(after));
        health.release_trial(generation);
        assert_eq!(health.admit(after), Admission::Trial { generation });
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CircuitState::HalfOpen), "half-open");
    }
}
