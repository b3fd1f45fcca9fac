use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Sift
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub network: NetworkConfig,
    pub retry: RetryConfig,
    #[serde(rename = "circuit-breaker")]
    pub circuit_breaker: CircuitBreakerConfig,
    pub detection: DetectionConfig,
    pub output: OutputConfig,
}

/// Run bounds and extraction thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of links to consider beyond the seed page
    #[serde(rename = "max-additional-pages")]
    pub max_additional_pages: usize,

    /// Stop once this many items have been collected
    #[serde(rename = "max-articles")]
    pub max_articles: usize,

    /// Number of fetch/extract/classify tasks in flight at once
    pub concurrency: usize,

    /// Minimum extracted markdown length (characters) for a usable result
    #[serde(rename = "min-content-length")]
    pub min_content_length: usize,

    /// Extracted markdown is truncated to this many characters
    #[serde(rename = "max-content-length")]
    pub max_content_length: usize,

    /// Re-render thin pages in a headless browser
    #[serde(rename = "render-js")]
    pub render_js: bool,

    /// Maximum number of sitemap documents fetched during discovery
    #[serde(rename = "max-sitemaps")]
    pub max_sitemaps: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_additional_pages: 5,
            max_articles: 20,
            concurrency: 3,
            min_content_length: 100,
            max_content_length: 10_000,
            render_js: false,
            max_sitemaps: 20,
        }
    }
}

/// Request pacing and identity
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-attempt timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the random delay added on top of `min-delay-ms`
    #[serde(rename = "jitter-ms")]
    pub jitter_ms: u64,

    /// Fixed user agent; when absent a realistic agent pool is rotated
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    /// Number of requests between user agent rotations
    #[serde(rename = "rotate-every")]
    pub rotate_every: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            min_delay_ms: 800,
            jitter_ms: 1_700,
            user_agent: None,
            rotate_every: 3,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }
}

/// Retry budget for transient failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Multiplier applied per retry
    pub factor: f64,

    /// Upper bound for any single retry delay (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            factor: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

/// Per-host circuit breaker tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open the circuit
    #[serde(rename = "failure-threshold")]
    pub failure_threshold: u32,

    /// Time an open circuit waits before allowing a trial request (seconds)
    #[serde(rename = "cooldown-secs")]
    pub cooldown_secs: u64,

    /// Cooldown growth after a failed trial request
    #[serde(rename = "cooldown-multiplier")]
    pub cooldown_multiplier: f64,

    /// Upper bound for the grown cooldown (seconds)
    #[serde(rename = "max-cooldown-secs")]
    pub max_cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown_secs: 60,
            cooldown_multiplier: 2.0,
            max_cooldown_secs: 600,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn max_cooldown(&self) -> Duration {
        Duration::from_secs(self.max_cooldown_secs)
    }
}

/// Heuristic thresholds for fingerprinting and classification
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum weighted signal match for a named platform
    #[serde(rename = "platform-threshold")]
    pub platform_threshold: f64,

    /// Minimum score for a content type other than the default
    #[serde(rename = "classification-min-score")]
    pub classification_min_score: f64,

    /// Confidence reported when no content type reaches the minimum score
    #[serde(rename = "default-confidence")]
    pub default_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            platform_threshold: 0.5,
            classification_min_score: 0.15,
            default_confidence: 0.1,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format printed to stdout: "json", "markdown", or "text"
    pub format: String,

    /// Directory receiving the timestamped JSON document
    pub directory: String,

    /// Whether the JSON document is written at all
    pub save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            directory: ".".to_string(),
            save: true,
        }
    }
}
