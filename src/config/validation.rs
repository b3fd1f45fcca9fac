use crate::config::types::{
    CircuitBreakerConfig, Config, DetectionConfig, NetworkConfig, OutputConfig, PipelineConfig,
    RetryConfig,
};
use crate::output::OutputFormat;
use crate::ConfigError;

/// Upper bound on links considered beyond the seed
const MAX_ADDITIONAL_PAGES_LIMIT: usize = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pipeline_config(&config.pipeline)?;
    validate_network_config(&config.network)?;
    validate_retry_config(&config.retry)?;
    validate_circuit_breaker_config(&config.circuit_breaker)?;
    validate_detection_config(&config.detection)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates run bounds and extraction thresholds
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.max_additional_pages > MAX_ADDITIONAL_PAGES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_additional_pages must be <= {}, got {}",
            MAX_ADDITIONAL_PAGES_LIMIT, config.max_additional_pages
        )));
    }

    if config.max_articles < 1 {
        return Err(ConfigError::Validation(format!(
            "max_articles must be >= 1, got {}",
            config.max_articles
        )));
    }

    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.max_content_length < config.min_content_length {
        return Err(ConfigError::Validation(format!(
            "max_content_length ({}) must be >= min_content_length ({})",
            config.max_content_length, config.min_content_length
        )));
    }

    Ok(())
}

/// Validates request pacing
fn validate_network_config(config: &NetworkConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.rotate_every < 1 {
        return Err(ConfigError::Validation(format!(
            "rotate_every must be >= 1, got {}",
            config.rotate_every
        )));
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the retry budget
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if !config.factor.is_finite() || config.factor <= 1.0 {
        return Err(ConfigError::Validation(format!(
            "retry factor must be > 1.0 so delays strictly increase, got {}",
            config.factor
        )));
    }

    if config.max_delay_ms < config.base_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max_delay_ms ({}) must be >= base_delay_ms ({})",
            config.max_delay_ms, config.base_delay_ms
        )));
    }

    Ok(())
}

/// Validates circuit breaker tuning
fn validate_circuit_breaker_config(config: &CircuitBreakerConfig) -> Result<(), ConfigError> {
    if config.failure_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "failure_threshold must be >= 1, got {}",
            config.failure_threshold
        )));
    }

    if !config.cooldown_multiplier.is_finite() || config.cooldown_multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "cooldown_multiplier must be >= 1.0, got {}",
            config.cooldown_multiplier
        )));
    }

    if config.max_cooldown_secs < config.cooldown_secs {
        return Err(ConfigError::Validation(format!(
            "max_cooldown_secs ({}) must be >= cooldown_secs ({})",
            config.max_cooldown_secs, config.cooldown_secs
        )));
    }

    Ok(())
}

/// Validates heuristic thresholds
fn validate_detection_config(config: &DetectionConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("platform_threshold", config.platform_threshold),
        ("classification_min_score", config.classification_min_score),
        ("default_confidence", config.default_confidence),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be within [0, 1], got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.format.parse::<OutputFormat>().is_err() {
        return Err(ConfigError::Validation(format!(
            "format must be one of json, markdown, text; got '{}'",
            config.format
        )));
    }

    if config.save && config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty when saving".to_string(),
        ));
    }

    Ok(())
}
