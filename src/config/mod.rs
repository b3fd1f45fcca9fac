//! Configuration module for Sumi-Sift
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key has a default, so an empty file (or no file at all) is a
//! valid configuration; command-line flags are layered on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use sumi_sift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sift.toml")).unwrap();
//! println!("Concurrency: {}", config.pipeline.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CircuitBreakerConfig, Config, DetectionConfig, NetworkConfig, OutputConfig, PipelineConfig,
    RetryConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
