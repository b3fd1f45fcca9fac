//! State module for tracking run progress
//!
//! This module provides state management for hosts and candidate links during a run.
//!
//! # Components
//!
//! - `HostHealth`: Per-host circuit breaker state (closed, open, half-open)
//! - `Admission`: The clearance decision handed to a request
//! - `LinkOutcome`: The final state of each candidate link

mod host_health;
mod link_outcome;

// Re-export main types
pub use host_health::{Admission, CircuitState, HostHealth};
pub use link_outcome::LinkOutcome;
