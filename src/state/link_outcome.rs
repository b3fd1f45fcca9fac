/// Link outcome definitions for tracking pipeline progress
///
/// Every candidate link ends a run in exactly one of these states.
use crate::LinkError;
use std::fmt;

/// Represents the final state of a candidate link after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkOutcome {
    // ===== Success =====
    /// Content was extracted, classified, and collected
    Collected,

    // ===== Skips =====
    /// The host's circuit was open; no request was sent
    CircuitOpen,

    /// 403, 404, or malformed response
    PermanentError,

    /// Transient failures exhausted the retry budget
    TransientError,

    /// Every extraction method fell below the quality threshold
    ExtractionFailed,

    /// A redirect stub, browser check, or terms wall with no way past it
    Interstitial,

    // ===== Special =====
    /// Never started because the article limit was reached first
    NotStarted,
}

impl LinkOutcome {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Collected)
    }

    /// Returns true if the link was skipped because of a failure
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::CircuitOpen
                | Self::PermanentError
                | Self::TransientError
                | Self::ExtractionFailed
                | Self::Interstitial
        )
    }

    /// Returns true if a network request was attempted for this link
    pub fn attempted_network(&self) -> bool {
        !matches!(self, Self::CircuitOpen | Self::NotStarted)
    }

    /// Short label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collected => "collected",
            Self::CircuitOpen => "circuit_open",
            Self::PermanentError => "permanent_error",
            Self::TransientError => "transient_error",
            Self::ExtractionFailed => "extraction_failed",
            Self::Interstitial => "interstitial",
            Self::NotStarted => "not_started",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> Vec<Self> {
        vec![
            Self::Collected,
            Self::CircuitOpen,
            Self::PermanentError,
            Self::TransientError,
            Self::ExtractionFailed,
            Self::Interstitial,
            Self::NotStarted,
        ]
    }
}

impl From<&LinkError> for LinkOutcome {
    fn from(error: &LinkError) -> Self {
        match error {
            LinkError::Transient { .. } => Self::TransientError,
            LinkError::Permanent { .. } => Self::PermanentError,
            LinkError::CircuitOpen { .. } => Self::CircuitOpen,
            LinkError::Extraction { .. } => Self::ExtractionFailed,
            LinkError::Interstitial { .. } => Self::Interstitial,
        }
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
