//! Run statistics
//!
//! Every candidate link ends a run with exactly one [`LinkOutcome`]. The
//! counts, plus the hosts whose circuits were left open, summarize how a run
//! went and are logged at the end of every run.

use crate::platform::PlatformFingerprint;
use crate::state::LinkOutcome;
use std::collections::BTreeMap;
use std::time::Duration;

/// Summary of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Detected platform and its confidence
    pub platform: Option<PlatformFingerprint>,

    /// Candidate links yielded by discovery (seed included)
    pub candidates: usize,

    /// Final outcome counts
    pub outcomes: BTreeMap<LinkOutcome, usize>,

    /// Hosts whose circuit was not closed when the run ended
    pub open_circuits: Vec<String>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one candidate link
    pub fn record(&mut self, outcome: LinkOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Count of links with a given outcome
    pub fn count(&self, outcome: LinkOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn collected(&self) -> usize {
        self.count(LinkOutcome::Collected)
    }

    /// Links skipped for any reason
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_skip())
            .map(|(_, count)| count)
            .sum()
    }

    /// Share of candidates that became items, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.candidates == 0 {
            return 0.0;
        }
        (self.collected() as f64 / self.candidates as f64) * 100.0
    }

    /// Logs the statistics through `tracing`
    pub fn log(&self) {
        if let Some(fp) = &self.platform {
            tracing::info!("Platform: {} ({:.0}% confidence)", fp.platform, fp.confidence * 100.0);
        }
        tracing::info!(
            "Run finished in {:.1}s: {} of {} candidate(s) collected ({:.1}%)",
            self.elapsed.as_secs_f64(),
            self.collected(),
            self.candidates,
            self.success_rate()
        );
        for (outcome, count) in &self.outcomes {
            if outcome.is_skip() {
                tracing::info!("  skipped ({}): {}", outcome, count);
            }
        }
        if !self.open_circuits.is_empty() {
            tracing::warn!("Circuits still open: {}", self.open_circuits.join(", "));
        }
    }
}

/// Formats statistics for the terminal
pub fn format_statistics(stats: &RunStatistics) -> String {
    let mut out = String::from("=== Run Statistics ===\n\n");

    if let Some(fp) = &stats.platform {
        out.push_str(&format!(
            "Platform: {} ({:.0}% confidence)\n",
            fp.platform,
            fp.confidence * 100.0
        ));
    }
    out.push_str(&format!("Candidates: {}\n", stats.candidates));
    out.push_str(&format!(
        "Collected:  {} ({:.1}%)\n",
        stats.collected(),
        stats.success_rate()
    ));
    out.push_str(&format!("Skipped:    {}\n", stats.skipped()));

    let mut skip_counts: Vec<_> = stats
        .outcomes
        .iter()
        .filter(|(outcome, _)| outcome.is_skip())
        .collect();
    skip_counts.sort_by(|a, b| b.1.cmp(a.1));
    for (outcome, count) in skip_counts {
        out.push_str(&format!("  {}: {}\n", outcome, count));
    }

    if !stats.open_circuits.is_empty() {
        out.push_str(&format!("Open circuits ({}):\n", stats.open_circuits.len()));
        for host in &stats.open_circuits {
            out.push_str(&format!("  - {}\n", host));
        }
    }
    out.push_str(&format!("Elapsed: {:.1}s\n", stats.elapsed.as_secs_f64()));

    out
}
