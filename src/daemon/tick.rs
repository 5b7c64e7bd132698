//! Trigger state - counters kept across scheduled runs
//!
//! Nothing here feeds back into a run; each run starts fresh. The counters
//! exist for logging and for tests.

use crate::domain::RunSummary;

/// What the trigger has done since it started
#[derive(Debug, Default, Clone)]
pub struct TickState {
    /// Number of runs fired
    pub runs: u64,
    /// Runs that produced a complete report
    pub completed_runs: u64,
    /// Runs aborted by a load error
    pub failed_runs: u64,
    /// Messages delivered across all completed runs
    pub total_succeeded: u64,
    /// Recipients that failed across all completed runs
    pub total_failed: u64,
    /// Summary of the most recent completed run
    pub last_summary: Option<RunSummary>,
    /// Whether the trigger stopped because of cancellation mid-run
    pub interrupted: bool,
}

impl TickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fired run
    pub fn fired(&mut self) {
        self.runs += 1;
    }

    /// Record a run that completed with a report
    pub fn completed(&mut self, summary: RunSummary) {
        self.completed_runs += 1;
        self.total_succeeded += summary.succeeded as u64;
        self.total_failed += summary.failed as u64;
        self.last_summary = Some(summary);
    }

    /// Record a run aborted before dispatch
    pub fn failed(&mut self) {
        self.failed_runs += 1;
    }

    /// Record a run abandoned by cancellation
    pub fn interrupted(&mut self) {
        self.interrupted = true;
    }
}
