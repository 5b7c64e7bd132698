//! Run summary and report types.

use serde::{Deserialize, Serialize};

use super::RecipientOutcome;

/// Counts for one run. `succeeded + failed == total_recipients` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_recipients: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one recipient's final result
    pub fn record(&mut self, succeeded: bool) {
        self.total_recipients += 1;
        if succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Everything a run produced: counts plus per-recipient outcomes in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub outcomes: Vec<RecipientOutcome>,
}

impl RunReport {
    /// Build a report, deriving the summary from the outcomes
    pub fn from_outcomes(outcomes: Vec<RecipientOutcome>) -> Self {
        let mut summary = RunSummary::new();
        for outcome in &outcomes {
            summary.record(outcome.succeeded());
        }
        Self { summary, outcomes }
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecipientOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}
