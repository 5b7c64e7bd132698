//! Retry policy and backoff strategies.
//!
//! The policy decides, after each attempt, whether a recipient is finished
//! or should be retried and how long to wait first. No wait ever follows
//! the final attempt.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::SendOutcome;
use crate::error::{Result, SmsError};

/// Default number of attempts per recipient
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default linear backoff step (2s after attempt 1, 4s after attempt 2, ...)
pub const DEFAULT_BACKOFF_STEP_MS: u64 = 2000;

/// Delay inserted after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backoff {
    /// Retry immediately
    None,
    /// Same delay after every failure
    Fixed { delay_ms: u64 },
    /// `step * attempt`
    Linear { step_ms: u64 },
    /// `initial * 2^(attempt - 1)`, capped at `max_ms`
    Exponential { initial_ms: u64, max_ms: u64 },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Linear {
            step_ms: DEFAULT_BACKOFF_STEP_MS,
        }
    }
}

impl Backoff {
    /// Wait after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let ms = match *self {
            Backoff::None => 0,
            Backoff::Fixed { delay_ms } => delay_ms,
            Backoff::Linear { step_ms } => step_ms.saturating_mul(u64::from(attempt)),
            Backoff::Exponential { initial_ms, max_ms } => {
                let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
                initial_ms.saturating_mul(factor).min(max_ms)
            }
        };
        Duration::from_millis(ms)
    }
}

/// What to do after an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The attempt succeeded
    Succeeded,
    /// The attempt failed and it was the last one allowed
    Exhausted,
    /// Wait, then make the next attempt
    RetryAfter(Duration),
}

/// Bounded retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Result<Self> {
        let policy = Self { max_attempts, backoff };
        policy.validate()?;
        Ok(policy)
    }

    /// A single attempt, never retried
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SmsError::Config("retry.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Decide what follows `attempt` given its outcome
    pub fn decide(&self, attempt: u32, outcome: &SendOutcome) -> Decision {
        if outcome.succeeded() {
            Decision::Succeeded
        } else if attempt >= self.max_attempts {
            Decision::Exhausted
        } else {
            Decision::RetryAfter(self.backoff.delay_for(attempt))
        }
    }
}
