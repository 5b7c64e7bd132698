//! Dispatch engine - one run over every recipient
//!
//! Each recipient goes through an explicit state machine:
//!
//! ```text
//! Attempting(n) --success--------------------> Finished(Success)
//! Attempting(n) --failure, n == max----------> Finished(Exhausted)
//! Attempting(n) --failure, n < max-----------> BackingOff(n) --delay--> Attempting(n + 1)
//! ```
//!
//! Recipients never share retry budgets. Results are reported in load order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use super::delay::{Delay, TokioDelay};
use super::policy::{Decision, RetryPolicy};
use crate::config::Config;
use crate::domain::{Recipient, RecipientOutcome, RunReport, SendOutcome, Terminal};
use crate::error::Result;
use crate::recipients::{LoadError, RecipientSource, build_source};
use crate::transport::{MessageTransport, build_transport};

/// Error recorded for recipients that cannot be sent to
pub const NO_ADDRESS_ERROR: &str = "recipient has no address";

/// Per-recipient retry state
#[derive(Debug)]
enum AttemptState {
    Attempting { attempt: u32 },
    BackingOff { attempt: u32, delay: Duration },
    Finished {
        terminal: Terminal,
        outcome: SendOutcome,
        attempts: u32,
    },
}

/// Loads recipients and sends to each under the retry policy
pub struct DispatchEngine {
    source: Box<dyn RecipientSource>,
    source_path: PathBuf,
    transport: Arc<dyn MessageTransport>,
    policy: RetryPolicy,
    delay: Arc<dyn Delay>,
    concurrency: usize,
}

impl DispatchEngine {
    /// Create an engine with the default policy, real delays and sequential dispatch
    pub fn new(
        source: Box<dyn RecipientSource>,
        source_path: impl Into<PathBuf>,
        transport: Arc<dyn MessageTransport>,
    ) -> Self {
        Self {
            source,
            source_path: source_path.into(),
            transport,
            policy: RetryPolicy::default(),
            delay: Arc::new(TokioDelay),
            concurrency: 1,
        }
    }

    /// Build an engine from configuration, resolving the source path against `base_dir`
    pub fn from_config(config: &Config, base_dir: &Path) -> Result<Self> {
        config.retry.validate()?;

        let source = build_source(config.source.format, config.source.delimiter);
        let transport = build_transport(&config.sms)?;

        Ok(Self::new(source, config.source.resolve(base_dir), transport)
            .with_policy(config.retry)
            .with_concurrency(config.dispatch.concurrency))
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the delay used between attempts
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Maximum recipients in flight at once (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run entrypoint: load, dispatch, summarize.
    ///
    /// A load failure aborts the run before any message is sent.
    pub async fn run(&self) -> std::result::Result<RunReport, LoadError> {
        tracing::info!(source = %self.source_path.display(), "Dispatch run started");

        let recipients = match self.source.load(&self.source_path).await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load recipients, aborting run");
                return Err(e);
            }
        };

        tracing::info!(count = recipients.len(), "Loaded recipients");

        let report = self.dispatch(recipients).await;

        tracing::info!(
            total = report.summary.total_recipients,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            "Dispatch run complete"
        );

        Ok(report)
    }

    /// Send to every recipient and aggregate the results.
    ///
    /// A slot is released as soon as its recipient finishes, so a recipient
    /// in backoff never holds back one queued behind it.
    pub async fn dispatch(&self, recipients: Vec<Recipient>) -> RunReport {
        let mut indexed: Vec<(usize, RecipientOutcome)> = futures::stream::iter(recipients.into_iter().enumerate())
            .map(|(index, recipient)| async move { (index, self.deliver(recipient).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        RunReport::from_outcomes(indexed.into_iter().map(|(_, outcome)| outcome).collect())
    }

    /// Drive one recipient's retry sequence to a terminal state
    pub async fn deliver(&self, recipient: Recipient) -> RecipientOutcome {
        if !recipient.is_addressable() {
            tracing::warn!(name = %recipient.name, "Skipping recipient with no address");
            return RecipientOutcome {
                recipient,
                outcome: SendOutcome::failed(NO_ADDRESS_ERROR),
                attempts: 0,
                terminal: Terminal::Skipped,
            };
        }

        let mut state = AttemptState::Attempting { attempt: 1 };

        loop {
            state = match state {
                AttemptState::Attempting { attempt } => self.attempt(&recipient, attempt).await,
                AttemptState::BackingOff { attempt, delay } => {
                    tracing::info!(
                        address = %recipient.address,
                        delay_secs = delay.as_secs_f64(),
                        "Retrying SMS after backoff"
                    );
                    self.delay.sleep(delay).await;
                    AttemptState::Attempting { attempt: attempt + 1 }
                }
                AttemptState::Finished {
                    terminal,
                    outcome,
                    attempts,
                } => {
                    log_result(&recipient, &outcome);
                    return RecipientOutcome {
                        recipient,
                        outcome,
                        attempts,
                        terminal,
                    };
                }
            };
        }
    }

    async fn attempt(&self, recipient: &Recipient, attempt: u32) -> AttemptState {
        tracing::info!(
            address = %recipient.address,
            attempt,
            max_attempts = self.policy.max_attempts,
            "Sending SMS"
        );

        let outcome = self.transport.send(recipient).await;

        match self.policy.decide(attempt, &outcome) {
            Decision::Succeeded => AttemptState::Finished {
                terminal: Terminal::Success,
                outcome,
                attempts: attempt,
            },
            Decision::Exhausted => {
                tracing::warn!(
                    address = %recipient.address,
                    attempts = attempt,
                    error = outcome.error_detail().unwrap_or("(unknown error)"),
                    "Giving up sending SMS"
                );
                AttemptState::Finished {
                    terminal: Terminal::Exhausted,
                    outcome,
                    attempts: attempt,
                }
            }
            Decision::RetryAfter(delay) => AttemptState::BackingOff { attempt, delay },
        }
    }
}

fn log_result(recipient: &Recipient, outcome: &SendOutcome) {
    match outcome {
        SendOutcome::Delivered { provider_reference } => tracing::info!(
            address = %recipient.address,
            provider_reference = provider_reference.as_deref().unwrap_or("(none)"),
            "SMS send success"
        ),
        SendOutcome::Failed { error } => tracing::warn!(
            address = %recipient.address,
            error = %error,
            "SMS send FAILED"
        ),
    }
}
