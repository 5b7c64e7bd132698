//! Cron trigger - fires the dispatch run on a fixed cadence
//!
//! Each run races against a cancellation token. Cancelling drops the
//! in-flight run, abandoning whatever attempt or backoff it was in.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio_util::sync::CancellationToken;

use super::tick::TickState;
use crate::config::ScheduleConfig;
use crate::domain::RunReport;
use crate::error::{Result, SmsError};
use crate::recipients::LoadError;

/// Parse a cron expression with a seconds field, e.g. `*/30 * * * * *`
pub fn parse_schedule(expr: &str) -> Result<Schedule> {
    Schedule::from_str(expr).map_err(|e| SmsError::Schedule {
        expr: expr.to_string(),
        message: e.to_string(),
    })
}

/// Periodically invokes a dispatch run
#[derive(Debug, Clone)]
pub struct Trigger {
    schedule: Schedule,
    run_on_start: bool,
}

impl Trigger {
    pub fn new(expr: &str) -> Result<Self> {
        Ok(Self {
            schedule: parse_schedule(expr)?,
            run_on_start: false,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Ok(Self::new(&config.cron)?.with_run_on_start(config.run_on_start))
    }

    /// Fire once immediately before waiting for the schedule
    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    /// Next fire time strictly after `from`
    pub fn next_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&from).next()
    }

    /// The next `count` fire times after `from`
    pub fn upcoming(&self, from: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.schedule.after(&from).take(count).collect()
    }

    /// Run `job` on every fire time until `token` is cancelled.
    ///
    /// A failed run is logged and the trigger waits for the next tick.
    pub async fn run<F, Fut>(&self, token: CancellationToken, mut job: F) -> TickState
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<RunReport, LoadError>>,
    {
        let mut state = TickState::new();

        if self.run_on_start && !self.fire(&token, &mut job, &mut state).await {
            return state;
        }

        loop {
            let now = Utc::now();
            let Some(next) = self.next_after(now) else {
                log::warn!("Schedule has no upcoming fire times, stopping trigger");
                break;
            };

            log::info!("Next dispatch run at {}", next.format("%Y-%m-%d %H:%M:%S UTC"));
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = token.cancelled() => {
                    log::info!("Trigger cancelled while idle");
                    break;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            if !self.fire(&token, &mut job, &mut state).await {
                break;
            }
        }

        state
    }

    /// Execute one run; returns false when cancelled mid-run
    async fn fire<F, Fut>(&self, token: &CancellationToken, job: &mut F, state: &mut TickState) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<RunReport, LoadError>>,
    {
        state.fired();
        log::info!("Dispatch run {} executing at {}", state.runs, Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));

        tokio::select! {
            biased;
            result = job() => {
                match result {
                    Ok(report) => state.completed(report.summary),
                    Err(e) => {
                        log::error!("Dispatch run {} failed: {}", state.runs, e);
                        state.failed();
                    }
                }
                true
            }
            _ = token.cancelled() => {
                log::warn!("Trigger cancelled mid-run, abandoning in-flight dispatch");
                state.interrupted();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RunSummary;
    use chrono::TimeZone;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parse_schedule_valid() {
        assert!(parse_schedule("*/30 * * * * *").is_ok());
        assert!(parse_schedule("0 0 9 * * Mon-Fri").is_ok());
    }

    #[test]
    fn test_parse_schedule_invalid() {
        let err = parse_schedule("every thirty seconds").unwrap_err();
        assert!(matches!(err, SmsError::Schedule { .. }));
    }

    #[test]
    fn test_next_after_every_thirty_seconds() {
        let trigger = Trigger::new("*/30 * * * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 10).unwrap();

        assert_eq!(
            trigger.next_after(from),
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 30).unwrap())
        );
    }

    #[test]
    fn test_upcoming() {
        let trigger = Trigger::new("*/30 * * * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let times = trigger.upcoming(from, 3);

        assert_eq!(
            times,
            vec![
                Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 30).unwrap(),
                Utc.with_ymd_and_hms(2026, 1, 1, 12, 1, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 1, 1, 12, 1, 30).unwrap(),
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let config = ScheduleConfig {
            cron: "0 * * * * *".to_string(),
            run_on_start: true,
        };
        let trigger = Trigger::from_config(&config).unwrap();
        assert!(trigger.run_on_start);
    }

    fn report(succeeded: usize) -> RunReport {
        RunReport {
            summary: RunSummary {
                total_recipients: succeeded,
                succeeded,
                failed: 0,
            },
            outcomes: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_fires_until_cancelled() {
        let trigger = Trigger::new("* * * * * *").unwrap().with_run_on_start(true);
        let token = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let job = {
            let token = token.clone();
            let count = count.clone();
            move || {
                let token = token.clone();
                let count = count.clone();
                async move {
                    if count.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                        token.cancel();
                    }
                    Ok(report(2))
                }
            }
        };

        let state = trigger.run(token, job).await;

        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(state.runs, 3);
        assert_eq!(state.completed_runs, 3);
        assert_eq!(state.total_succeeded, 6);
        assert!(!state.interrupted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_does_not_stop_trigger() {
        let trigger = Trigger::new("* * * * * *").unwrap().with_run_on_start(true);
        let token = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let job = {
            let token = token.clone();
            let count = count.clone();
            move || {
                let token = token.clone();
                let count = count.clone();
                async move {
                    let n = count.fetch_add(1, Ordering::SeqCst) + 1;
                    if n == 1 {
                        return Err(LoadError::Encoding {
                            path: PathBuf::from("contacts.csv"),
                        });
                    }
                    token.cancel();
                    Ok(report(1))
                }
            }
        };

        let state = trigger.run(token, job).await;

        assert_eq!(state.runs, 2);
        assert_eq!(state.failed_runs, 1);
        assert_eq!(state.completed_runs, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons_in_flight_run() {
        let trigger = Trigger::new("* * * * * *").unwrap().with_run_on_start(true);
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let state = trigger
            .run(token, || async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(report(1))
            })
            .await;

        assert_eq!(state.runs, 1);
        assert_eq!(state.completed_runs, 0);
        assert!(state.interrupted);
    }

    #[tokio::test]
    async fn test_cancel_while_idle() {
        let trigger = Trigger::new("0 0 0 1 1 *").unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let state = trigger.run(token, || async { Ok(report(0)) }).await;

        assert_eq!(state.runs, 0);
        assert!(!state.interrupted);
    }
}
