//! Daemon - scheduled invocation of the dispatch engine
//!
//! - Trigger: cron-driven loop racing each run against a cancellation token
//! - TickState: counters across runs, for logging

pub mod tick;
pub mod trigger;

pub use tick::TickState;
pub use trigger::{Trigger, parse_schedule};
