//! smsched - Scheduled batch SMS dispatcher
//!
//! On each tick of a cron schedule, smsched loads a recipient list, sends
//! every recipient a text message through the provider's HTTP API with
//! bounded retries and backoff, and reports a per-run summary.

pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod recipients;
pub mod transport;

pub use error::{Result, SmsError};
