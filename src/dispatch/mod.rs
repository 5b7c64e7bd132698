//! Dispatch core - retry policy, delays and the run engine
//!
//! This module provides:
//! - RetryPolicy / Backoff: bounded attempts and the wait between them
//! - Delay trait with a tokio-backed timer and a recording test double
//! - DispatchEngine: loads recipients and drives each to a terminal state

pub mod delay;
pub mod engine;
pub mod policy;

pub use delay::{Delay, RecordingDelay, TokioDelay};
pub use engine::{DispatchEngine, NO_ADDRESS_ERROR};
pub use policy::{Backoff, Decision, RetryPolicy};
