//! Simulate-only transport.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::MessageTransport;
use crate::domain::{Recipient, SendOutcome};

/// Logs each message instead of sending it and always reports success
#[derive(Debug, Default)]
pub struct DryRunTransport {
    simulated: AtomicUsize,
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sends simulated so far
    pub fn simulated(&self) -> usize {
        self.simulated.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessageTransport for DryRunTransport {
    async fn send(&self, recipient: &Recipient) -> SendOutcome {
        self.simulated.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "Dry run: would send SMS to {} with message: {}",
            recipient.address,
            recipient.body
        );
        SendOutcome::delivered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        let transport = DryRunTransport::new();
        let outcome = transport.send(&Recipient::new("Ada", "+15550100", "hi")).await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.provider_reference(), None);
        assert_eq!(transport.simulated(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_counts_sends() {
        let transport = DryRunTransport::new();
        for i in 0..4 {
            transport.send(&Recipient::new("x", i.to_string(), "")).await;
        }
        assert_eq!(transport.simulated(), 4);
    }
}
