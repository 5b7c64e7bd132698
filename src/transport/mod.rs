//! Message transport - deliver one message to one recipient
//!
//! This module provides:
//! - MessageTransport trait for provider abstraction
//! - ProviderTransport: form-encoded HTTP POST to the SMS provider
//! - DryRunTransport: logs what would be sent, never touches the network
//! - build_transport factory selecting between them from settings

pub mod dry_run;
pub mod provider;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SmsSettings;
use crate::domain::{Recipient, SendOutcome};
use crate::error::Result;

pub use dry_run::DryRunTransport;
pub use provider::ProviderTransport;

/// Sends a single message to a single recipient.
///
/// Expected provider failures (non-success status, connectivity, timeouts)
/// are reported as `SendOutcome::Failed`, never as errors.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, recipient: &Recipient) -> SendOutcome;
}

/// Build the transport for these settings.
///
/// With sending disabled no HTTP client is created at all.
pub fn build_transport(settings: &SmsSettings) -> Result<Arc<dyn MessageTransport>> {
    if !settings.enable_sending {
        log::info!("Sending disabled, using dry-run transport");
        return Ok(Arc::new(DryRunTransport::new()));
    }

    Ok(Arc::new(ProviderTransport::new(settings.clone())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_transport_dry_run_by_default() {
        let settings = SmsSettings {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let transport = build_transport(&settings).unwrap();

        // Port 9 would refuse; dry-run must not try
        let outcome = transport.send(&Recipient::new("Ada", "1", "hi")).await;
        assert_eq!(outcome, SendOutcome::delivered());
    }

    #[test]
    fn test_build_transport_live() {
        let settings = SmsSettings {
            api_base_url: "http://127.0.0.1:9".to_string(),
            enable_sending: true,
            ..Default::default()
        };
        assert!(build_transport(&settings).is_ok());
    }
}
