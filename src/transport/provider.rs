//! HTTP provider transport
//!
//! Posts a form-encoded request to `api_base_url` joined with
//! `messages_endpoint`. Any 2xx status is a success. The provider response
//! does not carry a usable message id, so `provider_reference` stays unset.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::MessageTransport;
use crate::config::SmsSettings;
use crate::domain::{Recipient, SendOutcome};
use crate::error::{Result, SmsError};

/// Transport backed by the provider's HTTP API
pub struct ProviderTransport {
    client: Client,
    settings: SmsSettings,
}

impl ProviderTransport {
    /// Create a transport with its own HTTP client
    pub fn new(settings: SmsSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| SmsError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, settings))
    }

    /// Create a transport around an existing client
    pub fn with_client(client: Client, settings: SmsSettings) -> Self {
        Self { client, settings }
    }

    /// Resolve the messages endpoint against the base URL
    pub fn endpoint(&self) -> std::result::Result<Url, String> {
        let base = Url::parse(&self.settings.api_base_url)
            .map_err(|e| format!("Invalid base URL '{}': {}", self.settings.api_base_url, e))?;
        base.join(&self.settings.messages_endpoint)
            .map_err(|e| format!("Invalid endpoint '{}': {}", self.settings.messages_endpoint, e))
    }

    /// Form fields for one message
    fn form<'a>(&'a self, recipient: &'a Recipient) -> [(&'static str, &'a str); 5] {
        [
            ("api_key", self.settings.api_key.as_str()),
            ("senderid", self.settings.sender_id.as_str()),
            ("type", self.settings.message_type.as_str()),
            ("contacts", recipient.address.as_str()),
            ("message", recipient.body.as_str()),
        ]
    }

    async fn post(&self, recipient: &Recipient) -> std::result::Result<SendOutcome, String> {
        let url = self.endpoint()?;

        let response = self
            .client
            .post(url)
            .form(&self.form(recipient))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;

        if status.is_success() {
            log::info!(
                "Sent SMS to {}. StatusCode={}. Response={}",
                recipient.address,
                status.as_u16(),
                text
            );
            Ok(SendOutcome::delivered())
        } else {
            log::warn!(
                "Failed to send SMS to {}. StatusCode={}. Response={}",
                recipient.address,
                status.as_u16(),
                text
            );
            Ok(SendOutcome::failed(format!("Http {}; {}", status.as_u16(), text)))
        }
    }
}

#[async_trait]
impl MessageTransport for ProviderTransport {
    async fn send(&self, recipient: &Recipient) -> SendOutcome {
        match self.post(recipient).await {
            Ok(outcome) => outcome,
            Err(message) => {
                log::error!("Error while sending SMS to {}: {}", recipient.address, message);
                SendOutcome::failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base: &str, endpoint: &str) -> SmsSettings {
        SmsSettings {
            api_base_url: base.to_string(),
            messages_endpoint: endpoint.to_string(),
            api_key: "secret".to_string(),
            sender_id: "ACME".to_string(),
            enable_sending: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_join() {
        let transport = ProviderTransport::new(settings("https://sms.example.com", "/api/http/sms/send")).unwrap();
        assert_eq!(
            transport.endpoint().unwrap().as_str(),
            "https://sms.example.com/api/http/sms/send"
        );
    }

    #[test]
    fn test_endpoint_join_replaces_last_segment() {
        let transport = ProviderTransport::new(settings("https://sms.example.com/v1/base", "send")).unwrap();
        assert_eq!(transport.endpoint().unwrap().as_str(), "https://sms.example.com/v1/send");
    }

    #[test]
    fn test_endpoint_invalid_base() {
        let transport = ProviderTransport::new(settings("not a url", "/send")).unwrap();
        let err = transport.endpoint().unwrap_err();
        assert!(err.contains("Invalid base URL"));
    }

    #[test]
    fn test_form_fields() {
        let transport = ProviderTransport::new(settings("https://sms.example.com", "/send")).unwrap();
        let recipient = Recipient::new("Ada", "+15550100", "hello");
        let form = transport.form(&recipient);

        assert_eq!(
            form,
            [
                ("api_key", "secret"),
                ("senderid", "ACME"),
                ("type", "plain"),
                ("contacts", "+15550100"),
                ("message", "hello"),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_with_malformed_url_fails() {
        let transport = ProviderTransport::new(settings("::::", "/send")).unwrap();
        let outcome = transport.send(&Recipient::new("Ada", "1", "hi")).await;

        assert!(!outcome.succeeded());
        assert!(outcome.error_detail().unwrap().contains("Invalid base URL"));
    }
}
