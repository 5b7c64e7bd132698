//! Send and recipient outcome types.
//!
//! A `SendOutcome` is produced once per transport attempt. The engine keeps
//! only the last one per recipient, wrapped in a `RecipientOutcome` together
//! with how the retry sequence terminated.

use serde::{Deserialize, Serialize};

use super::Recipient;

/// Result of a single send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SendOutcome {
    /// Provider accepted the message
    Delivered {
        /// Opaque id assigned by the provider, when it returns one
        provider_reference: Option<String>,
    },
    /// Provider rejected the message or could not be reached
    Failed { error: String },
}

impl SendOutcome {
    /// Accepted without a provider reference
    pub fn delivered() -> Self {
        SendOutcome::Delivered {
            provider_reference: None,
        }
    }

    /// Accepted with a provider-assigned reference
    pub fn delivered_with_reference(reference: impl Into<String>) -> Self {
        SendOutcome::Delivered {
            provider_reference: Some(reference.into()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        SendOutcome::Failed { error: error.into() }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }

    pub fn provider_reference(&self) -> Option<&str> {
        match self {
            SendOutcome::Delivered { provider_reference } => provider_reference.as_deref(),
            SendOutcome::Failed { .. } => None,
        }
    }

    /// Present iff the attempt did not succeed
    pub fn error_detail(&self) -> Option<&str> {
        match self {
            SendOutcome::Delivered { .. } => None,
            SendOutcome::Failed { error } => Some(error),
        }
    }
}

/// How a recipient's retry sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    /// An attempt succeeded
    Success,
    /// Every allowed attempt failed
    Exhausted,
    /// No attempt was made (recipient has no address)
    Skipped,
}

/// Final outcome for one recipient after its retry sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientOutcome {
    pub recipient: Recipient,
    /// Last attempt's outcome
    pub outcome: SendOutcome,
    /// Transport invocations made for this recipient
    pub attempts: u32,
    pub terminal: Terminal,
}

impl RecipientOutcome {
    pub fn succeeded(&self) -> bool {
        self.terminal == Terminal::Success
    }
}
