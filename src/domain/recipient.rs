//! Recipient records produced by a recipient source.

use serde::{Deserialize, Serialize};

/// One addressable destination plus the message intended for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipient {
    /// Display name, used only for logging
    #[serde(alias = "Name")]
    pub name: String,

    /// Destination identifier, typically a phone number
    #[serde(alias = "Phone")]
    pub address: String,

    /// Message text
    #[serde(alias = "Message")]
    pub body: String,
}

impl Recipient {
    /// Create a new recipient
    pub fn new(name: impl Into<String>, address: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            body: body.into(),
        }
    }

    /// A send attempt is only made when the address is non-empty
    pub fn is_addressable(&self) -> bool {
        !self.address.trim().is_empty()
    }

    /// True when every field is empty
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.address.is_empty() && self.body.is_empty()
    }
}
