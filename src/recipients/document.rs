//! Structured-document recipient loader.
//!
//! The whole file is deserialized as a sequence of recipient records. A
//! missing (`null`) or empty document yields no recipients. Null entries and
//! records with every field empty are skipped.
//!
//! Records use `name`/`address`/`body`, or the contact-style `Name`/`Phone`/
//! `Message`. A record that sets a field under both names (say `address` and
//! `Phone`) is a duplicate field, and the whole document is malformed.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{LoadError, RecipientSource, read_text};
use crate::domain::Recipient;

/// Serialization format of the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

/// Loads recipients from a JSON or YAML array
#[derive(Debug, Clone, Default)]
pub struct DocumentSource {
    format: DocumentFormat,
}

impl DocumentSource {
    pub fn new(format: DocumentFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Parse already-loaded text
    pub fn parse(&self, text: &str) -> Result<Vec<Recipient>, String> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Option<Vec<Option<Recipient>>> = match self.format {
            DocumentFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string())?,
            DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string())?,
        };

        Ok(entries
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter(|r| !r.is_blank())
            .collect())
    }
}

#[async_trait]
impl RecipientSource for DocumentSource {
    async fn load(&self, path: &Path) -> Result<Vec<Recipient>, LoadError> {
        let text = read_text(path).await?;
        let recipients = self.parse(&text).map_err(|message| LoadError::Malformed {
            path: path.to_path_buf(),
            message,
        })?;
        log::debug!("Parsed {} recipients from {}", recipients.len(), path.display());
        Ok(recipients)
    }
}
