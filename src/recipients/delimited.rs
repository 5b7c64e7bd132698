//! Delimited-text recipient loader.
//!
//! The first line is a header and is always skipped. Each following
//! non-blank line is one record of `name,address,body`, split on a fixed
//! delimiter with every field trimmed. Missing columns become empty strings
//! and extra columns are ignored. Rows whose fields are all empty (`,,`) are
//! skipped, the same as empty records in a document source.

use std::path::Path;

use async_trait::async_trait;

use super::{LoadError, RecipientSource, read_text};
use crate::domain::Recipient;

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Loads recipients from a header + delimited-text file
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    delimiter: char,
}

impl Default for DelimitedSource {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl DelimitedSource {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Parse already-loaded text
    pub fn parse(&self, text: &str) -> Vec<Recipient> {
        text.lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.parse_line(line))
            .filter(|recipient| !recipient.is_blank())
            .collect()
    }

    fn parse_line(&self, line: &str) -> Recipient {
        let mut fields = line.split(self.delimiter).map(str::trim);
        let mut next = || fields.next().unwrap_or_default().to_string();

        let name = next();
        let address = next();
        let body = next();
        Recipient { name, address, body }
    }
}

#[async_trait]
impl RecipientSource for DelimitedSource {
    async fn load(&self, path: &Path) -> Result<Vec<Recipient>, LoadError> {
        let text = read_text(path).await?;
        let recipients = self.parse(&text);
        log::debug!("Parsed {} recipients from {}", recipients.len(), path.display());
        Ok(recipients)
    }
}
