//! Recipient sources - load the list of people to message for a run
//!
//! This module provides:
//! - RecipientSource trait for loader abstraction
//! - DelimitedSource for header + comma-separated text files
//! - DocumentSource for JSON or YAML arrays of recipient records
//! - build_source factory selecting a loader from configuration

pub mod delimited;
pub mod document;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Recipient;

pub use delimited::DelimitedSource;
pub use document::{DocumentFormat, DocumentSource};

/// Loads an ordered list of recipients from an external resource.
///
/// Load order is dispatch order. Structural failures fail the whole call;
/// no partial results are returned.
#[async_trait]
pub trait RecipientSource: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Vec<Recipient>, LoadError>;
}

/// Errors that abort a run before anything is sent
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read recipient source {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Recipient source {} is not valid UTF-8", .path.display())]
    Encoding { path: PathBuf },

    #[error("Malformed recipient source {}: {message}", .path.display())]
    Malformed { path: PathBuf, message: String },
}

/// Which loader to use; a deployment-time choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Csv,
    Json,
    Yaml,
}

/// Build the loader for the configured source kind
pub fn build_source(kind: SourceKind, delimiter: char) -> Box<dyn RecipientSource> {
    match kind {
        SourceKind::Csv => Box::new(DelimitedSource::new(delimiter)),
        SourceKind::Json => Box::new(DocumentSource::new(DocumentFormat::Json)),
        SourceKind::Yaml => Box::new(DocumentSource::new(DocumentFormat::Yaml)),
    }
}

/// Read a source file as text, stripping a leading byte-order mark
pub(crate) async fn read_text(path: &Path) -> Result<String, LoadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let text = String::from_utf8(bytes).map_err(|_| LoadError::Encoding {
        path: path.to_path_buf(),
    })?;

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}
