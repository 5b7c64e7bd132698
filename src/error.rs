//! Error types for smsched
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::recipients::LoadError;

/// All error types that can occur in smsched
#[derive(Debug, Error)]
pub enum SmsError {
    /// Recipient source could not be loaded; fatal to the run
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Invalid or inconsistent configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Cron expression could not be parsed
    #[error("Invalid schedule '{expr}': {message}")]
    Schedule { expr: String, message: String },

    /// Transport could not be constructed
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for smsched operations
pub type Result<T> = std::result::Result<T, SmsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_error() {
        let err = SmsError::Config("max_attempts must be at least 1".to_string());
        assert_eq!(err.to_string(), "Config error: max_attempts must be at least 1");
    }

    #[test]
    fn test_schedule_error() {
        let err = SmsError::Schedule {
            expr: "every tuesday".to_string(),
            message: "invalid".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid schedule 'every tuesday': invalid");
    }

    #[test]
    fn test_transport_error() {
        let err = SmsError::Transport("tls backend unavailable".to_string());
        assert_eq!(err.to_string(), "Transport error: tls backend unavailable");
    }

    #[test]
    fn test_load_error_conversion() {
        let load = LoadError::Encoding {
            path: PathBuf::from("contacts.csv"),
        };
        let err: SmsError = load.into();
        assert!(matches!(err, SmsError::Load(_)));
        assert!(err.to_string().contains("contacts.csv"));
    }

    #[test]
    fn test_load_error_keeps_source_chain() {
        use std::error::Error as _;

        let load = LoadError::Read {
            path: PathBuf::from("contacts.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let err: SmsError = load.into();
        assert!(err.to_string().contains("file not found"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u32> {
            Ok(3)
        }

        fn returns_err() -> Result<u32> {
            Err(SmsError::Config("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
