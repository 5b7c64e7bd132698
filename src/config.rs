use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::daemon::parse_schedule;
use crate::dispatch::RetryPolicy;
use crate::error::SmsError;
use crate::recipients::SourceKind;
use crate::recipients::delimited::DEFAULT_DELIMITER;

/// Environment variable overriding `sms.api_key`
pub const API_KEY_ENV: &str = "SMSCHED_API_KEY";

/// Environment variable overriding `sms.enable_sending`
pub const ENABLE_SENDING_ENV: &str = "SMSCHED_ENABLE_SENDING";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub schedule: ScheduleConfig,
    pub source: SourceConfig,
    pub sms: SmsSettings,
    pub retry: RetryPolicy,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Cron expression with a seconds field
    pub cron: String,
    /// Fire one run immediately at startup
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: "*/30 * * * * *".to_string(),
            run_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub format: SourceKind,
    pub delimiter: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Data").join("contacts-sample.csv"),
            format: SourceKind::Csv,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl SourceConfig {
    /// Absolute paths are kept; relative ones are joined onto `base`
    pub fn resolve(&self, base: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            base.join(&self.path)
        }
    }
}

/// Provider settings, passed explicitly into the transport
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsSettings {
    /// e.g. `https://sms.example.com`
    pub api_base_url: String,
    /// e.g. `/api/http/sms/send`
    pub messages_endpoint: String,
    pub api_key: String,
    pub sender_id: String,
    /// Provider message type, usually `plain` or `unicode`
    #[serde(rename = "type")]
    pub message_type: String,
    /// When false only log what would be sent
    pub enable_sending: bool,
    pub timeout_ms: u64,
}

impl Default for SmsSettings {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            messages_endpoint: String::new(),
            api_key: String::new(),
            sender_id: String::new(),
            message_type: "plain".to_string(),
            enable_sending: false,
            timeout_ms: 30000,
        }
    }
}

// Keeps the API key out of logs
impl fmt::Debug for SmsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsSettings")
            .field("api_base_url", &self.api_base_url)
            .field("messages_endpoint", &self.messages_endpoint)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("sender_id", &self.sender_id)
            .field("message_type", &self.message_type)
            .field("enable_sending", &self.enable_sending)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Recipients in flight at once; 1 is strictly sequential
    pub concurrency: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            schedule: ScheduleConfig::default(),
            source: SourceConfig::default(),
            sms: SmsSettings::default(),
            retry: RetryPolicy::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.sms.api_key = key;
        }

        if let Some(value) = lookup(ENABLE_SENDING_ENV) {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.sms.enable_sending = true,
                "0" | "false" | "no" => self.sms.enable_sending = false,
                other => log::warn!("Ignoring {}={}: expected true or false", ENABLE_SENDING_ENV, other),
            }
        }
    }

    /// Reject settings the dispatcher cannot run with
    pub fn validate(&self) -> crate::error::Result<()> {
        self.retry.validate()?;

        if self.dispatch.concurrency == 0 {
            return Err(SmsError::Config("dispatch.concurrency must be at least 1".to_string()));
        }

        parse_schedule(&self.schedule.cron)?;

        if self.sms.enable_sending && self.sms.api_base_url.trim().is_empty() {
            return Err(SmsError::Config(
                "sms.api_base_url is required when sending is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Backoff;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.schedule.cron, "*/30 * * * * *");
        assert_eq!(config.source.path, PathBuf::from("Data/contacts-sample.csv"));
        assert_eq!(config.source.format, SourceKind::Csv);
        assert_eq!(config.source.delimiter, ',');
        assert_eq!(config.sms.message_type, "plain");
        assert!(!config.sms.enable_sending);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.dispatch.concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
log_level: debug
schedule:
  cron: "0 0 9 * * *"
source:
  path: /srv/contacts.json
  format: json
sms:
  api_base_url: https://sms.example.com
  messages_endpoint: /api/http/sms/send
  api_key: abc123
  sender_id: ACME
  type: unicode
  enable_sending: true
retry:
  max_attempts: 5
  backoff:
    kind: exponential
    initial_ms: 1000
    max_ms: 8000
"#
        )
        .unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.schedule.cron, "0 0 9 * * *");
        assert_eq!(config.source.format, SourceKind::Json);
        assert_eq!(config.sms.message_type, "unicode");
        assert!(config.sms.enable_sending);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(
            config.retry.backoff,
            Backoff::Exponential {
                initial_ms: 1000,
                max_ms: 8000
            }
        );
        // Unspecified sections keep defaults
        assert_eq!(config.dispatch.concurrency, 1);
        assert_eq!(config.sms.timeout_ms, 30000);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/no/such/smsched.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_source_resolve() {
        let mut source = SourceConfig::default();
        assert_eq!(
            source.resolve(Path::new("/opt/app")),
            PathBuf::from("/opt/app/Data/contacts-sample.csv")
        );

        source.path = PathBuf::from("/data/contacts.csv");
        assert_eq!(source.resolve(Path::new("/opt/app")), PathBuf::from("/data/contacts.csv"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[(API_KEY_ENV, "from-env"), (ENABLE_SENDING_ENV, "true")]));
        assert_eq!(config.sms.api_key, "from-env");
        assert!(config.sms.enable_sending);

        config.apply_overrides(env(&[(API_KEY_ENV, "  "), (ENABLE_SENDING_ENV, "0")]));
        assert_eq!(config.sms.api_key, "from-env");
        assert!(!config.sms.enable_sending);
    }

    #[test]
    fn test_env_override_ignores_garbage() {
        let mut config = Config::default();
        config.sms.enable_sending = true;
        config.apply_overrides(env(&[(ENABLE_SENDING_ENV, "maybe")]));
        assert!(config.sms.enable_sending);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.dispatch.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.schedule.cron = "whenever".to_string();
        assert!(matches!(config.validate(), Err(SmsError::Schedule { .. })));

        let mut config = Config::default();
        config.sms.enable_sending = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = SmsSettings {
            api_key: "super-secret".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
