//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Mist API endpoints and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Site directory retry behavior
    #[serde(default)]
    pub retry: RetryConfig,

    /// Live stream settings
    #[serde(default)]
    pub stream: StreamConfig,

    /// Guest detection rules
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Output location for guest records
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply credential overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("MIST_API_TOKEN") {
            self.api.token = token;
        }
        if let Some(org_id) = lookup("MIST_ORG_ID") {
            self.api.org_id = org_id;
        }
        if let Some(url) = lookup("MIST_API_URL") {
            self.api.url = url;
        }
        if let Some(url) = lookup("MIST_STREAM_URL") {
            self.api.stream_url = url;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.token.trim().is_empty() {
            return Err(AppError::validation(
                "api.token is empty (set it or MIST_API_TOKEN)",
            ));
        }
        if self.api.org_id.trim().is_empty() {
            return Err(AppError::validation(
                "api.org_id is empty (set it or MIST_ORG_ID)",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.stream.reconnect_delay_secs == 0 {
            return Err(AppError::validation(
                "stream.reconnect_delay_secs must be > 0",
            ));
        }
        if self.classifier.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(AppError::validation("No guest keywords defined"));
        }
        if self.logging.dir.is_some() && self.logging.file_name.trim().is_empty() {
            return Err(AppError::validation("logging.file_name is empty"));
        }
        if self.logging.max_files == 0 {
            return Err(AppError::validation("logging.max_files must be > 0"));
        }
        if self.storage.file_prefix.trim().is_empty() {
            return Err(AppError::validation("storage.file_prefix is empty"));
        }
        Ok(())
    }
}

/// Mist REST and stream endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST base URL; a missing trailing slash is added when joining
    #[serde(default = "defaults::api_url")]
    pub url: String,

    /// WebSocket stream URL
    #[serde(default = "defaults::stream_url")]
    pub stream_url: String,

    /// Organization whose sites are monitored
    #[serde(default)]
    pub org_id: String,

    /// API token, sent as `Authorization: Token <token>`
    #[serde(default)]
    pub token: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: defaults::api_url(),
            stream_url: defaults::stream_url(),
            org_id: String::new(),
            token: String::new(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Retry settings for the site directory fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts before giving up
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// First backoff interval in seconds
    #[serde(default = "defaults::initial_backoff")]
    pub initial_backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            initial_backoff_secs: defaults::initial_backoff(),
        }
    }
}

/// Stream connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Fixed delay before reconnecting
    #[serde(default = "defaults::reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

impl StreamConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: defaults::reconnect_delay(),
        }
    }
}

/// Guest classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// SSID substrings (case-insensitive) that mark a guest network
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keywords: defaults::keywords(),
        }
    }
}

/// Guest record output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the daily record files
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    /// File name prefix, followed by `-YYYY-MM-DD.jsonl`
    #[serde(default = "defaults::file_prefix")]
    pub file_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            file_prefix: defaults::file_prefix(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Directory for rolling log files, in addition to stderr
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Log file name; rotated files get a date suffix
    #[serde(default = "defaults::log_file_name")]
    pub file_name: String,

    /// Rotated log files kept before the oldest is deleted
    #[serde(default = "defaults::log_max_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            dir: None,
            file_name: defaults::log_file_name(),
            max_files: defaults::log_max_files(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Api defaults
    pub fn api_url() -> String {
        "https://api.eu.mist.com/api/v1/".into()
    }
    pub fn stream_url() -> String {
        "wss://api-ws.eu.mist.com/api-ws/v1/stream".into()
    }
    pub fn user_agent() -> String {
        "guest-logger/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        5
    }
    pub fn initial_backoff() -> u64 {
        1
    }

    // Stream defaults
    pub fn reconnect_delay() -> u64 {
        5
    }

    // Classifier defaults
    pub fn keywords() -> Vec<String> {
        vec!["guest".into(), "invite".into(), "hotspot".into()]
    }

    // Storage defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from(".")
    }
    pub fn file_prefix() -> String {
        "mist-guests-logger-logs".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn log_file_name() -> String {
        "application.log".into()
    }
    pub fn log_max_files() -> usize {
        5
    }
}
