//! Application configuration structures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pricing API client settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Polling behavior
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Notification outputs
    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or defaults when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Config not found at {path:?}. Using defaults.");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&content)
            .map_err(|e| AppError::config(format!("Invalid config {}: {e}", path.display())))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.client.user_agent.trim().is_empty() {
            return Err(AppError::validation("client.user_agent is empty"));
        }
        if self.client.timeout_secs == 0 {
            return Err(AppError::validation("client.timeout_secs must be > 0"));
        }
        if self.client.max_concurrent == 0 {
            return Err(AppError::validation("client.max_concurrent must be > 0"));
        }
        Url::parse(&self.client.base_url).map_err(|e| {
            AppError::validation(format!(
                "client.base_url '{}' is not a URL: {e}",
                self.client.base_url
            ))
        })?;
        if self.watcher.interval_secs == 0 {
            return Err(AppError::validation("watcher.interval_secs must be > 0"));
        }
        if self.watcher.searches_file.trim().is_empty() {
            return Err(AppError::validation("watcher.searches_file is empty"));
        }
        if let Some(email) = &self.notify.email {
            if email.smtp_host.trim().is_empty() {
                return Err(AppError::validation("notify.email.smtp_host is empty"));
            }
            if email.from.trim().is_empty() {
                return Err(AppError::validation("notify.email.from is empty"));
            }
            if email.password_file.trim().is_empty() {
                return Err(AppError::validation("notify.email.password_file is empty"));
            }
        }
        Ok(())
    }

    /// Searches file path, relative paths resolved against `base_dir`.
    pub fn searches_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.watcher.searches_file)
    }
}

/// Pricing API client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Value of the `X-API-Key` header
    #[serde(default = "defaults::api_key")]
    pub api_key: String,

    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent route queries within one search
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            api_key: defaults::api_key(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Seconds between polling cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// JSON file with search definitions
    #[serde(default = "defaults::searches_file")]
    pub searches_file: String,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            searches_file: defaults::searches_file(),
        }
    }
}

/// Notification outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Print the full state table after every cycle
    #[serde(default = "defaults::console_enabled")]
    pub console_enabled: bool,

    /// Write an HTML report when fares appear or drop
    #[serde(default)]
    pub html_report: Option<String>,

    /// Write a JSON view of available flights after every cycle
    #[serde(default)]
    pub json_report: Option<String>,

    /// Mail the HTML report when fares appear or drop
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            console_enabled: defaults::console_enabled(),
            html_report: None,
            json_report: None,
            email: None,
        }
    }
}

/// SMTP delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,

    /// STARTTLS submission port
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// Sender address, also the login when `username` is unset
    pub from: String,

    /// Recipient, defaults to `from`
    #[serde(default)]
    pub to: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    /// File holding the SMTP password; must be mode 0600
    pub password_file: String,
}

impl EmailConfig {
    pub fn recipient(&self) -> &str {
        self.to.as_deref().unwrap_or(&self.from)
    }

    pub fn login(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.from)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Client defaults
    pub fn base_url() -> String {
        "https://mobile.southwest.com".into()
    }
    pub fn api_key() -> String {
        "l7xx12ebcbc825eb480faa276e7f192d98d1".into()
    }
    pub fn user_agent() -> String {
        "Southwest/3.0.26 (iPhone; iOS 9.1; Scale/2.00)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Watcher defaults
    pub fn interval() -> u64 {
        60 * 60
    }
    pub fn searches_file() -> String {
        "searches.json".into()
    }

    // Notify defaults
    pub fn console_enabled() -> bool {
        true
    }
    pub fn smtp_port() -> u16 {
        587
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
