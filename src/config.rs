//! Configuration for the marathon bot.

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryConfig;
use crate::scraper::{CONTEST_URL, USER_AGENT};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// LINE Messaging API credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default)]
    pub channel_access_token: String,
    #[serde(default)]
    pub channel_secret: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    "https://api.line.me".to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            channel_secret: String::new(),
            api_base: default_api_base(),
        }
    }
}

// Keep credentials out of logs
impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_access_token", &redact(&self.channel_access_token))
            .field("channel_secret", &redact(&self.channel_secret))
            .field("api_base", &self.api_base)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_factor_secs")]
    pub backoff_factor_secs: f64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    #[serde(default = "default_refresh_interval_hours")]
    pub refresh_interval_hours: u64,
}

fn default_url() -> String {
    CONTEST_URL.to_string()
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_factor_secs() -> f64 {
    1.0
}

fn default_max_backoff_secs() -> u64 {
    120
}

fn default_refresh_interval_hours() -> u64 {
    24
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_factor_secs: default_backoff_factor_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            refresh_interval_hours: default_refresh_interval_hours(),
        }
    }
}

impl ScraperConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            backoff_factor: Duration::from_secs_f64(self.backoff_factor_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_backoff_secs),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_hours.max(1) * 60 * 60)
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

impl AppConfig {
    /// Load configuration from defaults, config file and environment
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::defaults()?
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (MARATHON__SERVER__PORT, etc.)
            .add_source(
                config::Environment::with_prefix("MARATHON")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            // Plain variables set by the hosting platform take precedence
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option(
                "line.channel_access_token",
                std::env::var("CHANNEL_ACCESS_TOKEN").ok(),
            )?
            .set_override_option("line.channel_secret", std::env::var("CHANNEL_SECRET").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
        Ok(config::Config::builder().add_source(config::Config::try_from(&AppConfig::default())?))
    }

    /// Fail unless both LINE credentials are present
    pub fn require_line_credentials(&self) -> anyhow::Result<()> {
        if self.line.channel_access_token.trim().is_empty() {
            anyhow::bail!("LINE channel access token is not set (CHANNEL_ACCESS_TOKEN)");
        }
        if self.line.channel_secret.trim().is_empty() {
            anyhow::bail!("LINE channel secret is not set (CHANNEL_SECRET)");
        }
        Ok(())
    }
}
