use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::element_finder;
use crate::models::TrackedProduct;

pub const DEFAULT_CONFIG_PATH: &str = "config/default";
pub const DEFAULT_DISCORD_API: &str = "https://discord.com/api/v10";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub products: Vec<TrackedProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub token: String,
    pub channel_id: String,
    pub api_base: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel_id: String::new(),
            api_base: DEFAULT_DISCORD_API.to_string(),
            timeout_secs: 30,
        }
    }
}

impl DiscordConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    /// Per-attempt timeout in seconds.
    pub request_timeout: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay_ms: 5000,
            request_timeout: 30,
            user_agent: concat!("StockWatcher/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub check_interval_secs: u64,
    pub housekeeping_interval_hours: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 15,
            housekeeping_interval_hours: 168,
        }
    }
}

impl SchedulerConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_secs(self.housekeeping_interval_hours * 60 * 60)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub level: String,
    pub retention_days: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_name: "stock_watcher.log".to_string(),
            level: "info".to_string(),
            retention_days: 7,
        }
    }
}

impl LoggingConfig {
    pub fn current_file(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days * 24 * 60 * 60)
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, `STOCKWATCH__*`
    /// environment variables and the plain `DISCORD_TOKEN` /
    /// `DISCORD_CHANNEL_ID` variables, in increasing priority.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("STOCKWATCH").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.discord.token.trim().is_empty() {
            if let Ok(token) = env::var("DISCORD_TOKEN") {
                config.discord.token = token;
            }
        }
        if config.discord.channel_id.trim().is_empty() {
            if let Ok(channel_id) = env::var("DISCORD_CHANNEL_ID") {
                config.discord.channel_id = channel_id;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Build and validate a configuration from TOML text alone.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Credentials
        if self.discord.token.trim().is_empty() {
            return Err(ConfigError::Message("DISCORD_TOKEN is not set".into()));
        }

        if self.discord.channel_id.trim().is_empty() {
            return Err(ConfigError::Message("DISCORD_CHANNEL_ID is not set".into()));
        }

        if self.discord.channel_id.trim().parse::<u64>().is_err() {
            return Err(ConfigError::Message("DISCORD_CHANNEL_ID must be a numeric id".into()));
        }

        if Url::parse(&self.discord.api_base).is_err() {
            return Err(ConfigError::Message("Invalid Discord API base URL".into()));
        }

        if self.discord.timeout_secs == 0 {
            return Err(ConfigError::Message("Discord timeout_secs must be greater than 0".into()));
        }

        // Scraper
        if self.scraper.retry_attempts == 0 {
            return Err(ConfigError::Message("Scraper retry_attempts must be greater than 0".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        // Scheduler
        if self.scheduler.check_interval_secs == 0 {
            return Err(ConfigError::Message("Scheduler check_interval_secs must be greater than 0".into()));
        }

        if self.scheduler.housekeeping_interval_hours == 0 {
            return Err(ConfigError::Message(
                "Scheduler housekeeping_interval_hours must be greater than 0".into(),
            ));
        }

        // Products
        if self.products.is_empty() {
            return Err(ConfigError::Message("At least one product must be configured".into()));
        }

        let mut seen = HashSet::new();
        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(ConfigError::Message("Product name must not be empty".into()));
            }
            if !seen.insert(product.name.as_str()) {
                return Err(ConfigError::Message(format!("Duplicate product name: {}", product.name)));
            }
            let url = Url::parse(&product.url).map_err(|_| {
                ConfigError::Message(format!("Invalid URL for product {}: {}", product.name, product.url))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Message(format!(
                    "Unsupported URL scheme for product {}: {}",
                    product.name,
                    url.scheme()
                )));
            }
            if let Err(e) = element_finder::validate_locator(&product.locator) {
                return Err(ConfigError::Message(format!(
                    "Invalid locator for product {}: {}",
                    product.name, e
                )));
            }
        }

        Ok(())
    }
}
