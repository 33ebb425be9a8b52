//! Configuration for the bot.

use std::env;
use std::fmt;

use config::builder::DefaultState;
use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use trophy_common::{default_questions, default_rewards, QuizQuestion, RewardItem};

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Reward catalog. Falls back to the built-in trophies.
    #[serde(default = "default_rewards")]
    pub rewards: Vec<RewardItem>,
    /// Quiz questions. Falls back to the built-in questions.
    #[serde(default = "default_questions")]
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token issued by @BotFather
    pub token: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database URL (`sqlite:` prefix optional, `:memory:` allowed)
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    /// Timeout for a single image download, in seconds.
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_image_timeout(),
        }
    }
}

/// HTTP health endpoint for the hosting platform's monitors.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_database_url() -> String {
    "sqlite:./data/trophy.db".to_string()
}
fn default_image_timeout() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. `TELEGRAM_BOT_TOKEN` and `DATABASE_URL`
    /// 2. Environment variables (BOT__SECTION__KEY format)
    /// 3. config.toml file (if present)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = loader()?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("BOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("telegram.token", env::var("TELEGRAM_BOT_TOKEN").ok())?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Address the health endpoint binds to.
    pub fn health_addr(&self) -> String {
        format!("{}:{}", self.health.host, self.health.port)
    }
}

fn loader() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    ConfigLoader::builder()
        .set_default("database.url", default_database_url())?
        .set_default("images.timeout_secs", default_image_timeout() as i64)?
        .set_default("health.port", default_port() as i64)
}
