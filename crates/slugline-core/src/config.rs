use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::DEFAULT_MAX_WRITE_ATTEMPTS;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Only required when the `PostgreSQL` store is used.
    pub database: Option<DatabaseConfig>,
    pub logging: LoggingConfig,
    pub slug: SlugConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u8,
}

const fn default_max_connections() -> u8 {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlugConfig {
    /// Write attempts allowed after storage-level slug conflicts before a
    /// save gives up.
    pub max_write_attempts: u32,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `config.toml` into `Settings`. Environment variables take precedence.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(config::File::with_name("config.toml").required(false))
                .add_source(
                    config::Environment::with_prefix("SLUGLINE")
                        .separator("__")
                        .ignore_empty(true)
                        .try_parsing(true),
                ),
        )
    }

    /// ## Summary
    /// Applies the defaults to a caller-supplied builder and deserializes it.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        Ok(builder
            .set_default("logging.level", "info")?
            .set_default(
                "slug.max_write_attempts",
                i64::from(DEFAULT_MAX_WRITE_ATTEMPTS),
            )?
            .build()?
            .try_deserialize::<Self>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
