use std::collections::HashMap;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub timezone: TimezoneConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub pretty: bool,
}

/// Timezone lookup settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimezoneConfig {
    /// Non-IANA TZID to IANA name, consulted before the timezone database.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating it fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("output.pretty", true)?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks values that deserialize fine but cannot be used.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` for an empty log level or an alias
    /// with an empty key or target.
    pub fn validate(&self) -> CoreResult<()> {
        if self.logging.level.trim().is_empty() {
            return Err(CoreError::ConfigError("logging.level is empty".to_string()));
        }

        for (from, to) in &self.timezone.aliases {
            if from.trim().is_empty() || to.trim().is_empty() {
                return Err(CoreError::ConfigError(format!(
                    "timezone alias {from:?} -> {to:?} has an empty side"
                )));
            }
        }

        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(
        aliases = settings.timezone.aliases.len(),
        "Configuration loaded"
    );
    Ok(settings)
}
