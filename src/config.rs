//! Process configuration, read from environment variables.

use std::env;
use std::fmt;

use thiserror::Error;

use crate::completion::DEFAULT_GEMINI_MODEL;
use crate::ingest::DeliveryMode;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub webhook_secret: String,
    pub github_app_id: u64,
    /// PEM with real newlines.
    pub github_private_key: String,
    pub github_app_name: Option<String>,
    pub database_url: String,
    pub database_max_connections: u32,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub twitter_api_key: String,
    pub twitter_api_secret: String,
    pub port: u16,
    pub delivery_mode: DeliveryMode,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        Ok(AppConfig {
            webhook_secret: require("GITHUB_WEBHOOK_SECRET")?,
            github_app_id: parse("GITHUB_APP_ID", &require("GITHUB_APP_ID")?)?,
            github_private_key: unescape_newlines(&require("GITHUB_PRIVATE_KEY")?),
            github_app_name: get("GITHUB_APP_NAME"),
            database_url: require("DATABASE_URL")?,
            database_max_connections: get("DATABASE_MAX_CONNECTIONS")
                .map(|v| parse("DATABASE_MAX_CONNECTIONS", &v))
                .transpose()?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            twitter_api_key: require("TWITTER_API_KEY")?,
            twitter_api_secret: require("TWITTER_API_SECRET")?,
            port: get("PORT")
                .map(|v| parse("PORT", &v))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
            delivery_mode: get("PUSHPOST_DELIVERY_MODE")
                .map(|v| parse("PUSHPOST_DELIVERY_MODE", &v))
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

/// Keys pasted into a single-line variable carry literal `\n` sequences.
fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("github_app_id", &self.github_app_id)
            .field("github_app_name", &self.github_app_name)
            .field("database_max_connections", &self.database_max_connections)
            .field("gemini_model", &self.gemini_model)
            .field("port", &self.port)
            .field("delivery_mode", &self.delivery_mode)
            .finish_non_exhaustive()
    }
}
