//! Runtime configuration read from the environment (and `.env`).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PREFIX: &str = ";";
const DEFAULT_AUTO_DELETE_SECONDS: u64 = 12;
const DEFAULT_PLAY_COUNTS_PATH: &str = "data/play_counts.json";
const DEFAULT_SETTINGS_DB_PATH: &str = "data/application_data.db";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("{name} must be numeric, got '{value}'")]
    NotNumeric { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Base URL of the JioSaavn-compatible API, without a trailing slash.
    pub jiosaavn_base_url: String,
    pub owner_id: u64,
    pub prefix: String,
    pub auto_delete_enabled: bool,
    pub auto_delete_seconds: u64,
    pub play_counts_path: PathBuf,
    pub settings_db_path: PathBuf,
    pub now_playing_emoji_id: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let discord_token = required("DISCORD_TOKEN")?;
        let jiosaavn_base_url = required("JIOSAAVN_API_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let owner_id = parse_id("OWNER_ID", &required("OWNER_ID")?)?;

        let auto_delete_enabled = get("AUTO_DELETE_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(true);

        // Negative values disable the delay, unparseable ones fall back to the default.
        let auto_delete_seconds = get("AUTO_DELETE_SECONDS")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|v| v.max(0) as u64)
            .unwrap_or(DEFAULT_AUTO_DELETE_SECONDS);

        let now_playing_emoji_id = get("NOW_PLAYING_EMOJI_ID")
            .map(|v| parse_id("NOW_PLAYING_EMOJI_ID", &v))
            .transpose()?;

        Ok(Self {
            discord_token,
            jiosaavn_base_url,
            owner_id,
            prefix: get("BOT_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            auto_delete_enabled,
            auto_delete_seconds,
            play_counts_path: get("PLAY_COUNTS_PATH")
                .unwrap_or_else(|| DEFAULT_PLAY_COUNTS_PATH.to_string())
                .into(),
            settings_db_path: get("SETTINGS_DB_PATH")
                .unwrap_or_else(|| DEFAULT_SETTINGS_DB_PATH.to_string())
                .into(),
            now_playing_emoji_id,
        })
    }

    /// Delay before command replies are deleted, `None` when disabled.
    pub fn auto_delete_delay(&self) -> Option<Duration> {
        (self.auto_delete_enabled && self.auto_delete_seconds > 0)
            .then(|| Duration::from_secs(self.auto_delete_seconds))
    }
}

fn parse_id(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|&id| id != 0)
        .ok_or_else(|| ConfigError::NotNumeric {
            name,
            value: value.to_string(),
        })
}
