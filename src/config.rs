use anyhow::{Context, Result};
use dota_live::fetcher::{DEFAULT_LIVE_GAMES_URL, DEFAULT_TIMEOUT_SECS};
use dota_live::FetcherConfig;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Everything the bot reads from the environment, loaded once in `main`.
#[derive(Clone)]
pub struct BotConfig {
    pub telegram_token:   String,
    pub telegram_api_url: String,
    pub api_key:          String,
    pub live_games_url:   String,
    pub http_timeout:     Duration,
    pub log_dir:          PathBuf,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{name} must be set"))
        };

        let http_timeout_secs = match lookup("DOTA_HTTP_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .with_context(|| format!("DOTA_HTTP_TIMEOUT_SECS must be a positive number: {v:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            telegram_token:   required("TELEGRAM_BOT_TOKEN")?,
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            api_key:          required("API_KEY")?,
            live_games_url:   lookup("DOTA_API_URL")
                .unwrap_or_else(|| DEFAULT_LIVE_GAMES_URL.to_string()),
            http_timeout:     Duration::from_secs(http_timeout_secs),
            log_dir:          lookup("BOT_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
        })
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            endpoint: self.live_games_url.clone(),
            api_key:  self.api_key.clone(),
            timeout:  self.http_timeout,
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("api_key", &"<redacted>")
            .field("live_games_url", &self.live_games_url)
            .field("http_timeout", &self.http_timeout)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}
