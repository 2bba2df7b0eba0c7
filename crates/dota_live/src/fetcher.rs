//! Steam Web API client for `IDOTA2Match_570/GetLiveLeagueGames`.

use crate::matches::{LiveMatchList, MatchRecord};
use async_trait::async_trait;
use logger::{now_iso, ApiStatusEvent, EventLogger};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_LIVE_GAMES_URL: &str =
    "http://api.steampowered.com/IDOTA2Match_570/GetLiveLeagueGames/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const SOURCE: &str = "steam_live_league_games";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to live games endpoint failed: {0}")]
    Transport(reqwest::Error),
    #[error("live games endpoint answered HTTP {0}")]
    Status(u16),
    #[error("live games body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Strips the request URL, which carries the API key.
    fn transport(err: reqwest::Error) -> Self {
        FetchError::Transport(err.without_url())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            FetchError::Decode(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct FetcherConfig {
    pub endpoint: String,
    pub api_key:  String,
    pub timeout:  Duration,
}

impl FetcherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_LIVE_GAMES_URL.to_string(),
            api_key:  api_key.into(),
            timeout:  Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for FetcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetcherConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Anything that can produce the current live match list.
///
/// Implementations never fail: a broken provider looks the same as a quiet one.
#[async_trait]
pub trait MatchSource: Send + Sync {
    async fn live_matches(&self) -> LiveMatchList;
}

pub struct LiveMatchFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
    logger: EventLogger,
}

impl LiveMatchFetcher {
    pub fn new(config: FetcherConfig, logger: EventLogger) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("dota-live-bot/", env!("CARGO_PKG_VERSION")))
                .timeout(config.timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            config,
            logger,
        }
    }

    /// One GET against the live games endpoint.
    ///
    /// A well-formed body without `result.games` is an empty list, not an error.
    pub async fn try_fetch_live_matches(&self) -> Result<LiveMatchList, FetchError> {
        let resp = self
            .client
            .get(&self.config.endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let raw = resp.text().await.map_err(FetchError::transport)?;
        let parsed: Value = serde_json::from_str(&raw)?;
        let games = parsed
            .pointer("/result/games")
            .and_then(Value::as_array)
            .map(|list| list.iter().cloned().map(MatchRecord::new).collect())
            .unwrap_or_default();

        Ok(games)
    }

    /// Fail-open wrapper: errors are logged and become an empty list.
    pub async fn fetch_live_matches(&self) -> LiveMatchList {
        match self.try_fetch_live_matches().await {
            Ok(games) => {
                debug!("Fetched {} live league games", games.len());
                self.log_api_ok(games.len());
                games
            }
            Err(e) => {
                warn!("Error fetching live matches: {}", e);
                self.log_api_error(&e);
                Vec::new()
            }
        }
    }

    fn log_api_error(&self, err: &FetchError) {
        let _ = self.logger.log(&ApiStatusEvent {
            ts: now_iso(),
            event: "API_STATUS",
            source: SOURCE.to_string(),
            ok: false,
            status_code: err.status_code(),
            message: err.to_string(),
            items_logged: 0,
        });
    }

    fn log_api_ok(&self, count: usize) {
        let _ = self.logger.log(&ApiStatusEvent {
            ts: now_iso(),
            event: "API_STATUS",
            source: SOURCE.to_string(),
            ok: true,
            status_code: Some(200),
            message: "ok".to_string(),
            items_logged: count,
        });
    }
}

#[async_trait]
impl MatchSource for LiveMatchFetcher {
    async fn live_matches(&self) -> LiveMatchList {
        self.fetch_live_matches().await
    }
}
