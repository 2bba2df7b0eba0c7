//! Minimal Telegram Bot API client: getMe, getUpdates long polling, sendMessage.

use anyhow::{Context, Result};
use async_trait::async_trait;
use dota_live::ChatTransport;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Seconds Telegram may hold a getUpdates request open.
pub const LONG_POLL_SECS: u64 = 25;

#[derive(Debug, Deserialize)]
pub struct TgResponse<T> {
    pub ok:          bool,
    pub result:      Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgUser {
    pub id:       i64,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    pub message:   Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub chat:       TgChat,
    pub text:       Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[derive(Clone)]
pub struct TelegramClient {
    client:   reqwest::Client,
    api_base: String,
    token:    String,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            // must outlive the long poll
            .timeout(Duration::from_secs(LONG_POLL_SECS + 10))
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn unwrap_response<T: DeserializeOwned>(resp: reqwest::Response, method: &str) -> Result<T> {
        let status = resp.status();
        // reqwest errors would echo the URL, and the URL holds the token
        let body = resp.text().await.map_err(|e| e.without_url())?;
        if !status.is_success() {
            anyhow::bail!("Telegram {} HTTP {}: {}", method, status, snippet(&body));
        }
        let parsed: TgResponse<T> = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse {}: {}", method, snippet(&body)))?;
        match (parsed.ok, parsed.result) {
            (true, Some(result)) => Ok(result),
            _ => anyhow::bail!(
                "Telegram {} rejected: {}",
                method,
                parsed.description.unwrap_or_default()
            ),
        }
    }

    pub async fn get_me(&self) -> Result<TgUser> {
        let resp = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| e.without_url())?;
        Self::unwrap_response(resp, "getMe").await
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<TgUpdate>> {
        self.updates_with_timeout(offset, LONG_POLL_SECS).await
    }

    /// Confirms everything below `offset` without waiting for new updates, so
    /// Telegram does not redeliver it after a restart.
    pub async fn acknowledge(&self, offset: i64) -> Result<()> {
        self.updates_with_timeout(offset, 0).await.map(|_| ())
    }

    async fn updates_with_timeout(&self, offset: i64, timeout_secs: u64) -> Result<Vec<TgUpdate>> {
        let resp = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ])
            .send()
            .await
            .map_err(|e| e.without_url())?;
        Self::unwrap_response(resp, "getUpdates").await
    }

    /// Plain text, no parse mode: team names are user-controlled.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())?;
        let sent: TgMessage = Self::unwrap_response(resp, "sendMessage").await.map_err(|e| {
            warn!("Telegram sendMessage failed: {}", e);
            e
        })?;
        Ok(sent.message_id)
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await.map(|_| ())
    }
}
