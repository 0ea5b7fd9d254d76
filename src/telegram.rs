//! Outbound side of the Telegram Bot API.
//!
//! [`Messenger`] is what the command router talks to; [`TelegramClient`] is the
//! HTTP implementation.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, error};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::media::{MediaItem, MediaKind};

pub type ChatId = i64;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);
const MEDIA_TIMEOUT: Duration = Duration::from_secs(15);
const DOCUMENT_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends an HTML-formatted text message.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Sends a document by URL.
    async fn send_document(&self, chat_id: ChatId, document_url: &str, caption: Option<&str>) -> Result<()>;

    /// Sends a media item using the method that fits its kind.
    async fn send_media(&self, chat_id: ChatId, media: &MediaItem, caption: Option<&str>) -> Result<()>;

    /// Registers `url` as the webhook and returns the raw API response.
    async fn set_webhook(&self, url: &str) -> Result<Value>;

    /// Returns the raw `getWebhookInfo` response.
    async fn webhook_info(&self) -> Result<Value>;
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    ok: bool,
    result: Option<Value>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    bot_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Self {
        Self::with_api_base(TELEGRAM_API_BASE, bot_token)
    }

    pub fn with_api_base(api_base: &str, bot_token: &str) -> Self {
        TelegramClient {
            client: reqwest::Client::new(),
            bot_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.bot_url, method)
    }

    /// Calls a Bot API method and returns the full response body.
    async fn call(&self, method: &str, payload: Value, timeout: Duration) -> Result<Value> {
        debug!("Calling Telegram method {}", method);

        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Telegram {} request failed: {}", method, e.without_url()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| anyhow!("Telegram {} returned an unreadable body (status {}): {}", method, status, e.without_url()))?;

        let parsed: ApiResponse = serde_json::from_value(body.clone())
            .map_err(|e| anyhow!("Unexpected Telegram {} response: {}", method, e))?;

        if !parsed.ok {
            error!(
                "Telegram {} failed: {} (code {:?})",
                method,
                parsed.description.as_deref().unwrap_or("no description"),
                parsed.error_code
            );
            return Err(anyhow!(
                "Telegram {} error {}: {}",
                method,
                parsed.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                parsed.description.unwrap_or_else(|| "no description".to_string())
            ));
        }

        debug!("Telegram {} ok: {}", method, parsed.result.is_some());
        Ok(body)
    }
}

/// Bot API method and payload field for each media kind.
pub fn media_method(kind: MediaKind) -> (&'static str, &'static str) {
    match kind {
        MediaKind::Animation => ("sendAnimation", "animation"),
        MediaKind::Video => ("sendVideo", "video"),
        MediaKind::Photo => ("sendPhoto", "photo"),
    }
}

fn with_caption(mut payload: Value, caption: Option<&str>) -> Value {
    if let Some(caption) = caption {
        payload["caption"] = json!(caption);
        payload["parse_mode"] = json!("HTML");
    }
    payload
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        self.call("sendMessage", payload, MESSAGE_TIMEOUT).await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, document_url: &str, caption: Option<&str>) -> Result<()> {
        let payload = with_caption(
            json!({
                "chat_id": chat_id,
                "document": document_url,
            }),
            caption,
        );
        self.call("sendDocument", payload, DOCUMENT_TIMEOUT).await?;
        Ok(())
    }

    async fn send_media(&self, chat_id: ChatId, media: &MediaItem, caption: Option<&str>) -> Result<()> {
        let (method, field) = media_method(media.kind);
        let mut payload = json!({ "chat_id": chat_id });
        payload[field] = json!(media.url);
        let payload = with_caption(payload, caption);

        self.call(method, payload, MEDIA_TIMEOUT).await?;
        Ok(())
    }

    async fn set_webhook(&self, url: &str) -> Result<Value> {
        self.call("setWebhook", json!({ "url": url }), MESSAGE_TIMEOUT).await
    }

    async fn webhook_info(&self) -> Result<Value> {
        self.call("getWebhookInfo", json!({}), MESSAGE_TIMEOUT).await
    }
}
