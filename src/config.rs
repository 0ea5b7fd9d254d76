use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MEDIA_REPO: &str = "saimahendra282/telegram_bot";
pub const DEFAULT_MEDIA_ROOT: &str = "gifs";
pub const DEFAULT_RESUME_URL: &str =
    "https://raw.githubusercontent.com/saimahendra282/telegram_bot/main/allpurposefin.pdf";
pub const DEFAULT_MEDIA_PROBABILITY: f64 = 0.3;
pub const DEFAULT_PORT: u16 = 6969;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot_token: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub webhook_url: Option<String>,
    pub media_repo: String,
    pub media_root: String,
    pub github_token: Option<String>,
    pub resume_url: String,
    pub reference_info_path: Option<String>,
    /// Chance that a free-text reply also gets a media attachment.
    pub media_probability: f64,
    pub port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let media_probability = match var("MEDIA_PROBABILITY") {
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite())
                .ok_or_else(|| anyhow!("MEDIA_PROBABILITY must be a number, got '{}'", raw))?
                .clamp(0.0, 1.0),
            None => DEFAULT_MEDIA_PROBABILITY,
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow!("PORT must be a valid port number, got '{}': {}", raw, e))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            bot_token: var("BOT_ID")
                .ok_or_else(|| anyhow!("BOT_ID environment variable not set"))?,
            gemini_api_key: var("GEMINI_API")
                .ok_or_else(|| anyhow!("GEMINI_API environment variable not set"))?,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            webhook_url: var("WEBHOOK_URL").map(|url| url.trim_end_matches('/').to_string()),
            media_repo: var("MEDIA_REPO").unwrap_or_else(|| DEFAULT_MEDIA_REPO.to_string()),
            media_root: var("MEDIA_ROOT").unwrap_or_else(|| DEFAULT_MEDIA_ROOT.to_string()),
            github_token: var("GITHUB_TOKEN"),
            resume_url: var("RESUME_URL").unwrap_or_else(|| DEFAULT_RESUME_URL.to_string()),
            reference_info_path: var("REFERENCE_INFO_PATH"),
            media_probability,
            port,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}
