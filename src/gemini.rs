//! # Feature: Gemini Text Generation
//!
//! Single-shot `generateContent` calls against the Gemini REST API.
//!
//! Provider errors are surfaced as `anyhow` errors whose message carries the
//! HTTP code, the provider status and its message, e.g.
//! `Gemini API error 429 RESOURCE_EXHAUSTED: Quota exceeded`.
//!
//! The API key travels in the `x-goog-api-key` header and transport errors are
//! stripped of their URL, so error text never carries the credential.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "x-goog-api-key";

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generates text for `prompt`. `Ok(None)` means the provider answered with nothing usable.
    async fn generate(&self, prompt: &str) -> Result<Option<String>>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    error: GeminiErrorDetails,
}

#[derive(Deserialize, Debug)]
struct GeminiErrorDetails {
    code: Option<u16>,
    message: String,
    status: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any of it is non-blank.
    fn into_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        if let Some(reason) = &candidate.finish_reason {
            debug!("Gemini finish reason: {}", reason);
        }
        let text: String = candidate
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_api_base(GEMINI_API_BASE, api_key, model)
    }

    pub fn with_api_base(api_base: &str, api_key: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(GENERATE_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to build Gemini client: {}", e))?;

        Ok(GeminiClient {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        info!(
            "Generating reply with {} | Prompt: '{}'",
            self.model,
            prompt.chars().take(100).collect::<String>()
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Gemini request failed: {}", e.without_url()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| anyhow!("Gemini returned an unreadable body (status {}): {}", status, e.without_url()))?;

        if status.is_success() {
            let parsed: GenerateResponse = serde_json::from_str(&response_text)
                .map_err(|e| anyhow!("Failed to parse Gemini response: {}", e))?;

            let text = parsed.into_text();
            if text.is_none() {
                warn!("Gemini returned no text");
            }
            Ok(text)
        } else if let Ok(error_response) = serde_json::from_str::<GeminiError>(&response_text) {
            let details = error_response.error;
            error!(
                "Gemini API error: {} (status: {:?})",
                details.message, details.status
            );
            Err(anyhow!(
                "Gemini API error {} {}: {}",
                details.code.unwrap_or_else(|| status.as_u16()),
                details.status.unwrap_or_default(),
                details.message
            ))
        } else {
            error!("Gemini API error (status {}): {}", status, response_text);
            Err(anyhow!("Gemini API error (status {})", status))
        }
    }
}
