use log::{error, warn};
use std::sync::Arc;

use crate::gemini::LanguageModel;

/// User-facing replacement for a reply the model could not produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFallback {
    Empty,
    ModelMisconfigured,
    Credentials,
    RateLimited,
    Connectivity,
}

impl ReplyFallback {
    /// Maps a provider error message to a fallback. Checks run in this order:
    /// not-found, credentials, quota, anything else.
    pub fn classify(error_message: &str) -> Self {
        let message = error_message.to_lowercase();
        if message.contains("404") || message.contains("not found") {
            ReplyFallback::ModelMisconfigured
        } else if message.contains("api key") || message.contains("authentication") {
            ReplyFallback::Credentials
        } else if message.contains("quota") || message.contains("limit") {
            ReplyFallback::RateLimited
        } else {
            ReplyFallback::Connectivity
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ReplyFallback::Empty => {
                "Hmm, I'm not sure how to respond to that. Could you try asking in a different way?"
            }
            ReplyFallback::ModelMisconfigured => {
                "My AI brain needs an update! The developer should check the Gemini model configuration."
            }
            ReplyFallback::Credentials => {
                "There's an issue with my API credentials. Please check with my developer!"
            }
            ReplyFallback::RateLimited => {
                "I've been thinking too much today! Please try again in a few minutes."
            }
            ReplyFallback::Connectivity => {
                "Sorry, I'm having trouble connecting to my brain right now. Please try again later!"
            }
        }
    }
}

/// Wraps the language model so every call ends in display-ready text.
#[derive(Clone)]
pub struct ReplyGenerator {
    model: Arc<dyn LanguageModel>,
}

impl ReplyGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        ReplyGenerator { model }
    }

    pub async fn generate_reply(&self, prompt: &str) -> String {
        match self.model.generate(prompt).await {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Language model returned an empty response");
                ReplyFallback::Empty.message().to_string()
            }
            Err(e) => {
                let description = format!("{:#}", e);
                let fallback = ReplyFallback::classify(&description);
                error!("Language model error ({:?}): {}", fallback, description);
                fallback.message().to_string()
            }
        }
    }
}
