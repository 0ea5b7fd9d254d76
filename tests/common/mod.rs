//! Recording test doubles for the bot's outbound collaborators.
//!
//! Every double records what it was asked to do so tests can assert on the
//! exact sequence of sends and lookups without touching the network.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sai_bot::commands::CommandHandler;
use sai_bot::gemini::LanguageModel;
use sai_bot::media::{CatalogEntry, MediaCatalog, MediaCategoryMap, MediaItem, MediaSelector};
use sai_bot::persona::{Persona, PromptBuilder};
use sai_bot::random::RandomSource;
use sai_bot::reference_info::ReferenceInfo;
use sai_bot::reply::ReplyGenerator;
use sai_bot::telegram::{ChatId, Messenger};

pub const RESUME_URL: &str = "https://example.test/resume.pdf";

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: ChatId, text: String },
    Document { chat_id: ChatId, url: String },
    Media { chat_id: ChatId, item: MediaItem },
    SetWebhook { url: String },
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    /// Text sends whose body equals one of these fail.
    failing_texts: Vec<String>,
    fail_all_text: bool,
    fail_documents: bool,
    fail_media: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_text(mut self, text: &str) -> Self {
        self.failing_texts.push(text.to_string());
        self
    }

    pub fn failing_all_text(mut self) -> Self {
        self.fail_all_text = true;
        self
    }

    pub fn failing_documents(mut self) -> Self {
        self.fail_documents = true;
        self
    }

    pub fn failing_media(mut self) -> Self {
        self.fail_media = true;
        self
    }

    /// Calls that went through, in order.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn media(&self) -> Vec<MediaItem> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Media { item, .. } => Some(item),
                _ => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        if self.fail_all_text || self.failing_texts.iter().any(|t| t == text) {
            return Err(anyhow!("Telegram sendMessage error 400: Bad Request"));
        }
        self.record(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, document_url: &str, _caption: Option<&str>) -> Result<()> {
        if self.fail_documents {
            return Err(anyhow!("Telegram sendDocument error 400: wrong file identifier"));
        }
        self.record(Sent::Document {
            chat_id,
            url: document_url.to_string(),
        });
        Ok(())
    }

    async fn send_media(&self, chat_id: ChatId, media: &MediaItem, _caption: Option<&str>) -> Result<()> {
        if self.fail_media {
            return Err(anyhow!("Telegram sendAnimation error 400: failed to get HTTP URL content"));
        }
        self.record(Sent::Media {
            chat_id,
            item: media.clone(),
        });
        Ok(())
    }

    async fn set_webhook(&self, url: &str) -> Result<Value> {
        self.record(Sent::SetWebhook {
            url: url.to_string(),
        });
        Ok(json!({"ok": true, "result": true, "description": "Webhook was set"}))
    }

    async fn webhook_info(&self) -> Result<Value> {
        Ok(json!({"ok": true, "result": {"url": "https://bot.example.test/webhook", "pending_update_count": 0}}))
    }
}

/// Language model that returns a fixed answer (or error) and keeps the prompts it saw.
pub struct StubModel {
    answer: std::result::Result<Option<String>, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn answering(text: &str) -> Self {
        StubModel {
            answer: Ok(Some(text.to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        StubModel {
            answer: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.answer {
            Ok(answer) => Ok(answer.clone()),
            Err(message) => Err(anyhow!("{}", message)),
        }
    }
}

/// Catalog where every category holds one gif unless told otherwise.
#[derive(Default)]
pub struct StubCatalog {
    overrides: HashMap<String, Vec<CatalogEntry>>,
    empty_by_default: bool,
    calls: Mutex<Vec<String>>,
}

impl StubCatalog {
    pub fn stocked() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        StubCatalog {
            empty_by_default: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, category: &str, entries: Vec<CatalogEntry>) -> Self {
        self.overrides.insert(category.to_string(), entries);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaCatalog for StubCatalog {
    async fn list_items(&self, category: &str) -> Result<Vec<CatalogEntry>> {
        self.calls.lock().unwrap().push(category.to_string());
        if let Some(entries) = self.overrides.get(category) {
            return Ok(entries.clone());
        }
        if self.empty_by_default {
            return Ok(Vec::new());
        }
        let name = format!("{}.gif", category);
        let url = format!("https://media.example.test/{}/{}", category, name);
        Ok(vec![CatalogEntry::file(&name, &url)])
    }
}

/// Keeps category order, always picks the first item, and rolls a fixed value.
pub struct FixedRandom {
    pub roll: f64,
}

impl RandomSource for FixedRandom {
    fn index(&self, _len: usize) -> usize {
        0
    }

    fn shuffle(&self, _items: &mut [&'static str]) {}

    fn roll(&self) -> f64 {
        self.roll
    }
}

pub struct Harness {
    pub handler: CommandHandler,
    pub messenger: Arc<RecordingMessenger>,
    pub model: Arc<StubModel>,
    pub catalog: Arc<StubCatalog>,
}

pub fn harness(
    messenger: RecordingMessenger,
    model: StubModel,
    catalog: StubCatalog,
    roll: f64,
) -> Harness {
    let messenger = Arc::new(messenger);
    let model = Arc::new(model);
    let catalog = Arc::new(catalog);
    let random: Arc<dyn RandomSource> = Arc::new(FixedRandom { roll });

    let prompt_builder =
        PromptBuilder::new(Persona::sai(&ReferenceInfo::new("Sai builds bots and loves anime.")));
    let media = MediaSelector::new(catalog.clone(), MediaCategoryMap::default(), random.clone());

    let handler = CommandHandler::new(
        messenger.clone(),
        prompt_builder,
        ReplyGenerator::new(model.clone()),
        media,
        random,
        RESUME_URL.to_string(),
        0.3,
    );

    Harness {
        handler,
        messenger,
        model,
        catalog,
    }
}
