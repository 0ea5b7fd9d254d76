//! # Command Routing
//!
//! Dispatches one inbound chat message. Text starting with a known command
//! token goes to that command's handler; anything else is a free-text message
//! answered by the language model.
//!
//! Media attachments are best-effort everywhere: they are attempted after the
//! primary reply and their failures are only logged.

use anyhow::Result;
use log::{error, info, warn};
use std::sync::Arc;

use crate::media::MediaSelector;
use crate::persona::{PromptBuilder, ABOUT_SUBJECT_REQUEST};
use crate::random::RandomSource;
use crate::reply::ReplyGenerator;
use crate::sentiment::{self, Feeling};
use crate::telegram::{ChatId, Messenger};

pub const WELCOME_TEXT: &str = "<b>Hello visitor!</b>\n\
I am a Telegram bot created by Sai Mahendra. Ask me anything about him and I will tell you about his work and details from what I was trained on.";

pub const HELP_TEXT: &str = "📋 <b>Available commands:</b>\n\
• /start - Start the bot and get a welcome message\n\
• /help - Show this help message\n\
• /about_sai - Just some self info about me\n\
• /resume - Get Sai's resume PDF";

pub const APOLOGY_TEXT: &str =
    "Oops! Something went wrong while I was thinking. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    AboutSubject,
    Resume,
    FreeText,
}

/// Prefix table checked in order; the first prefix the text starts with wins.
pub const COMMAND_PREFIXES: &[(&str, Command)] = &[
    ("/start", Command::Start),
    ("/help", Command::Help),
    ("/about_sai", Command::AboutSubject),
    ("/resume", Command::Resume),
];

impl Command {
    pub fn parse(text: &str) -> Self {
        COMMAND_PREFIXES
            .iter()
            .find(|(prefix, _)| text.starts_with(prefix))
            .map(|(_, command)| *command)
            .unwrap_or(Command::FreeText)
    }
}

pub fn resume_fallback_text(resume_url: &str) -> String {
    format!("📄 Here's Sai's resume: {}", resume_url)
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Clone)]
pub struct CommandHandler {
    messenger: Arc<dyn Messenger>,
    prompt_builder: Arc<PromptBuilder>,
    replies: ReplyGenerator,
    media: MediaSelector,
    random: Arc<dyn RandomSource>,
    resume_url: String,
    media_probability: f64,
}

impl CommandHandler {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        prompt_builder: PromptBuilder,
        replies: ReplyGenerator,
        media: MediaSelector,
        random: Arc<dyn RandomSource>,
        resume_url: String,
        media_probability: f64,
    ) -> Self {
        CommandHandler {
            messenger,
            prompt_builder: Arc::new(prompt_builder),
            replies,
            media,
            random,
            resume_url,
            media_probability,
        }
    }

    pub fn messenger(&self) -> &Arc<dyn Messenger> {
        &self.messenger
    }

    /// Handles one text message. Errors are failures to deliver the primary reply.
    pub async fn handle_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let command = Command::parse(text);
        info!("Processing {:?} from chat {}", command, chat_id);

        match command {
            Command::Start => self.handle_start(chat_id).await,
            Command::Help => self.handle_help(chat_id).await,
            Command::AboutSubject => self.handle_about_subject(chat_id).await,
            Command::Resume => self.handle_resume(chat_id).await,
            Command::FreeText => self.handle_message(chat_id, text).await,
        }
    }

    async fn handle_start(&self, chat_id: ChatId) -> Result<()> {
        self.messenger.send_text(chat_id, WELCOME_TEXT).await?;
        self.send_feeling_media(chat_id, Some(Feeling::Greeting)).await;
        Ok(())
    }

    async fn handle_help(&self, chat_id: ChatId) -> Result<()> {
        self.messenger.send_text(chat_id, HELP_TEXT).await
    }

    async fn handle_about_subject(&self, chat_id: ChatId) -> Result<()> {
        let prompt = self.prompt_builder.build_prompt(ABOUT_SUBJECT_REQUEST);
        let reply = escape_html(&self.replies.generate_reply(&prompt).await);
        self.messenger.send_text(chat_id, &reply).await?;
        self.send_feeling_media(chat_id, Some(Feeling::Happy)).await;
        Ok(())
    }

    async fn handle_resume(&self, chat_id: ChatId) -> Result<()> {
        if let Err(e) = self
            .messenger
            .send_document(chat_id, &self.resume_url, None)
            .await
        {
            warn!("Sending resume document failed, falling back to a link: {:#}", e);
            self.messenger
                .send_text(chat_id, &resume_fallback_text(&self.resume_url))
                .await?;
        }
        self.send_feeling_media(chat_id, Some(Feeling::Excited)).await;
        Ok(())
    }

    async fn handle_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        info!("Received message: {}", text);

        let feeling = sentiment::classify(text);
        let prompt = self.prompt_builder.build_prompt(text);
        let reply = escape_html(&self.replies.generate_reply(&prompt).await);

        if let Err(e) = self.messenger.send_text(chat_id, &reply).await {
            error!("Error sending reply: {:#}", e);
            self.messenger.send_text(chat_id, APOLOGY_TEXT).await?;
            self.send_feeling_media(chat_id, Some(Feeling::Sad)).await;
            return Ok(());
        }

        if self.random.roll() < self.media_probability {
            self.send_feeling_media(chat_id, feeling).await;
        }
        Ok(())
    }

    /// Best-effort media attachment; never fails the caller.
    async fn send_feeling_media(&self, chat_id: ChatId, feeling: Option<Feeling>) {
        let Some(item) = self.media.select_media(feeling).await else {
            info!("No media available for {:?}, skipping", feeling);
            return;
        };

        if let Err(e) = self.messenger.send_media(chat_id, &item, None).await {
            warn!("Failed to send media '{}' to chat {}: {:#}", item.url, chat_id, e);
        }
    }
}
