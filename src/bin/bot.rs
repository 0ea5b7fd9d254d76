use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;

use sai_bot::commands::CommandHandler;
use sai_bot::config::Config;
use sai_bot::gemini::GeminiClient;
use sai_bot::http_server::start_http_server;
use sai_bot::media::{GithubMediaCatalog, MediaCategoryMap, MediaSelector};
use sai_bot::persona::{Persona, PromptBuilder};
use sai_bot::random::{RandomSource, ThreadRandom};
use sai_bot::reference_info::ReferenceInfo;
use sai_bot::reply::ReplyGenerator;
use sai_bot::telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let config = Arc::new(Config::from_env()?);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("🚀 Starting Sai's Telegram bot...");
    info!("✅ Configuration loaded (model: {})", config.gemini_model);

    let reference_info = ReferenceInfo::load(config.reference_info_path.as_deref());
    let prompt_builder = PromptBuilder::new(Persona::sai(&reference_info));

    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);
    let model = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    let catalog = GithubMediaCatalog::new(
        &config.media_repo,
        &config.media_root,
        config.github_token.clone(),
    )?;
    let media = MediaSelector::new(Arc::new(catalog), MediaCategoryMap::default(), random.clone());

    let command_handler = CommandHandler::new(
        Arc::new(TelegramClient::new(&config.bot_token)),
        prompt_builder,
        ReplyGenerator::new(Arc::new(model)),
        media,
        random,
        config.resume_url.clone(),
        config.media_probability,
    );
    info!("✅ Command handler initialized");

    if let Some(url) = &config.webhook_url {
        info!("📡 Register the webhook with GET /set_webhook (base: {})", url);
    }

    if let Err(e) = start_http_server(config, command_handler).await {
        error!("❌ HTTP server failed: {}", e);
        return Err(e);
    }

    Ok(())
}
