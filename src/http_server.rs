use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use anyhow::{anyhow, Result};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::commands::CommandHandler;
use crate::config::Config;
use crate::telegram::ChatId;

#[derive(Clone)]
pub struct AppState {
    pub command_handler: CommandHandler,
    pub config: Arc<Config>,
}

/// The part of a Telegram update this bot reads.
#[derive(Deserialize, Debug)]
pub struct Update {
    pub update_id: Option<i64>,
    pub message: Option<IncomingMessage>,
}

#[derive(Deserialize, Debug)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Deserialize)]
pub struct SetWebhookParams {
    pub webhook_url: Option<String>,
}

type JsonResponse = (StatusCode, Json<Value>);

pub fn create_server(config: Arc<Config>, command_handler: CommandHandler) -> Router {
    let state = AppState {
        command_handler,
        config,
    };

    Router::new()
        .route("/", get(health_check))
        .route("/webhook", post(handle_webhook))
        .route("/set_webhook", get(set_webhook))
        .route("/webhook_info", get(webhook_info))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "Sai's Telegram Bot is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn handle_webhook(State(state): State<AppState>, body: Bytes) -> JsonResponse {
    let request_id = uuid::Uuid::new_v4();

    info!("[{}] 📥 Webhook received | Body length: {}", request_id, body.len());
    debug!("[{}] 📝 Request body: {}", request_id,
           if body.len() > 500 {
               format!("{}...", String::from_utf8_lossy(&body[..500]))
           } else {
               String::from_utf8_lossy(&body).to_string()
           });

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            error!("[{}] ❌ Failed to parse webhook payload: {}", request_id, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "error", "message": "invalid update payload"})),
            );
        }
    };

    let Some(message) = update.message else {
        debug!("[{}] Update {:?} has no message, ignoring", request_id, update.update_id);
        return (StatusCode::OK, Json(json!({"status": "ok"})));
    };

    let Some(text) = message.text else {
        debug!("[{}] Message in chat {} has no text, ignoring", request_id, message.chat.id);
        return (StatusCode::OK, Json(json!({"status": "ok"})));
    };

    match state.command_handler.handle_text(message.chat.id, &text).await {
        Ok(()) => {
            info!("[{}] ✅ Handled message for chat {}", request_id, message.chat.id);
            (StatusCode::OK, Json(json!({"status": "ok"})))
        }
        Err(e) => {
            error!("[{}] ❌ Webhook error: {:#}", request_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": e.to_string()})),
            )
        }
    }
}

async fn set_webhook(
    State(state): State<AppState>,
    Query(params): Query<SetWebhookParams>,
) -> JsonResponse {
    let base = params
        .webhook_url
        .filter(|url| !url.trim().is_empty())
        .or_else(|| state.config.webhook_url.clone());

    let Some(base) = base else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Webhook URL not provided"})),
        );
    };

    let url = format!("{}/webhook", base.trim_end_matches('/'));
    match state.command_handler.messenger().set_webhook(&url).await {
        Ok(result) => {
            info!("Webhook set successfully: {}", url);
            (StatusCode::OK, Json(result))
        }
        Err(e) => {
            error!("Error setting webhook: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": e.to_string()})),
            )
        }
    }
}

async fn webhook_info(State(state): State<AppState>) -> JsonResponse {
    match state.command_handler.messenger().webhook_info().await {
        Ok(result) => (StatusCode::OK, Json(result)),
        Err(e) => {
            error!("Error getting webhook info: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": e.to_string()})),
            )
        }
    }
}

pub async fn start_http_server(config: Arc<Config>, command_handler: CommandHandler) -> Result<()> {
    let port = config.port;
    let app = create_server(config, command_handler);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port))
        .await
        .map_err(|e| anyhow!("Failed to bind to port {}: {}", port, e))?;

    info!("HTTP server starting on port {}", port);
    info!("Webhook endpoint: http://0.0.0.0:{}/webhook", port);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
