//! Bot CRUD API routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::models::{Bot, BotUpdate, NewBot, VoiceSettings, WebhookSettings};
use database::bot;
use openmic::OpenMicClient;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::state::AppState;

/// Bot creation form payload.
#[derive(Debug, Deserialize)]
pub struct CreateBotPayload {
    pub name: String,
    #[serde(default)]
    pub openmic_bot_uid: Option<String>,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub voice_settings: VoiceSettings,
    #[serde(default)]
    pub webhook_settings: WebhookSettings,
}

/// Bot edit form payload.
#[derive(Debug, Deserialize)]
pub struct UpdateBotPayload {
    pub name: String,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub voice_settings: VoiceSettings,
}

fn default_domain() -> String {
    "medical".to_string()
}

/// List all bots, newest first.
pub async fn list_api(State(state): State<AppState>) -> Result<Json<Vec<Bot>>> {
    let bots = bot::list_bots(state.db.pool()).await?;
    Ok(Json(bots))
}

/// Create a bot.
pub async fn create_api(
    State(state): State<AppState>,
    Json(payload): Json<CreateBotPayload>,
) -> Result<(StatusCode, Json<Bot>)> {
    let new_bot = NewBot {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        openmic_bot_uid: payload.openmic_bot_uid,
        domain: payload.domain,
        prompt: payload.prompt,
        voice_settings: payload.voice_settings,
        webhook_settings: payload.webhook_settings,
    };

    let created = bot::create_bot(state.db.pool(), &new_bot).await?;
    info!(bot_id = %created.id, name = %created.name, "Bot created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a bot's editable fields.
pub async fn update_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBotPayload>,
) -> Result<Json<Bot>> {
    let update = BotUpdate {
        name: payload.name,
        domain: payload.domain,
        prompt: payload.prompt,
        voice_settings: payload.voice_settings,
    };

    let updated = bot::update_bot(state.db.pool(), &id, &update).await?;
    info!(bot_id = %id, "Bot updated");

    Ok(Json(updated))
}

/// Delete a bot, removing the remote registration first when one exists.
///
/// The remote delete is best-effort: a provider failure is logged and the
/// local record is removed regardless.
pub async fn delete_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let existing = bot::get_bot(state.db.pool(), &id).await?;

    if let (Some(uid), Some(key)) = (&existing.openmic_bot_uid, &state.config.openmic_api_key) {
        let client = OpenMicClient::with_base_url(key.clone(), &state.config.openmic_api_url);
        if let Err(err) = client.delete_bot(uid).await {
            warn!(uid = %uid, error = %err, "Remote bot delete failed; removing local record anyway");
        }
    }

    bot::delete_bot(state.db.pool(), &id).await?;
    info!(bot_id = %id, "Bot deleted");

    Ok(Json(serde_json::json!({ "success": true })))
}
