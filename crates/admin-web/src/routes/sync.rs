//! Push a local bot configuration to the voice provider.

use axum::extract::State;
use axum::Json;
use database::models::{Bot, FunctionEndpoint, WebhookSettings};
use database::{bot, SqlitePool};
use chrono::{SecondsFormat, Utc};
use openmic::{CreateBotRequest, FunctionDefinition, OpenMicBot, OpenMicClient};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// Sync request from the dashboard.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub bot_id: String,
}

/// Sync response: the remote bot plus the webhook URLs now registered.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub openmic_bot: OpenMicBot,
    pub webhook_urls: WebhookUrls,
}

/// Webhook URLs pushed to the provider.
#[derive(Debug, Serialize)]
pub struct WebhookUrls {
    pub pre_call: String,
    pub post_call: String,
    pub function_calls: Vec<FunctionEndpoint>,
}

/// Sync a bot to OpenMic.
///
/// Use-once-then-overwrite, not reconciliation: an existing remote uid gets
/// one update attempt, and any failure falls back to creating a fresh remote
/// bot whose uid replaces the local one. Concurrent syncs for the same bot
/// race last-write-wins.
pub async fn sync_bot(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResponse>> {
    let api_key = state
        .config
        .openmic_api_key
        .clone()
        .ok_or(AdminError::ApiKeyMissing)?;

    let pool = state.db.pool();
    let bot = bot::get_bot(pool, &request.bot_id).await?;

    let client = OpenMicClient::with_base_url(api_key, &state.config.openmic_api_url);
    let base_url = &state.config.public_base_url;

    let function_calls = if bot.domain == "medical" {
        openmic::intake::medical_functions(base_url)
    } else {
        Vec::new()
    };

    let payload = build_remote_payload(&bot, base_url, &function_calls);

    let remote = match bot.openmic_bot_uid.as_deref() {
        Some(uid) => match client.update_bot(uid, &payload.clone().into()).await {
            Ok(remote) => remote,
            Err(err) => {
                // Remote side disagrees about this uid; start over with a
                // fresh bot rather than trying to repair.
                warn!(uid = %uid, error = %err, "Remote update failed; creating a new bot");
                create_and_store(&client, pool, &bot.id, &payload).await?
            }
        },
        None => create_and_store(&client, pool, &bot.id, &payload).await?,
    };

    let webhook_urls = WebhookUrls {
        pre_call: format!("{base_url}/api/webhooks/pre-call"),
        post_call: format!("{base_url}/api/webhooks/post-call"),
        function_calls: function_calls
            .iter()
            .map(|f| FunctionEndpoint {
                name: f.name.clone(),
                url: f.url.clone(),
            })
            .collect(),
    };

    bot::set_webhook_settings(
        pool,
        &bot.id,
        &WebhookSettings {
            pre_call_url: Some(webhook_urls.pre_call.clone()),
            post_call_url: Some(webhook_urls.post_call.clone()),
            function_calls: webhook_urls.function_calls.clone(),
            synced_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        },
    )
    .await?;

    info!(bot_id = %bot.id, uid = %remote.uid, "Bot synced to OpenMic");

    Ok(Json(SyncResponse {
        success: true,
        openmic_bot: remote,
        webhook_urls,
    }))
}

/// Build the remote payload for a local bot.
fn build_remote_payload(
    bot: &Bot,
    base_url: &str,
    function_calls: &[FunctionDefinition],
) -> CreateBotRequest {
    let prompt = if bot.prompt.is_empty() {
        openmic::intake::default_medical_prompt()
    } else {
        bot.prompt.clone()
    };

    let voice = bot
        .voice_settings
        .voice
        .clone()
        .unwrap_or_else(|| "alloy".to_string());

    CreateBotRequest {
        name: bot.name.clone(),
        prompt,
        voice: Some(voice),
        webhook_url: Some(format!("{base_url}/api/webhooks/post-call")),
        function_calls: Some(function_calls.to_vec()),
    }
}

/// Create the remote bot and persist its uid locally.
async fn create_and_store(
    client: &OpenMicClient,
    pool: &SqlitePool,
    bot_id: &str,
    payload: &CreateBotRequest,
) -> Result<OpenMicBot> {
    let remote = client.create_bot(payload).await?;
    bot::set_openmic_uid(pool, bot_id, &remote.uid).await?;
    Ok(remote)
}
