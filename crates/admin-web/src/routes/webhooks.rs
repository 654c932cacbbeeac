//! Voice-provider webhooks: pre-call context and post-call persistence.
//!
//! The pre-call handler must always hand *a* context string back to the live
//! call, so every internal failure degrades to a fallback response instead
//! of a bare error. The post-call handler persists the call outcome and the
//! triage-derived metadata, matching the pre-call row by the provider call
//! identifier.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use database::models::{
    CallLogResult, FunctionCallRecord, NewCallLog, PostCallData, PreCallData, PreCallPatient,
};
use database::{bot, call_log, patient, DatabaseError, SqlitePool};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AdminError;
use crate::state::AppState;
use crate::triage;

/// Pre-call payload from the provider.
#[derive(Debug, Deserialize)]
pub struct PreCallRequest {
    #[serde(default)]
    pub caller_phone: String,
    #[serde(default)]
    pub bot_uid: String,
    #[serde(default)]
    pub call_id: String,
}

/// Pre-call response: data plus the context string fed into the live call.
#[derive(Debug, Serialize, Deserialize)]
pub struct PreCallResponse {
    pub success: bool,
    pub data: PreCallData,
    pub context: String,
}

/// Post-call payload from the provider.
#[derive(Debug, Deserialize)]
pub struct PostCallRequest {
    #[serde(default)]
    pub call_id: String,
    #[serde(default)]
    pub bot_uid: String,
    #[serde(default)]
    pub caller_phone: String,
    #[serde(default)]
    pub call_duration: Option<i64>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub function_calls: Vec<FunctionCallRecord>,
}

fn default_status() -> String {
    "completed".to_string()
}

/// Post-call response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostCallResponse {
    pub success: bool,
    pub message: String,
    pub follow_up_scheduled: bool,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Pre-call webhook. Always 200 with a usable context string; 500 with the
/// fallback context only when something unexpected breaks.
pub async fn pre_call(
    State(state): State<AppState>,
    Json(request): Json<PreCallRequest>,
) -> Response {
    info!(call_id = %request.call_id, bot_uid = %request.bot_uid, "Pre-call webhook received");

    match handle_pre_call(state.db.pool(), &request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!(error = %err, call_id = %request.call_id, "Pre-call webhook failed");
            let body = serde_json::json!({
                "success": false,
                "error": "Failed to process pre-call data",
                "context": "Unable to retrieve patient information. Please ask for Medical ID.",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Pre-call logic, separated from the HTTP wrapper for testing.
async fn handle_pre_call(
    pool: &SqlitePool,
    request: &PreCallRequest,
) -> Result<PreCallResponse, DatabaseError> {
    let patient = patient::find_patient_by_phone(pool, &request.caller_phone).await?;
    let bot = bot::find_bot_by_uid(pool, &request.bot_uid).await?;

    let data = PreCallData {
        call_id: request.call_id.clone(),
        bot_uid: request.bot_uid.clone(),
        caller_phone: request.caller_phone.clone(),
        patient_found: patient.is_some(),
        patient_data: patient.as_ref().map(|p| PreCallPatient {
            medical_id: p.medical_id.clone(),
            name: format!("{} {}", p.first_name, p.last_name),
            allergies: p.allergies.0.clone(),
            medical_history: p.medical_history.clone(),
        }),
        timestamp: now_rfc3339(),
    };

    // Log the call only when the bot resolves; an unknown bot uid still gets
    // a context string, just no row.
    match &bot {
        Some(bot) => {
            call_log::insert_call_log(
                pool,
                &NewCallLog {
                    id: Uuid::new_v4().to_string(),
                    bot_id: bot.id.clone(),
                    openmic_call_id: request.call_id.clone(),
                    patient_id: patient.as_ref().map(|p| p.id.clone()),
                    caller_phone: request.caller_phone.clone(),
                    call_duration: 0,
                    call_status: "pre_call".to_string(),
                    transcript: String::new(),
                    summary: String::new(),
                    function_calls: vec![],
                    pre_call_data: Some(data.clone()),
                    post_call_data: None,
                },
            )
            .await?;
        }
        None => {
            warn!(bot_uid = %request.bot_uid, "Pre-call for unknown bot uid; skipping call log");
        }
    }

    let context = match &patient {
        Some(p) => {
            let allergies = if p.allergies.0.is_empty() {
                "None".to_string()
            } else {
                p.allergies.0.join(", ")
            };
            let history = if p.medical_history.is_empty() {
                "None on file"
            } else {
                &p.medical_history
            };
            format!(
                "Patient {} {} (ID: {}) is calling. Known allergies: {}. Medical history: {}.",
                p.first_name, p.last_name, p.medical_id, allergies, history
            )
        }
        None => format!(
            "Unknown caller from {}. Please ask for their Medical ID to retrieve their information.",
            request.caller_phone
        ),
    };

    Ok(PreCallResponse {
        success: true,
        data,
        context,
    })
}

/// Post-call webhook.
pub async fn post_call(
    State(state): State<AppState>,
    Json(request): Json<PostCallRequest>,
) -> Response {
    info!(call_id = %request.call_id, bot_uid = %request.bot_uid, "Post-call webhook received");

    match handle_post_call(state.db.pool(), &request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err @ AdminError::Database(DatabaseError::NotFound { .. })) => err.into_response(),
        Err(err) => {
            error!(error = %err, call_id = %request.call_id, "Post-call webhook failed");
            let body = serde_json::json!({
                "success": false,
                "error": "Failed to process post-call data",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Post-call logic, separated from the HTTP wrapper for testing.
async fn handle_post_call(
    pool: &SqlitePool,
    request: &PostCallRequest,
) -> Result<PostCallResponse, AdminError> {
    let bot = bot::find_bot_by_uid(pool, &request.bot_uid)
        .await?
        .ok_or_else(|| {
            AdminError::Database(DatabaseError::NotFound {
                entity: "Bot",
                id: request.bot_uid.clone(),
            })
        })?;

    let patient_id = resolve_patient_id(pool, &request.function_calls).await?;

    let transcript = request.transcript.clone().unwrap_or_default();
    let summary = request.summary.clone().unwrap_or_default();

    let processed_summary = triage::process_call_summary(&summary, &transcript);
    let post_call_data = PostCallData {
        processed_at: now_rfc3339(),
        follow_up_required: triage::follow_up_required(&processed_summary),
        urgency_level: triage::extract_urgency_level(&transcript, &summary),
        key_concerns: triage::extract_key_concerns(&transcript, &summary),
    };

    let result = CallLogResult {
        patient_id: patient_id.clone(),
        call_duration: request.call_duration.unwrap_or(0),
        call_status: request.status.clone(),
        transcript: transcript.clone(),
        summary: processed_summary.clone(),
        function_calls: request.function_calls.clone(),
        post_call_data,
    };

    // Matched write: update the pre-call row when one exists, otherwise the
    // post-call arrived first (or the pre-call was skipped) and we insert.
    match call_log::find_call_log_by_call_id(pool, &request.call_id).await? {
        Some(existing) => {
            call_log::update_call_log_result(pool, &existing.id, &result).await?;
        }
        None => {
            call_log::insert_call_log(
                pool,
                &NewCallLog {
                    id: Uuid::new_v4().to_string(),
                    bot_id: bot.id.clone(),
                    openmic_call_id: request.call_id.clone(),
                    patient_id: result.patient_id.clone(),
                    caller_phone: request.caller_phone.clone(),
                    call_duration: result.call_duration,
                    call_status: result.call_status.clone(),
                    transcript: result.transcript.clone(),
                    summary: result.summary.clone(),
                    function_calls: result.function_calls.clone(),
                    pre_call_data: None,
                    post_call_data: Some(result.post_call_data.clone()),
                },
            )
            .await?;
        }
    }

    if bot.domain == "medical"
        && patient_id.is_some()
        && triage::needs_follow_up(&processed_summary, &transcript)
    {
        // Scheduling integration lives elsewhere; flag it for staff.
        info!(
            call_id = %request.call_id,
            patient_id = ?patient_id,
            "Follow-up needed after medical call"
        );
    }

    info!(call_id = %request.call_id, "Post-call processing completed");

    Ok(PostCallResponse {
        success: true,
        message: "Call processed successfully".to_string(),
        follow_up_scheduled: processed_summary.contains("follow-up"),
    })
}

/// Resolve the local patient from a `get_patient_info` invocation's result,
/// if the provider reported one. Best-effort: unresolvable means `None`.
async fn resolve_patient_id(
    pool: &SqlitePool,
    function_calls: &[FunctionCallRecord],
) -> Result<Option<String>, DatabaseError> {
    let medical_id = function_calls
        .iter()
        .find(|record| record.function_name == "get_patient_info")
        .and_then(|record| record.result.pointer("/patient/medical_id"))
        .and_then(|value| value.as_str());

    match medical_id {
        Some(medical_id) => {
            let patient = patient::find_patient_by_medical_id(pool, medical_id).await?;
            Ok(patient.map(|p| p.id))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::models::{NewBot, PatientFields, VoiceSettings, WebhookSettings};
    use database::{Database, UrgencyLevel};
    use serde_json::json;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed(pool: &SqlitePool) {
        bot::create_bot(
            pool,
            &NewBot {
                id: "bot-1".to_string(),
                name: "Intake Assistant".to_string(),
                openmic_bot_uid: Some("om-uid-1".to_string()),
                domain: "medical".to_string(),
                prompt: String::new(),
                voice_settings: VoiceSettings::default(),
                webhook_settings: WebhookSettings::default(),
            },
        )
        .await
        .unwrap();

        patient::create_patient(
            pool,
            "pat-1",
            &PatientFields {
                medical_id: "MED001".to_string(),
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                date_of_birth: "1985-03-14".to_string(),
                phone: "+15551234567".to_string(),
                email: "john@example.com".to_string(),
                allergies: vec!["Penicillin".to_string(), "Latex".to_string()],
                medical_history: "Hypertension".to_string(),
                emergency_contact_name: "Jane Doe".to_string(),
                emergency_contact_phone: "+15557654321".to_string(),
            },
        )
        .await
        .unwrap();
    }

    fn pre_call_request(phone: &str) -> PreCallRequest {
        PreCallRequest {
            caller_phone: phone.to_string(),
            bot_uid: "om-uid-1".to_string(),
            call_id: "call-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pre_call_known_patient() {
        let db = test_db().await;
        seed(db.pool()).await;

        let response = handle_pre_call(db.pool(), &pre_call_request("+15551234567"))
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.data.patient_found);
        assert_eq!(
            response.context,
            "Patient John Doe (ID: MED001) is calling. Known allergies: \
             Penicillin, Latex. Medical history: Hypertension."
        );

        // Logged with status pre_call and the patient linked
        let log = call_log::find_call_log_by_call_id(db.pool(), "call-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.call_status, "pre_call");
        assert_eq!(log.patient_id.as_deref(), Some("pat-1"));
        assert!(log.pre_call_data.is_some());
    }

    #[tokio::test]
    async fn test_pre_call_unknown_caller_degrades_to_ask_for_id() {
        let db = test_db().await;
        seed(db.pool()).await;

        let response = handle_pre_call(db.pool(), &pre_call_request("+15550000000"))
            .await
            .unwrap();

        assert!(response.success);
        assert!(!response.data.patient_found);
        assert!(response.data.patient_data.is_none());
        assert_eq!(
            response.context,
            "Unknown caller from +15550000000. Please ask for their Medical ID \
             to retrieve their information."
        );
    }

    #[tokio::test]
    async fn test_pre_call_unknown_bot_skips_logging_but_still_succeeds() {
        let db = test_db().await;
        seed(db.pool()).await;

        let request = PreCallRequest {
            caller_phone: "+15551234567".to_string(),
            bot_uid: "no-such-bot".to_string(),
            call_id: "call-9".to_string(),
        };
        let response = handle_pre_call(db.pool(), &request).await.unwrap();
        assert!(response.success);

        let log = call_log::find_call_log_by_call_id(db.pool(), "call-9")
            .await
            .unwrap();
        assert!(log.is_none());
    }

    fn post_call_request(transcript: &str, summary: &str) -> PostCallRequest {
        PostCallRequest {
            call_id: "call-1".to_string(),
            bot_uid: "om-uid-1".to_string(),
            caller_phone: "+15551234567".to_string(),
            call_duration: Some(240),
            transcript: Some(transcript.to_string()),
            summary: Some(summary.to_string()),
            status: "completed".to_string(),
            function_calls: vec![FunctionCallRecord {
                function_name: "get_patient_info".to_string(),
                parameters: json!({ "medical_id": "MED001" }),
                result: json!({ "patient": { "medical_id": "MED001" } }),
                success: true,
            }],
        }
    }

    #[tokio::test]
    async fn test_post_call_updates_the_pre_call_row() {
        let db = test_db().await;
        seed(db.pool()).await;

        handle_pre_call(db.pool(), &pre_call_request("+15551234567"))
            .await
            .unwrap();
        let response = handle_post_call(
            db.pool(),
            &post_call_request("I have severe pain and need an appointment", "Pain call"),
        )
        .await
        .unwrap();
        assert!(response.success);

        let logs = call_log::list_call_logs(db.pool(), 50).await.unwrap();
        assert_eq!(logs.len(), 1, "post-call must update, not insert");

        let log = &logs[0].log;
        assert_eq!(log.call_status, "completed");
        assert_eq!(log.call_duration, 240);
        assert_eq!(log.patient_id.as_deref(), Some("pat-1"));

        let data = log.post_call_data.as_ref().unwrap();
        assert_eq!(data.urgency_level, UrgencyLevel::High);
        assert!(data.key_concerns.contains(&"Pain management".to_string()));
        assert!(data.key_concerns.contains(&"Scheduling".to_string()));
    }

    #[tokio::test]
    async fn test_post_call_without_pre_call_inserts() {
        let db = test_db().await;
        seed(db.pool()).await;

        let response = handle_post_call(db.pool(), &post_call_request("routine question", ""))
            .await
            .unwrap();
        assert!(!response.follow_up_scheduled);

        let log = call_log::find_call_log_by_call_id(db.pool(), "call-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.call_status, "completed");
        assert!(log.pre_call_data.is_none());
        assert_eq!(
            log.post_call_data.as_ref().unwrap().urgency_level,
            UrgencyLevel::Low
        );
    }

    #[tokio::test]
    async fn test_post_call_is_idempotent_per_call_id() {
        let db = test_db().await;
        seed(db.pool()).await;

        let first = post_call_request("first delivery", "First");
        handle_post_call(db.pool(), &first).await.unwrap();

        let mut second = post_call_request("second delivery", "Second");
        second.call_duration = Some(999);
        handle_post_call(db.pool(), &second).await.unwrap();

        let logs = call_log::list_call_logs(db.pool(), 50).await.unwrap();
        assert_eq!(logs.len(), 1);
        // Fields reflect the second delivery
        assert_eq!(logs[0].log.call_duration, 999);
        assert_eq!(logs[0].log.summary, "Second");
    }

    #[tokio::test]
    async fn test_post_call_unknown_bot_is_not_found() {
        let db = test_db().await;
        seed(db.pool()).await;

        let mut request = post_call_request("hello", "hi");
        request.bot_uid = "no-such-bot".to_string();

        let result = handle_post_call(db.pool(), &request).await;
        assert!(matches!(
            result,
            Err(AdminError::Database(DatabaseError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_post_call_unresolvable_patient_is_null() {
        let db = test_db().await;
        seed(db.pool()).await;

        let mut request = post_call_request("hello", "hi");
        request.function_calls = vec![FunctionCallRecord {
            function_name: "get_patient_info".to_string(),
            parameters: json!({}),
            result: json!({ "patient": { "medical_id": "MED999" } }),
            success: false,
        }];

        handle_post_call(db.pool(), &request).await.unwrap();
        let log = call_log::find_call_log_by_call_id(db.pool(), "call-1")
            .await
            .unwrap()
            .unwrap();
        assert!(log.patient_id.is_none());
    }
}
