//! Database models.
//!
//! The former free-form JSON blobs (voice settings, webhook settings,
//! pre/post-call metadata) are structured records with optional fields,
//! stored as JSON text columns via [`sqlx::types::Json`].

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

pub use sqlx::types::Json;

/// A configured voice bot persona registered (or registerable) with the
/// voice provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bot {
    /// Local UUID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Remote provider identifier. Set at most once, on first successful sync.
    pub openmic_bot_uid: Option<String>,
    /// Domain tag (e.g. "medical").
    pub domain: String,
    /// System prompt; empty means "use the generated default".
    pub prompt: String,
    /// Voice configuration.
    pub voice_settings: Json<VoiceSettings>,
    /// Webhook configuration, populated by the sync operation.
    pub webhook_settings: Json<WebhookSettings>,
    /// Creation timestamp (server-assigned).
    pub created_at: String,
    /// Last update timestamp (server-assigned).
    pub updated_at: String,
}

/// Voice configuration for a bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Voice name (provider-defined, e.g. "alloy").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Speaking speed multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

/// Webhook configuration pushed to the provider, recorded after each sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_call_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_call_url: Option<String>,
    /// Function endpoints registered with the provider.
    #[serde(default)]
    pub function_calls: Vec<FunctionEndpoint>,
    /// When the last sync completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<String>,
}

/// A function endpoint registered with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEndpoint {
    pub name: String,
    pub url: String,
}

/// Fields accepted when creating a bot. Timestamps are server-assigned.
#[derive(Debug, Clone)]
pub struct NewBot {
    pub id: String,
    pub name: String,
    pub openmic_bot_uid: Option<String>,
    pub domain: String,
    pub prompt: String,
    pub voice_settings: VoiceSettings,
    pub webhook_settings: WebhookSettings,
}

/// Editable bot fields for the admin edit form.
#[derive(Debug, Clone)]
pub struct BotUpdate {
    pub name: String,
    pub domain: String,
    pub prompt: String,
    pub voice_settings: VoiceSettings,
}

/// A patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Patient {
    /// Local UUID.
    pub id: String,
    /// Human-facing medical identifier, upper-cased on entry.
    pub medical_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub phone: String,
    pub email: String,
    /// Known allergies.
    pub allergies: Json<Vec<String>>,
    /// Free-text medical history.
    pub medical_history: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when creating or editing a patient.
#[derive(Debug, Clone)]
pub struct PatientFields {
    pub medical_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub phone: String,
    pub email: String,
    pub allergies: Vec<String>,
    pub medical_history: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
}

/// A logged call, created by the pre-call webhook and completed by the
/// post-call webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CallLog {
    /// Local UUID.
    pub id: String,
    /// Owning bot.
    pub bot_id: String,
    /// Provider-supplied call identifier; the natural key matching the
    /// pre-call and post-call writes for one phone call.
    pub openmic_call_id: String,
    /// Resolved patient, if any webhook identified one.
    pub patient_id: Option<String>,
    pub caller_phone: String,
    /// Duration in seconds.
    pub call_duration: i64,
    /// Status string, e.g. "pre_call", "completed".
    pub call_status: String,
    pub transcript: String,
    pub summary: String,
    /// Function invocations made by the provider during the call.
    pub function_calls: Json<Vec<FunctionCallRecord>>,
    pub pre_call_data: Option<Json<PreCallData>>,
    pub post_call_data: Option<Json<PostCallData>>,
    pub created_at: String,
}

/// One function invocation reported by the provider.
///
/// `parameters` and `result` keep their provider-defined shape; only the
/// `get_patient_info` result is ever inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallRecord {
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub success: bool,
}

/// Context assembled by the pre-call webhook and fed back into the live call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreCallData {
    pub call_id: String,
    pub bot_uid: String,
    pub caller_phone: String,
    pub patient_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_data: Option<PreCallPatient>,
    pub timestamp: String,
}

/// Patient subset exposed to the voice provider before a call connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreCallPatient {
    pub medical_id: String,
    pub name: String,
    pub allergies: Vec<String>,
    pub medical_history: String,
}

/// Derived metadata written by the post-call webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCallData {
    pub processed_at: String,
    pub follow_up_required: bool,
    pub urgency_level: UrgencyLevel,
    pub key_concerns: Vec<String>,
}

/// Keyword-derived urgency classification of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyLevel::Low => write!(f, "low"),
            UrgencyLevel::Medium => write!(f, "medium"),
            UrgencyLevel::High => write!(f, "high"),
        }
    }
}

/// Fields for a new call-log row.
#[derive(Debug, Clone)]
pub struct NewCallLog {
    pub id: String,
    pub bot_id: String,
    pub openmic_call_id: String,
    pub patient_id: Option<String>,
    pub caller_phone: String,
    pub call_duration: i64,
    pub call_status: String,
    pub transcript: String,
    pub summary: String,
    pub function_calls: Vec<FunctionCallRecord>,
    pub pre_call_data: Option<PreCallData>,
    pub post_call_data: Option<PostCallData>,
}

/// Post-call fields written onto an existing call-log row.
#[derive(Debug, Clone)]
pub struct CallLogResult {
    pub patient_id: Option<String>,
    pub call_duration: i64,
    pub call_status: String,
    pub transcript: String,
    pub summary: String,
    pub function_calls: Vec<FunctionCallRecord>,
    pub post_call_data: PostCallData,
}

/// A call-log row joined with its bot and patient for the admin list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CallLogWithRefs {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub log: CallLog,
    /// Bot display name.
    pub bot_name: String,
    /// Bot domain tag.
    pub bot_domain: String,
    pub patient_first_name: Option<String>,
    pub patient_last_name: Option<String>,
    pub patient_medical_id: Option<String>,
}

/// Aggregate call statistics for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CallStats {
    pub total_calls: i64,
    pub completed_calls: i64,
    /// Sum of call durations in seconds, across all logs.
    pub total_duration: i64,
    /// Calls whose `created_at` falls on the current (UTC) date.
    pub todays_calls: i64,
}
