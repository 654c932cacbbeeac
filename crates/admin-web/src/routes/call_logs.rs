//! Call log routes: the admin list API and the call-log viewer page.

use askama::Template;
use axum::extract::{Query, State};
use axum::Json;
use database::call_log;
use database::models::CallLogWithRefs;
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

/// Default row cap for the list view.
const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on a caller-supplied limit.
const MAX_LIMIT: i64 = 500;

/// Resolve the effective row cap. Non-positive requests would read as
/// SQLite `LIMIT -1` (no cap at all), so they fall back to the default.
fn effective_limit(requested: Option<i64>) -> i64 {
    match requested {
        Some(limit) if limit > 0 => limit.min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// Query parameters for the call-log list.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// Call logs page template.
#[derive(Template)]
#[template(path = "call_logs.html")]
pub struct CallLogsTemplate {
    pub logs: Vec<CallLogView>,
}

/// A call-log row prepared for rendering.
pub struct CallLogView {
    pub id: String,
    pub bot_name: String,
    pub bot_domain: String,
    pub patient_name: Option<String>,
    pub patient_medical_id: Option<String>,
    pub caller_phone: String,
    pub call_status: String,
    pub duration_display: String,
    pub created_at: String,
    pub transcript: String,
    pub summary: String,
    pub urgency: Option<String>,
    pub key_concerns: Vec<String>,
    pub function_calls: Vec<FunctionCallView>,
}

/// A function invocation prepared for rendering.
pub struct FunctionCallView {
    pub name: String,
    pub parameters: String,
    pub result: String,
    pub success: bool,
}

impl From<CallLogWithRefs> for CallLogView {
    fn from(row: CallLogWithRefs) -> Self {
        let patient_name = match (&row.patient_first_name, &row.patient_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        };

        let function_calls = row
            .log
            .function_calls
            .0
            .iter()
            .map(|record| FunctionCallView {
                name: record.function_name.clone(),
                parameters: record.parameters.to_string(),
                result: record.result.to_string(),
                success: record.success,
            })
            .collect();

        let (urgency, key_concerns) = match &row.log.post_call_data {
            Some(data) => (
                Some(data.urgency_level.to_string()),
                data.key_concerns.clone(),
            ),
            None => (None, Vec::new()),
        };

        CallLogView {
            id: row.log.id,
            bot_name: row.bot_name,
            bot_domain: row.bot_domain,
            patient_name,
            patient_medical_id: row.patient_medical_id,
            caller_phone: row.log.caller_phone,
            call_status: row.log.call_status,
            duration_display: format_duration(row.log.call_duration),
            created_at: row.log.created_at,
            transcript: row.log.transcript,
            summary: row.log.summary,
            urgency,
            key_concerns,
            function_calls,
        }
    }
}

/// Format a duration in seconds as `m:ss`.
fn format_duration(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Render the call-log viewer page.
pub async fn call_logs_page(State(state): State<AppState>) -> Result<CallLogsTemplate> {
    let rows = call_log::list_call_logs(state.db.pool(), DEFAULT_LIMIT).await?;
    let logs = rows.into_iter().map(CallLogView::from).collect();
    Ok(CallLogsTemplate { logs })
}

/// List call logs with joined bot and patient references, newest first.
pub async fn list_api(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CallLogWithRefs>>> {
    let logs = call_log::list_call_logs(state.db.pool(), effective_limit(params.limit)).await?;
    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(185), "3:05");
    }

    #[test]
    fn test_effective_limit_rejects_uncapped_requests() {
        assert_eq!(effective_limit(None), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(0)), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(-1)), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(10)), 10);
        assert_eq!(effective_limit(Some(10_000)), MAX_LIMIT);
    }
}
