//! Call log operations.
//!
//! Rows are created by the pre-call webhook, completed (or created late) by
//! the post-call webhook, and never deleted. The post-call match key is the
//! provider-supplied `openmic_call_id`.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{CallLog, CallLogResult, CallLogWithRefs, CallStats, NewCallLog};

const CALL_LOG_COLUMNS: &str = "id, bot_id, openmic_call_id, patient_id, caller_phone, \
     call_duration, call_status, transcript, summary, function_calls, \
     pre_call_data, post_call_data, created_at";

/// Insert a new call-log row and return it.
pub async fn insert_call_log(pool: &SqlitePool, log: &NewCallLog) -> Result<CallLog> {
    sqlx::query(
        r#"
        INSERT INTO call_logs (id, bot_id, openmic_call_id, patient_id, caller_phone,
                               call_duration, call_status, transcript, summary,
                               function_calls, pre_call_data, post_call_data)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&log.id)
    .bind(&log.bot_id)
    .bind(&log.openmic_call_id)
    .bind(&log.patient_id)
    .bind(&log.caller_phone)
    .bind(log.call_duration)
    .bind(&log.call_status)
    .bind(&log.transcript)
    .bind(&log.summary)
    .bind(Json(&log.function_calls))
    .bind(log.pre_call_data.as_ref().map(Json))
    .bind(log.post_call_data.as_ref().map(Json))
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "CallLog", &log.id))?;

    get_call_log(pool, &log.id).await
}

/// Get a call log by local ID.
pub async fn get_call_log(pool: &SqlitePool, id: &str) -> Result<CallLog> {
    sqlx::query_as::<_, CallLog>(&format!(
        "SELECT {CALL_LOG_COLUMNS} FROM call_logs WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "CallLog",
        id: id.to_string(),
    })
}

/// Find the call-log row for a provider call identifier, if one exists.
///
/// Not guaranteed unique; returns the oldest row when duplicates raced in.
pub async fn find_call_log_by_call_id(
    pool: &SqlitePool,
    openmic_call_id: &str,
) -> Result<Option<CallLog>> {
    let log = sqlx::query_as::<_, CallLog>(&format!(
        "SELECT {CALL_LOG_COLUMNS} FROM call_logs WHERE openmic_call_id = ? \
         ORDER BY created_at LIMIT 1"
    ))
    .bind(openmic_call_id)
    .fetch_optional(pool)
    .await?;

    Ok(log)
}

/// Write post-call results onto an existing row.
pub async fn update_call_log_result(
    pool: &SqlitePool,
    id: &str,
    result: &CallLogResult,
) -> Result<()> {
    let updated = sqlx::query(
        r#"
        UPDATE call_logs
        SET patient_id = ?, call_duration = ?, call_status = ?, transcript = ?,
            summary = ?, function_calls = ?, post_call_data = ?
        WHERE id = ?
        "#,
    )
    .bind(&result.patient_id)
    .bind(result.call_duration)
    .bind(&result.call_status)
    .bind(&result.transcript)
    .bind(&result.summary)
    .bind(Json(&result.function_calls))
    .bind(Json(&result.post_call_data))
    .bind(id)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "CallLog",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List call logs newest first, joined with bot and patient references.
pub async fn list_call_logs(pool: &SqlitePool, limit: i64) -> Result<Vec<CallLogWithRefs>> {
    let logs = sqlx::query_as::<_, CallLogWithRefs>(
        r#"
        SELECT cl.id, cl.bot_id, cl.openmic_call_id, cl.patient_id, cl.caller_phone,
               cl.call_duration, cl.call_status, cl.transcript, cl.summary,
               cl.function_calls, cl.pre_call_data, cl.post_call_data, cl.created_at,
               b.name AS bot_name, b.domain AS bot_domain,
               p.first_name AS patient_first_name,
               p.last_name AS patient_last_name,
               p.medical_id AS patient_medical_id
        FROM call_logs cl
        JOIN bots b ON b.id = cl.bot_id
        LEFT JOIN patients p ON p.id = cl.patient_id
        ORDER BY cl.created_at DESC, cl.id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

/// Aggregate call statistics for the dashboard.
pub async fn call_stats(pool: &SqlitePool) -> Result<CallStats> {
    let stats = sqlx::query_as::<_, CallStats>(
        r#"
        SELECT COUNT(*) AS total_calls,
               COALESCE(SUM(call_status = 'completed'), 0) AS completed_calls,
               COALESCE(SUM(call_duration), 0) AS total_duration,
               COALESCE(SUM(date(created_at) = date('now')), 0) AS todays_calls
        FROM call_logs
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}
