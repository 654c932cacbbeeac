//! Dashboard routes.

use askama::Template;
use axum::extract::State;
use axum::Json;
use database::models::Bot;
use database::{bot, call_log, patient};
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub stats: Stats,
    pub bots: Vec<Bot>,
}

/// Dashboard statistics.
#[derive(Clone, Serialize)]
pub struct Stats {
    pub total_calls: i64,
    pub completed_calls: i64,
    /// Completed calls as a rounded percentage of all calls.
    pub completion_rate: i64,
    /// Mean call duration in seconds across all logs.
    pub average_duration: i64,
    pub todays_calls: i64,
    pub bot_count: i64,
    pub patient_count: i64,
}

impl Stats {
    /// Average duration as `m:ss` for the stat card.
    pub fn average_duration_display(&self) -> String {
        format!("{}:{:02}", self.average_duration / 60, self.average_duration % 60)
    }
}

/// Render the dashboard page.
pub async fn dashboard_page(State(state): State<AppState>) -> Result<DashboardTemplate> {
    let stats = get_stats(&state).await?;
    let bots = bot::list_bots(state.db.pool()).await?;
    Ok(DashboardTemplate { stats, bots })
}

/// Get dashboard statistics as JSON.
pub async fn stats_api(State(state): State<AppState>) -> Result<Json<Stats>> {
    let stats = get_stats(&state).await?;
    Ok(Json(stats))
}

/// Fetch statistics from the database.
async fn get_stats(state: &AppState) -> Result<Stats> {
    let pool = state.db.pool();

    let calls = call_log::call_stats(pool).await?;
    let bot_count = bot::count_bots(pool).await?;
    let patient_count = patient::count_patients(pool).await?;

    let completion_rate = if calls.total_calls > 0 {
        (calls.completed_calls * 100 + calls.total_calls / 2) / calls.total_calls
    } else {
        0
    };
    let average_duration = if calls.total_calls > 0 {
        calls.total_duration / calls.total_calls
    } else {
        0
    };

    Ok(Stats {
        total_calls: calls.total_calls,
        completed_calls: calls.completed_calls,
        completion_rate,
        average_duration,
        todays_calls: calls.todays_calls,
        bot_count,
        patient_count,
    })
}
