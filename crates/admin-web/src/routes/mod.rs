//! Route handlers for the admin web interface.

pub mod bots;
pub mod call_logs;
pub mod dashboard;
pub mod functions;
pub mod health;
pub mod patients;
pub mod setup;
pub mod sync;
pub mod webhooks;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(dashboard::dashboard_page))
        .route("/patients", get(patients::patients_page))
        .route("/call-logs", get(call_logs::call_logs_page))
        .route("/setup", get(setup::setup_page))
        // Health check
        .route("/health", get(health::health))
        // Admin API
        .route("/api/stats", get(dashboard::stats_api))
        .route("/api/bots", get(bots::list_api).post(bots::create_api))
        .route(
            "/api/bots/:id",
            put(bots::update_api).delete(bots::delete_api),
        )
        .route(
            "/api/patients",
            get(patients::list_api).post(patients::create_api),
        )
        .route(
            "/api/patients/:id",
            put(patients::update_api).delete(patients::delete_api),
        )
        .route("/api/call-logs", get(call_logs::list_api))
        // Voice-provider surface
        .route(
            "/api/functions/get-patient-info",
            post(functions::get_patient_info),
        )
        .route("/api/webhooks/pre-call", post(webhooks::pre_call))
        .route("/api/webhooks/post-call", post(webhooks::post_call))
        .route("/api/openmic/sync-bot", post(sync::sync_bot))
}
