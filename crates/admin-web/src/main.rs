//! Admin web interface for the medical intake dashboard.
//!
//! Serves the staff dashboard (bots, patients, call logs), the admin JSON
//! API, and the endpoints the voice provider calls during live phone calls
//! (pre-call, post-call, patient lookup).

mod config;
mod error;
mod routes;
mod state;
mod triage;

use database::Database;
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting intake admin server");
    if config.openmic_api_key.is_none() {
        info!("OPENMIC_API_KEY not set; bot sync will be unavailable");
    }

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Build application state
    let addr = config.addr;
    let state = AppState::new(db, config);

    // Build router
    let app = routes::router()
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state);

    // Start server
    info!(addr = %addr, "Intake admin server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
