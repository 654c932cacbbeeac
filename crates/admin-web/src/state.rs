//! Application state shared across handlers.

use database::Database;

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Server configuration (OpenMic key, public base URL).
    pub config: Config,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, config: Config) -> Self {
        Self { db, config }
    }
}
