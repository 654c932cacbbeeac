//! Setup guide page.

use askama::Template;
use axum::extract::State;

use crate::state::AppState;

/// Setup guide template.
#[derive(Template)]
#[template(path = "setup.html")]
pub struct SetupTemplate {
    /// Public base URL, shown so staff can paste the webhook URLs into the
    /// provider console.
    pub base_url: String,
    pub api_key_configured: bool,
}

/// Render the setup guide.
pub async fn setup_page(State(state): State<AppState>) -> SetupTemplate {
    SetupTemplate {
        base_url: state.config.public_base_url.clone(),
        api_key_configured: state.config.openmic_api_key.is_some(),
    }
}
