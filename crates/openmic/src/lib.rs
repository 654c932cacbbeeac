//! OpenMic voice-provider API client.
//!
//! A thin HTTP wrapper over the provider's bot and call endpoints with
//! bearer-token auth. Failures surface the provider's status code and
//! response body; callers translate them to user-facing errors. Also owns
//! the medical-intake defaults (function descriptors, fallback prompt)
//! pushed to the provider by the sync operation.
//!
//! # Example
//!
//! ```no_run
//! use openmic::{CreateBotRequest, OpenMicClient};
//!
//! # async fn example() -> openmic::Result<()> {
//! let client = OpenMicClient::new("om_live_...");
//! let bot = client
//!     .create_bot(&CreateBotRequest {
//!         name: "Intake Assistant".to_string(),
//!         prompt: openmic::intake::default_medical_prompt(),
//!         voice: Some("alloy".to_string()),
//!         webhook_url: None,
//!         function_calls: None,
//!     })
//!     .await?;
//! println!("created {}", bot.uid);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod intake;
pub mod types;

pub use client::{OpenMicClient, DEFAULT_BASE_URL};
pub use error::{OpenMicError, Result};
pub use types::{
    CreateBotRequest, FunctionDefinition, FunctionParameters, OpenMicBot, OpenMicCall,
    UpdateBotRequest,
};
