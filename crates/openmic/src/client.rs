//! HTTP client for the OpenMic API.

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{OpenMicError, Result};
use crate::types::{CreateBotRequest, OpenMicBot, OpenMicCall, UpdateBotRequest};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openmic.ai/v1";

/// Client for the OpenMic voice-provider API.
///
/// Holds the bearer key explicitly; construct one per call site instead of
/// configuring module-level state. One HTTP request per operation, no
/// retries, no timeouts, no pagination handling (list calls return a single
/// page).
#[derive(Debug, Clone)]
pub struct OpenMicClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenMicClient {
    /// Create a client against the default API base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    /// Send a request and decode the JSON response, mapping any non-success
    /// status to [`OpenMicError::Api`] with the raw body attached.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenMicError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let value = response.json().await?;
        Ok(value)
    }

    /// Send a request where the response body is irrelevant.
    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenMicError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Register a new bot with the provider.
    pub async fn create_bot(&self, bot: &CreateBotRequest) -> Result<OpenMicBot> {
        debug!(name = %bot.name, "Creating OpenMic bot");
        let created: OpenMicBot = self
            .send(self.request(Method::POST, "/bots").json(bot))
            .await?;
        info!(uid = %created.uid, "OpenMic bot created");
        Ok(created)
    }

    /// Update an existing bot. Only the fields present in `update` change.
    pub async fn update_bot(&self, uid: &str, update: &UpdateBotRequest) -> Result<OpenMicBot> {
        debug!(uid = %uid, "Updating OpenMic bot");
        self.send(
            self.request(Method::PUT, &format!("/bots/{uid}"))
                .json(update),
        )
        .await
    }

    /// Delete a remote bot.
    pub async fn delete_bot(&self, uid: &str) -> Result<()> {
        debug!(uid = %uid, "Deleting OpenMic bot");
        self.send_empty(self.request(Method::DELETE, &format!("/bots/{uid}")))
            .await
    }

    /// Fetch a single remote bot.
    pub async fn get_bot(&self, uid: &str) -> Result<OpenMicBot> {
        self.send(self.request(Method::GET, &format!("/bots/{uid}")))
            .await
    }

    /// List all remote bots (single page).
    pub async fn list_bots(&self) -> Result<Vec<OpenMicBot>> {
        self.send(self.request(Method::GET, "/bots")).await
    }

    /// List provider-side call records, optionally filtered by bot uid
    /// (single page).
    pub async fn list_calls(&self, bot_uid: Option<&str>) -> Result<Vec<OpenMicCall>> {
        let endpoint = match bot_uid {
            Some(uid) => format!("/calls?bot_uid={uid}"),
            None => "/calls".to_string(),
        };
        self.send(self.request(Method::GET, &endpoint)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenMicClient::with_base_url("key", "http://localhost:9999/v1/");
        assert_eq!(client.base_url(), "http://localhost:9999/v1");
    }

    #[test]
    fn test_api_error_message_embeds_status_and_body() {
        let err = OpenMicError::Api {
            status: 422,
            body: "{\"detail\":\"bad voice\"}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("bad voice"));
    }

    #[test]
    fn test_update_request_skips_absent_fields() {
        let update = UpdateBotRequest {
            prompt: Some("New prompt".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, "{\"prompt\":\"New prompt\"}");
    }
}
