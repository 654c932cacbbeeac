//! Wire types for the OpenMic API.

use serde::{Deserialize, Serialize};

/// A bot object as the provider returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenMicBot {
    /// Provider-assigned identifier.
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub voice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_calls: Option<Vec<FunctionDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Payload for creating a remote bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBotRequest {
    pub name: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calls: Option<Vec<FunctionDefinition>>,
}

/// Partial payload for updating a remote bot. Absent fields are left
/// untouched by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBotRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calls: Option<Vec<FunctionDefinition>>,
}

impl From<CreateBotRequest> for UpdateBotRequest {
    fn from(req: CreateBotRequest) -> Self {
        Self {
            name: Some(req.name),
            prompt: Some(req.prompt),
            voice: req.voice,
            webhook_url: req.webhook_url,
            function_calls: req.function_calls,
        }
    }
}

/// A function the provider may invoke mid-call against a local endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: FunctionParameters,
    /// Endpoint the provider POSTs the arguments to.
    pub url: String,
}

/// JSON-schema style parameter description for a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameters {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: serde_json::Value,
    pub required: Vec<String>,
}

/// A call record as the provider's list endpoint returns it. Only the
/// fields the dashboard reads are typed; the rest ride along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenMicCall {
    #[serde(default)]
    pub call_id: String,
    #[serde(default)]
    pub bot_uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}
