//! Invocation request and response wire models.
//!
//! Responses are only half-typed on purpose: the platform has shipped
//! several envelope shapes for the answer text, so [`InvokeResponse`] keeps
//! unknown fields in an open map and [`InvokeResponse::message_text`] walks
//! the known locations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `user`, `assistant` or `system`.
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for chat invocation. Only the three camelCase fields are
/// aliased; the rest go over the wire as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(rename = "hxqlQuery", skip_serializing_if = "Option::is_none")]
    pub hxql_query: Option<String>,
    #[serde(rename = "hybridSearch", skip_serializing_if = "Option::is_none")]
    pub hybrid_search: Option<bool>,
    #[serde(rename = "enableDeepSearch", default)]
    pub enable_deep_search: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<Vec<String>>,
}

impl InvokeRequest {
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            hxql_query: None,
            hybrid_search: None,
            enable_deep_search: false,
            guardrails: None,
        }
    }
}

/// Request body for task invocation with structured input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeTaskRequest {
    pub inputs: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output: Option<Vec<Value>>,
    #[serde(rename = "customOutputs", default)]
    pub custom_outputs: Option<Value>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(rename = "ragMode", default)]
    pub rag_mode: Option<String>,
    /// Everything the API sent that we do not model explicitly.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl InvokeResponse {
    /// Best-effort extraction of the plain-text answer.
    ///
    /// Checks, in order: the `response` field, a top-level `answer`
    /// (string or `{text}`), a top-level `text`, `output[].content[].text`
    /// (message-typed items first), and `customOutputs.answer`.
    pub fn message_text(&self) -> Option<String> {
        if let Some(text) = self.response.as_deref() {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
        if let Some(text) = self.extra.get("answer").and_then(answer_text) {
            return Some(text);
        }
        if let Some(text) = self.extra.get("text").and_then(Value::as_str) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
        if let Some(output) = &self.output {
            let from_message = output
                .iter()
                .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
                .find_map(content_text);
            if let Some(text) = from_message {
                return Some(text);
            }
            if let Some(text) = output.first().and_then(content_text) {
                return Some(text);
            }
        }
        self.custom_outputs
            .as_ref()
            .and_then(|custom| custom.get("answer"))
            .and_then(answer_text)
    }
}

fn answer_text(answer: &Value) -> Option<String> {
    match answer {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn content_text(item: &Value) -> Option<String> {
    item.get("content")?
        .as_array()?
        .iter()
        .find_map(|entry| entry.get("text").and_then(Value::as_str))
        .map(str::to_string)
}

/// One server-sent event from a streaming invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    /// `text`, `error` or `done`.
    pub event: String,
    #[serde(default)]
    pub data: Option<String>,
}
