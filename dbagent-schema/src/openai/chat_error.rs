//! OpenAI error envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OpenAI-compatible error response schema.
///
/// Standard envelope:
/// `{ "error": { "message": "...", "type": "...", "code": "...", "param": ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenaiErrorBody {
    #[serde(rename = "error")]
    pub inner: OpenaiErrorObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenaiErrorObject {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<Value>,
}
