use serde::{Deserialize, Serialize};

/// Response body from the single-shot `POST /chat` endpoint.
///
/// The contract is owned by the service; beyond `session_id` (and the
/// convenience `response` text) the body is opaque to this crate, so any
/// other fields are carried through in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatResponse {
    /// The session identifier to carry into subsequent turns.
    ///
    /// A response that omits or nulls this field clears client-side
    /// session tracking.
    #[serde(default)]
    pub session_id: Option<String>,

    /// The assistant's response text, when the service includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Any additional fields the service returned.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
