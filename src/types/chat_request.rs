use serde::{Deserialize, Serialize};

use crate::types::ImageAttachment;

/// Request body for the single-shot `POST /chat` endpoint.
///
/// `session_id` is always present in the serialized body, as an explicit
/// `null` when no session is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,

    /// The current session identifier, or `null` for a fresh conversation.
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Create a new single-shot chat request.
    pub fn new(message: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            session_id,
        }
    }
}

/// Request body for the streaming `POST /chat/stream` endpoint.
///
/// The `images` key is omitted from the serialized body entirely when there
/// are no attachments; it is never sent as an empty list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamChatRequest {
    /// The user's message.
    pub message: String,

    /// The current session identifier, or `null` for a fresh conversation.
    pub session_id: Option<String>,

    /// Image attachments, in the order the caller supplied them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageAttachment>>,
}

impl StreamChatRequest {
    /// Create a new streaming chat request.
    ///
    /// An empty attachment list maps to `None` so the `images` key is
    /// dropped from the wire format.
    pub fn new(
        message: impl Into<String>,
        session_id: Option<String>,
        images: Vec<ImageAttachment>,
    ) -> Self {
        Self {
            message: message.into(),
            session_id,
            images: if images.is_empty() {
                None
            } else {
                Some(images)
            },
        }
    }
}
