use serde::{Deserialize, Serialize};

/// One discrete unit of server-pushed information during a streaming chat
/// exchange, tagged by its `type` field.
///
/// Every field beyond the tag is optional at the contract level; consumers
/// must not assume presence. Unknown sibling fields in a frame are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Announces the session identifier for this conversation.
    ///
    /// Sent first by the service; the client adopts the identifier for all
    /// subsequent requests.
    Session {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },

    /// A tool invocation started or finished on the service side.
    Tool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },

    /// Incremental progress from a running tool.
    ToolProgress {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// A chunk of assistant response text.
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },

    /// The service finished the turn.
    ///
    /// This is the only definitive end-of-conversation signal; the
    /// transport-level end of stream carries no event of its own.
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        map_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        images: Option<Vec<String>>,
    },

    /// The service reported an error for this turn.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl StreamEvent {
    /// Returns the session identifier carried by a `session` event.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            StreamEvent::Session { session_id } => session_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the text content carried by a `text` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Text { content } => content.as_deref(),
            _ => None,
        }
    }

    /// Returns true for the service's explicit end-of-turn event.
    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done { .. })
    }
}
