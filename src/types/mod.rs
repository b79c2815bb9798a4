// Public modules
pub mod chat_request;
pub mod chat_response;
pub mod image_attachment;
pub mod stream_event;

// Re-exports
pub use chat_request::{ChatRequest, StreamChatRequest};
pub use chat_response::ChatResponse;
pub use image_attachment::ImageAttachment;
pub use stream_event::StreamEvent;
