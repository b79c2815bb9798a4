//! Logging trait for chat client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to
//! capture and log the traffic passing through a [`Client`], including
//! frames the stream parser dropped.
//!
//! [`Client`]: crate::Client

use crate::{ChatResponse, StreamEvent};

/// A trait for logging chat client operations.
///
/// Implement this trait to capture and record API interactions, including
/// both single-shot responses and individual streaming events.
///
/// # Example
///
/// ```rust,ignore
/// use banchan::{ChatResponse, ClientLogger, StreamEvent};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_response(&self, response: &ChatResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_stream_event(&self, event: &StreamEvent) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Stream event: {}", serde_json::to_string(event).unwrap()).unwrap();
///     }
///
///     fn log_dropped_frame(&self, frame: &str) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Dropped frame: {frame}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a complete response from a single-shot `send` call.
    ///
    /// This method is called once per successful `send` call with the full
    /// [`ChatResponse`] from the service.
    fn log_response(&self, response: &ChatResponse);

    /// Log an individual streaming event.
    ///
    /// This method is called for each [`StreamEvent`] parsed out of a
    /// streaming response, in arrival order, before the event is handed to
    /// the consumer.
    fn log_stream_event(&self, event: &StreamEvent);

    /// Log a `data:` frame that failed to parse and was dropped.
    ///
    /// Dropped frames never surface as errors to the consumer; this hook is
    /// the only way to observe them. The default implementation ignores
    /// them.
    fn log_dropped_frame(&self, frame: &str) {
        let _ = frame;
    }
}
