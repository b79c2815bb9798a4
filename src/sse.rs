//! Server-sent event processing for streaming chat responses.
//!
//! This module converts the raw byte stream of a `POST /chat/stream`
//! response into a lazy stream of [`StreamEvent`] values. Frames arrive as
//! `data: <json>` lines; bytes accumulate in a carried buffer and a frame is
//! only decoded once its terminating newline has been buffered, so lines and
//! multi-byte characters split across chunk boundaries reassemble correctly.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};

use crate::client_logger::ClientLogger;
use crate::error::Result;
use crate::observability;
use crate::session::Session;
use crate::types::StreamEvent;

/// Literal prefix of a data frame line. Lines without it are not frames.
const DATA_PREFIX: &str = "data: ";

/// State carried across polls of the event stream.
struct EventStreamState<S> {
    stream: S,
    buffer: BytesMut,
    session: Session,
    logger: Option<Arc<dyn ClientLogger>>,
}

/// Process a stream of bytes into a stream of chat events.
///
/// A `session` frame that carries an identifier updates the session handle
/// before the event is yielded. Frames that fail to parse are dropped
/// without surfacing an error; [`ClientLogger::log_dropped_frame`] is the
/// hook for observing them. The stream terminates when the byte stream
/// ends, with no synthetic final event: the server's `done` event is the
/// only end-of-conversation signal.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use futures::StreamExt;
///
/// use banchan::{Session, sse::process_events};
///
/// # tokio_test::block_on(async {
/// let frame = "data: {\"type\":\"session\",\"session_id\":\"abc123\"}\n";
/// let bytes = futures::stream::iter(vec![Ok::<_, banchan::Error>(
///     Bytes::from_static(frame.as_bytes()),
/// )]);
///
/// let session = Session::new();
/// let events = process_events(bytes, session.clone(), None);
/// futures::pin_mut!(events);
///
/// let event = events.next().await.unwrap().unwrap();
/// assert_eq!(event.session_id(), Some("abc123"));     // Event yielded
/// assert_eq!(session.get(), Some("abc123".to_string())); // Session adopted
/// # })
/// ```
pub fn process_events<S>(
    byte_stream: S,
    session: Session,
    logger: Option<Arc<dyn ClientLogger>>,
) -> impl Stream<Item = Result<StreamEvent>>
where
    S: Stream<Item = Result<Bytes>> + Unpin + 'static,
{
    let state = EventStreamState {
        stream: byte_stream,
        buffer: BytesMut::new(),
        session,
        logger,
    };

    stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        loop {
            // Drain complete lines already buffered before reading more.
            while let Some(line) = state.next_line() {
                if let Some(item) = state.handle_line(&line) {
                    return Some((item, Some(state)));
                }
            }

            match state.stream.next().await {
                Some(Ok(bytes)) => state.buffer.extend_from_slice(&bytes),
                Some(Err(e)) => return Some((Err(e), Some(state))),
                None => {
                    // End of input. A trailing line that arrived without its
                    // terminator is still a candidate frame.
                    if !state.buffer.is_empty() {
                        let line = state.buffer.split().freeze();
                        if let Some(item) = state.handle_line(&line) {
                            return Some((item, None));
                        }
                    }
                    return None;
                }
            }
        }
    })
}

impl<S> EventStreamState<S> {
    /// Split off the next complete newline-terminated line, if one is
    /// buffered. The terminator is not included in the returned line.
    fn next_line(&mut self) -> Option<Bytes> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line = self.buffer.split_to(pos + 1);
        line.truncate(pos);
        Some(line.freeze())
    }

    /// Process one line, returning an item to yield or `None` when the line
    /// produced no event (not a data frame, empty payload, or dropped).
    fn handle_line(&self, raw: &[u8]) -> Option<Result<StreamEvent>> {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                observability::STREAM_ERRORS.click();
                return Some(Err(e.into()));
            }
        };

        let data = line.strip_prefix(DATA_PREFIX)?.trim();
        if data.is_empty() {
            return None;
        }

        match serde_json::from_str::<StreamEvent>(data) {
            Ok(event) => {
                if let StreamEvent::Session {
                    session_id: Some(id),
                } = &event
                {
                    self.session.set(Some(id.clone()));
                }
                observability::STREAM_EVENTS.click();
                if let Some(logger) = &self.logger {
                    logger.log_stream_event(&event);
                }
                Some(Ok(event))
            }
            Err(_) => {
                // Malformed or partial frames are tolerated, not surfaced.
                observability::STREAM_DROPPED_FRAMES.click();
                if let Some(logger) = &self.logger {
                    logger.log_dropped_frame(data);
                }
                None
            }
        }
    }
}
