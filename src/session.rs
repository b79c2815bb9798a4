//! Session continuity state shared across chat calls.
//!
//! The chat service correlates turns of a conversation with an opaque
//! session identifier that it hands back on every response. This module
//! provides the [`Session`] handle that tracks that identifier on the
//! client side.

use std::sync::{Arc, Mutex, PoisonError};

/// A handle to the session identifier for a conversation.
///
/// Cloning the handle shares the underlying cell: a stream in flight
/// writes the same identifier its client reads on the next request.
/// The identifier starts unset, is set only from server-supplied values,
/// and is cleared only by [`Session::clear`]. Concurrent calls that both
/// write race with last-writer-wins semantics; the lock protects the cell,
/// not call ordering.
#[derive(Clone, Debug, Default)]
pub struct Session {
    id: Arc<Mutex<Option<String>>>,
}

impl Session {
    /// Creates a new session handle with no identifier set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current session identifier, if any.
    pub fn get(&self) -> Option<String> {
        self.id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Overwrites the session identifier, including overwriting with `None`.
    pub fn set(&self, id: Option<String>) {
        *self.id.lock().unwrap_or_else(PoisonError::into_inner) = id;
    }

    /// Unconditionally resets the session identifier. Idempotent.
    pub fn clear(&self) {
        self.set(None);
    }

    /// Returns true if a session identifier is currently set.
    pub fn is_active(&self) -> bool {
        self.id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
