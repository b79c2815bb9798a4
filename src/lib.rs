// Public modules
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod session;
pub mod sse;
pub mod types;

// Re-exports
pub use client::{Client, base_url, resolve_base_url};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use session::Session;
pub use types::*;
