use std::env;
use std::fmt;
use std::sync::{Arc, OnceLock};

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::Client as ReqwestClient;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability;
use crate::session::Session;
use crate::sse::process_events;
use crate::types::{ChatRequest, ChatResponse, ImageAttachment, StreamChatRequest, StreamEvent};

/// Base URL used for local development and as the final fallback.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the base URL outside development.
const BASE_URL_ENV: &str = "BANCHAN_API_URL";

static BASE_URL: OnceLock<String> = OnceLock::new();

/// The base URL for the chat service, resolved once per process.
///
/// A plain Rust process has no serving host to inspect, so resolution goes
/// straight to the `BANCHAN_API_URL` override, falling back to the local
/// development URL. The result is cached for the process lifetime; it is
/// never re-resolved per request. [`Client::with_options`] bypasses the
/// cached value for callers that need an explicit endpoint.
pub fn base_url() -> &'static str {
    BASE_URL.get_or_init(|| resolve_base_url(None))
}

/// Resolve the base URL, optionally taking the serving host into account.
///
/// An embedding application that knows the host it is served from (the
/// browser-host-introspection analogue) can pass it here: loopback hosts
/// pin the local development URL regardless of any override.
pub fn resolve_base_url(host: Option<&str>) -> String {
    if let Some(host) = host {
        if host == "localhost" || host == "127.0.0.1" {
            return DEFAULT_BASE_URL.to_string();
        }
    }
    match env::var(BASE_URL_ENV) {
        Ok(url) if !url.is_empty() => url,
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

/// Client for a session-based streaming chat service.
///
/// The client owns a [`Session`] handle that correlates chat turns; every
/// outgoing request carries the current identifier and server responses
/// update it. No retries, backoff, or timeouts are applied anywhere: every
/// failure surfaces to the caller, and a hung connection blocks until the
/// transport gives up.
#[derive(Clone)]
pub struct Client {
    client: ReqwestClient,
    base_url: String,
    session: Session,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Client {
    /// Create a new client against the process-wide resolved base URL.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// An explicit `base_url` is validated and used in place of the
    /// process-wide resolution; an explicit `session` shares continuity
    /// state with other clients holding the same handle.
    pub fn with_options(base_url: Option<String>, session: Option<Session>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => {
                url::Url::parse(&url)
                    .map_err(|e| Error::url(format!("invalid base URL {url:?}: {e}"), Some(e)))?;
                url
            }
            None => self::base_url().to_string(),
        };

        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {e}"),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: session.unwrap_or_default(),
            logger: None,
        })
    }

    /// Attach a logger that observes responses, stream events, and dropped
    /// frames.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session handle this client reads and updates.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The current session identifier, if any.
    pub fn session_id(&self) -> Option<String> {
        self.session.get()
    }

    /// Unconditionally reset session tracking. Idempotent; the next request
    /// sends `session_id: null`.
    pub fn clear_session(&self) {
        self.session.clear();
    }

    /// Send a message and await the complete response.
    ///
    /// On success the stored session identifier is overwritten with the
    /// response's `session_id`, including overwriting with nothing when the
    /// server omits it. Failures leave the session untouched.
    pub async fn send(&self, message: impl Into<String>) -> Result<ChatResponse> {
        let url = format!("{}/chat", self.base_url);
        let body = ChatRequest::new(message, self.session.get());

        observability::CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                map_transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Error::api(
                status.as_u16(),
                format!("chat request to {url} failed"),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse chat response: {e}"),
                Some(Box::new(e)),
            )
        })?;

        self.session.set(parsed.session_id.clone());
        if let Some(logger) = &self.logger {
            logger.log_response(&parsed);
        }
        Ok(parsed)
    }

    /// Send a message and stream the response events.
    ///
    /// Returns a lazy stream of [`StreamEvent`] items; each event is handed
    /// over as soon as its frame is parsed. Dropping the stream releases the
    /// underlying connection.
    pub async fn stream(
        &self,
        message: impl Into<String>,
    ) -> Result<impl Stream<Item = Result<StreamEvent>>> {
        self.stream_with_images(message, Vec::new()).await
    }

    /// Send a message with image attachments and stream the response events.
    ///
    /// Attachments must already be encoded ([`ImageAttachment::from_paths`]
    /// converts a batch of files concurrently, preserving order); the whole
    /// list rides in the request body, never streamed incrementally. An
    /// empty list omits the `images` key from the body entirely.
    pub async fn stream_with_images(
        &self,
        message: impl Into<String>,
        images: Vec<ImageAttachment>,
    ) -> Result<impl Stream<Item = Result<StreamEvent>>> {
        let url = format!("{}/chat/stream", self.base_url);
        let body = StreamChatRequest::new(message, self.session.get(), images);

        observability::CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                map_transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Error::api(
                status.as_u16(),
                format!("stream request to {url} failed"),
            ));
        }

        let bytes = response.bytes_stream().map(|result| {
            result.map_err(|e| {
                observability::STREAM_ERRORS.click();
                Error::streaming(format!("Error in event stream: {e}"), Some(Box::new(e)))
            })
        });

        Ok(process_events(
            bytes,
            self.session.clone(),
            self.logger.clone(),
        ))
    }
}

/// Map a transport-level reqwest failure onto the SDK error taxonomy.
fn map_transport_error(e: reqwest::Error) -> Error {
    if e.is_connect() {
        Error::connection(
            format!("Failed to reach chat service: {e}"),
            Some(Box::new(e)),
        )
    } else {
        Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}
