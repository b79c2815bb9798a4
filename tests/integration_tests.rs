//! Integration tests for the banchan SDK.
//!
//! Most tests run against an in-process fixture server speaking just enough
//! HTTP/1.1 for one exchange. The live tests at the bottom require a running
//! chat service and are gated on the BANCHAN_LIVE_TESTS environment
//! variable.

use std::net::SocketAddr;

use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use banchan::{Client, ImageAttachment, Session, StreamEvent};

/// Returns the byte offset just past the header terminator, if present.
fn headers_end(request: &[u8]) -> Option<usize> {
    request
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Parse the Content-Length header out of a raw header block.
fn content_length(headers: &str) -> usize {
    headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

/// Serve exactly one HTTP exchange with the given status line and body,
/// returning the raw request captured from the wire.
async fn serve_once(
    status_line: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if let Some(end) = headers_end(&request) {
                let headers = String::from_utf8_lossy(&request[..end]).to_string();
                if request.len() - end >= content_length(&headers) {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&request).to_string());
    });

    (addr, rx)
}

fn client_for(addr: SocketAddr, session: Option<Session>) -> Client {
    Client::with_options(Some(format!("http://{addr}")), session).unwrap()
}

#[tokio::test]
async fn send_adopts_session_id_from_response() {
    let (addr, request) = serve_once(
        "200 OK",
        "application/json",
        r#"{"session_id":"abc123","response":"hello back"}"#,
    )
    .await;
    let client = client_for(addr, None);

    let response = client.send("hello").await.unwrap();

    assert_eq!(response.session_id.as_deref(), Some("abc123"));
    assert_eq!(response.response.as_deref(), Some("hello back"));
    assert_eq!(client.session_id(), Some("abc123".to_string()));

    let request = request.await.unwrap();
    assert!(request.starts_with("POST /chat HTTP/1.1"));
    assert!(request.contains(r#""session_id":null"#));
}

#[tokio::test]
async fn send_without_session_id_in_response_clears_tracking() {
    let session = Session::new();
    session.set(Some("stale".to_string()));

    let (addr, request) = serve_once("200 OK", "application/json", r#"{"response":"hi"}"#).await;
    let client = client_for(addr, Some(session.clone()));

    client.send("hello").await.unwrap();

    // The response omitted session_id, so tracking is nulled out.
    assert_eq!(session.get(), None);

    let request = request.await.unwrap();
    assert!(request.contains(r#""session_id":"stale""#));
}

#[tokio::test]
async fn send_http_error_carries_status_and_preserves_session() {
    let session = Session::new();
    session.set(Some("keep-me".to_string()));

    let (addr, _request) = serve_once("500 Internal Server Error", "application/json", "{}").await;
    let client = client_for(addr, Some(session.clone()));

    let err = client.send("hello").await.unwrap_err();

    assert!(err.is_api());
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(session.get(), Some("keep-me".to_string()));
}

#[tokio::test]
async fn clear_session_then_request_sends_null() {
    let session = Session::new();
    session.set(Some("abc123".to_string()));

    let (addr, request) = serve_once(
        "200 OK",
        "application/json",
        r#"{"session_id":"next","response":"ok"}"#,
    )
    .await;
    let client = client_for(addr, Some(session));

    client.clear_session();
    client.send("fresh start").await.unwrap();

    let request = request.await.unwrap();
    assert!(request.contains(r#""session_id":null"#));
}

#[tokio::test]
async fn stream_yields_events_and_updates_session() {
    let body = "data: {\"type\":\"session\",\"session_id\":\"s-42\"}\n\ndata: {\"type\":\"text\",\"content\":\"hello\"}\n\ndata: {\"type\":\"done\"}\n\n";
    let (addr, request) = serve_once("200 OK", "text/event-stream", body).await;
    let client = client_for(addr, None);

    let stream = client.stream("hi").await.unwrap();
    let events: Vec<_> = stream.collect().await;

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0].as_ref().unwrap().session_id(),
        Some("s-42"),
    );
    assert_eq!(events[1].as_ref().unwrap().text(), Some("hello"));
    assert!(events[2].as_ref().unwrap().is_done());
    assert_eq!(client.session_id(), Some("s-42".to_string()));

    let request = request.await.unwrap();
    assert!(request.starts_with("POST /chat/stream HTTP/1.1"));
    // No attachments: the images key is absent, not an empty list.
    assert!(!request.contains("images"));
}

#[tokio::test]
async fn stream_with_images_preserves_order_and_mime_types() {
    let body = "data: {\"type\":\"done\"}\n\n";
    let (addr, request) = serve_once("200 OK", "text/event-stream", body).await;
    let client = client_for(addr, None);

    let stream = client
        .stream_with_images(
            "what are these?",
            vec![
                ImageAttachment::from_bytes(b"first", Some("image/png")),
                ImageAttachment::from_bytes(b"second", None),
            ],
        )
        .await
        .unwrap();
    let events: Vec<_> = stream.collect().await;
    assert_eq!(events.len(), 1);

    let request = request.await.unwrap();
    let first = request.find("Zmlyc3Q=").expect("first attachment present");
    let second = request.find("c2Vjb25k").expect("second attachment present");
    assert!(first < second);
    assert!(request.contains("image/png"));
    assert!(request.contains("image/jpeg"));
}

#[tokio::test]
async fn stream_skips_malformed_frames() {
    let body = "data: {\"type\":\"text\",\"content\":\"a\"}\n\ndata: not-json\n\ndata: {\"type\":\"text\",\"content\":\"b\"}\n\n";
    let (addr, _request) = serve_once("200 OK", "text/event-stream", body).await;
    let client = client_for(addr, None);

    let stream = client.stream("hi").await.unwrap();
    let events: Vec<_> = stream.collect().await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].as_ref().unwrap().text(), Some("a"));
    assert_eq!(events[1].as_ref().unwrap().text(), Some("b"));
}

#[tokio::test]
async fn stream_http_error_carries_status_and_preserves_session() {
    let session = Session::new();
    session.set(Some("keep-me".to_string()));

    let (addr, _request) =
        serve_once("503 Service Unavailable", "application/json", "{}").await;
    let client = client_for(addr, Some(session.clone()));

    let err = client.stream("hi").await.err().unwrap();

    assert!(err.is_api());
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(session.get(), Some("keep-me".to_string()));
}

#[tokio::test]
async fn connection_failure_is_a_connection_error() {
    // Bind then drop the listener so the port refuses connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, None);
    let err = client.stream("hi").await.err().unwrap();
    assert!(err.is_connection());
}

mod live {
    //! Tests against a real chat service. Set BANCHAN_LIVE_TESTS=1 (and
    //! BANCHAN_API_URL if the service is not local) to run them.

    use super::*;

    fn live_enabled() -> bool {
        if std::env::var("BANCHAN_LIVE_TESTS").is_err() {
            eprintln!("Skipping live test: BANCHAN_LIVE_TESTS not set");
            return false;
        }
        true
    }

    #[tokio::test]
    async fn simple_chat_roundtrip() {
        if !live_enabled() {
            return;
        }

        let client = Client::new().expect("Failed to create client");
        let response = client.send("Say 'test passed'").await;
        assert!(response.is_ok(), "Request should succeed: {response:?}");
    }

    #[tokio::test]
    async fn streaming_roundtrip() {
        if !live_enabled() {
            return;
        }

        let client = Client::new().expect("Failed to create client");
        let stream = client.stream("Count to 3").await.expect("stream request");
        futures::pin_mut!(stream);

        let mut saw_done = false;
        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::Done { .. }) => saw_done = true,
                Ok(_) => {}
                Err(e) => panic!("Error in stream: {e:?}"),
            }
        }
        assert!(saw_done, "Expected an explicit done event");
    }
}
