//! Integration tests for the inference crate against a scripted local server.
//!
//! A throwaway `TcpListener` plays the generate endpoint: it captures the
//! request and replays a canned HTTP response, optionally pausing between
//! chunks or cutting the connection short. No real model is needed.

use std::time::Duration;

use inference::{query, InferenceError, OllamaClient, OllamaConfig, StreamEnd};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One step of the scripted response.
enum Part {
    /// Write these bytes.
    Send(String),
    /// Sleep before the next step.
    Pause(Duration),
}

/// The request as seen by the server.
struct Captured {
    head: String,
    body: serde_json::Value,
}

fn ndjson_head() -> Part {
    Part::Send(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/x-ndjson\r\n\
         Connection: close\r\n\r\n"
            .to_string(),
    )
}

fn send(s: &str) -> Part {
    Part::Send(s.to_string())
}

/// Accept one connection, capture the request, then play `parts` and close.
async fn serve_once(parts: Vec<Part>) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/api/generate", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut sock).await;
        for part in parts {
            match part {
                Part::Send(s) => {
                    sock.write_all(s.as_bytes()).await.unwrap();
                    sock.flush().await.unwrap();
                }
                Part::Pause(d) => tokio::time::sleep(d).await,
            }
        }
        let _ = sock.shutdown().await;
        captured
    });

    (url, handle)
}

async fn read_request(sock: &mut tokio::net::TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = sock.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length: usize = head
        .lines()
        .find_map(|l| {
            let (name, value) = l.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = sock.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending body");
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = serde_json::from_slice(&buf[head_end..head_end + content_length]).unwrap();
    Captured { head, body }
}

fn client_for(url: &str) -> OllamaClient {
    let mut cfg = OllamaConfig::new(url, "gpt-oss");
    cfg.timeout_secs = 10;
    cfg.connect_timeout_secs = 2;
    OllamaClient::new(cfg).unwrap()
}

fn client_with_timeout(url: &str, timeout_secs: u64) -> OllamaClient {
    let mut cfg = OllamaConfig::new(url, "gpt-oss");
    cfg.timeout_secs = timeout_secs;
    cfg.connect_timeout_secs = 2;
    OllamaClient::new(cfg).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_query_concatenates_stream() {
    let (url, server) = serve_once(vec![
        ndjson_head(),
        send("{\"response\":\"Yes\"}\n{\"response\":\", x0=1\"}\n"),
    ])
    .await;

    let answer = client_for(&url).query("Is it satisfiable?").await.unwrap();
    assert_eq!(answer.text, "Yes, x0=1");
    assert_eq!(answer.fragments, 2);
    assert!(answer.is_complete());

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /api/generate HTTP/1.1\r\n"));
    assert!(captured
        .head
        .to_ascii_lowercase()
        .contains("content-type: application/json"));
    assert_eq!(captured.body["model"], "gpt-oss");
    assert_eq!(captured.body["prompt"], "Is it satisfiable?");
}

#[tokio::test]
async fn test_free_query_function_returns_text() {
    let (url, _server) = serve_once(vec![
        ndjson_head(),
        send("{\"response\":\"No\",\"done\":false}\n"),
        send("{\"response\":\"\",\"done\":true,\"context\":[1,2,3]}\n"),
    ])
    .await;

    let text = query(&url, "gpt-oss", "prompt").await.unwrap();
    assert_eq!(text, "No");
}

#[tokio::test]
async fn test_stream_delivered_in_pieces() {
    let (url, _server) = serve_once(vec![
        ndjson_head(),
        send("{\"response\":\"x0=1, \"}\n{\"resp"),
        Part::Pause(Duration::from_millis(30)),
        send("onse\":\"x1=0\"}\n"),
        Part::Pause(Duration::from_millis(30)),
        send("{\"response\":\", x2=¬\"}\n{\"response\":\"\",\"done\":true}\n"),
    ])
    .await;

    let answer = client_for(&url).query("p").await.unwrap();
    assert_eq!(answer.text, "x0=1, x1=0, x2=¬");
    assert!(answer.done);
    assert_eq!(answer.end, StreamEnd::Completed);
}

#[tokio::test]
async fn test_malformed_fragment_skipped() {
    let (url, _server) = serve_once(vec![
        ndjson_head(),
        send("{\"response\": oops\n{\"response\":\"Yes\"}\n"),
    ])
    .await;

    let answer = client_for(&url).query("p").await.unwrap();
    assert_eq!(answer.text, "Yes");
    assert_eq!(answer.skipped_fragments, 1);
    assert_eq!(answer.end, StreamEnd::Completed);
    assert!(!answer.is_complete());
}

#[tokio::test]
async fn test_severed_stream_returns_partial_answer() {
    // Promise more bytes than we send, then hang up.
    let (url, _server) = serve_once(vec![
        send(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/x-ndjson\r\n\
             Content-Length: 4096\r\n\r\n",
        ),
        send("{\"response\":\"Yes\"}\n{\"response\":\", x0"),
    ])
    .await;

    let answer = client_for(&url).query("p").await.unwrap();
    assert_eq!(answer.text, "Yes");
    assert!(matches!(answer.end, StreamEnd::Severed(_)));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let body = "{\"error\":\"model 'nope' not found\"}";
    let (url, _server) = serve_once(vec![send(&format!(
        "HTTP/1.1 404 Not Found\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    ))])
    .await;

    match client_for(&url).query("p").await {
        Err(InferenceError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("Expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/api/generate");
    let result = client_for(&url).query("p").await;
    assert!(matches!(result, Err(InferenceError::Transport(_))));
}

#[tokio::test]
async fn test_timeout_mid_stream_keeps_partial_text() {
    let (url, _server) = serve_once(vec![
        ndjson_head(),
        send("{\"response\":\"Yes\"}\n"),
        Part::Pause(Duration::from_secs(30)),
        send("{\"response\":\" (never sent)\"}\n"),
    ])
    .await;

    let started = std::time::Instant::now();
    let answer = client_with_timeout(&url, 1).query("p").await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(answer.text, "Yes");
    assert!(matches!(answer.end, StreamEnd::Severed(_)), "got {:?}", answer.end);
}

#[tokio::test]
async fn test_timeout_before_headers_is_transport_error() {
    let (url, _server) = serve_once(vec![Part::Pause(Duration::from_secs(30))]).await;

    let started = std::time::Instant::now();
    let err = client_with_timeout(&url, 1).query("p").await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(matches!(err, InferenceError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_cancel_mid_stream_keeps_partial_text() {
    let (url, _server) = serve_once(vec![
        ndjson_head(),
        send("{\"response\":\"Yes\"}\n"),
        Part::Pause(Duration::from_secs(30)),
        send("{\"response\":\" (never sent)\"}\n"),
    ])
    .await;

    let answer = client_for(&url)
        .query_until("p", tokio::time::sleep(Duration::from_millis(300)))
        .await
        .unwrap();
    assert_eq!(answer.text, "Yes");
    assert_eq!(answer.end, StreamEnd::Cancelled);
}

#[tokio::test]
async fn test_cancel_before_response() {
    // Server reads the request and never answers.
    let (url, _server) = serve_once(vec![Part::Pause(Duration::from_secs(30))]).await;

    let answer = client_for(&url)
        .query_until("p", tokio::time::sleep(Duration::from_millis(200)))
        .await
        .unwrap();
    assert!(answer.text.is_empty());
    assert_eq!(answer.end, StreamEnd::Cancelled);
}
