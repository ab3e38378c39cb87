//! Test helpers for integration tests.
//!
//! Provides a local HTTP server standing in for both the feed hosts and the
//! Telegram Bot API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::subscriber::DefaultGuard;

use news_digest::config::FetchConfig;
use news_digest::Config;

/// Bot token accepted by the mock Telegram endpoint.
pub const TEST_TOKEN: &str = "TEST";

/// Mutable state of the mock server.
#[derive(Default)]
pub struct MockState {
    /// Feed documents by name, served at `/feed/{name}`.
    pub feeds: HashMap<String, String>,
    /// Number of leading requests answered with 503, by feed name.
    pub failures: HashMap<String, usize>,
    /// Request count by feed name.
    pub hits: HashMap<String, usize>,
    /// (User-Agent, Accept) of every feed request.
    pub request_headers: Vec<(String, String)>,
    /// JSON bodies posted to `sendMessage`.
    pub messages: Vec<Value>,
    /// Status returned by `sendMessage` (200 when unset).
    pub telegram_status: Option<u16>,
}

type Shared = Arc<Mutex<MockState>>;

/// Running mock server.
pub struct MockServer {
    addr: SocketAddr,
    state: Shared,
}

impl MockServer {
    /// Start the server on an ephemeral loopback port.
    pub async fn start(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route("/feed/:name", get(feed_handler))
            .route(
                &format!("/bot{TEST_TOKEN}/sendMessage"),
                post(send_message_handler),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL of the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of a named feed.
    pub fn feed_url(&self, name: &str) -> String {
        format!("{}/feed/{}", self.base_url(), name)
    }

    /// Number of requests made for a feed.
    pub fn hits(&self, name: &str) -> usize {
        self.state.lock().unwrap().hits.get(name).copied().unwrap_or(0)
    }

    /// Messages received by the Telegram endpoint.
    pub fn messages(&self) -> Vec<Value> {
        self.state.lock().unwrap().messages.clone()
    }

    /// Headers of every feed request.
    pub fn request_headers(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().request_headers.clone()
    }

    /// Texts of the messages received by the Telegram endpoint.
    pub fn message_texts(&self) -> Vec<String> {
        self.messages()
            .iter()
            .map(|m| m["text"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Build a config that fetches from and delivers to this server.
    pub fn config(&self, seen_path: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.fetch = quick_fetch_config();
        config.telegram.bot_token = TEST_TOKEN.to_string();
        config.telegram.chat_id = "@digest_test".to_string();
        config.telegram.api_base = self.base_url();
        config.telegram.timeout_secs = 5;
        config.seen.path = seen_path.display().to_string();
        config
    }
}

/// Log output collected in memory.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's `warn` and higher events into the capture.
    pub fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything logged so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Fetch settings with no backoff and short timeouts.
pub fn quick_fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 5,
        max_attempts: 3,
        backoff_secs: 0,
        ..FetchConfig::default()
    }
}

/// Build an RSS 2.0 document from (title, link, description) triples.
///
/// Values are inserted verbatim, so they must already be XML-escaped.
pub fn rss(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link, description)| {
            format!(
                "<item><title>{title}</title><link>{link}</link>\
                 <description>{description}</description></item>"
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>Mock</title>\
         <link>http://mock.example</link><description>mock</description>\
         {body}</channel></rss>"
    )
}

async fn feed_handler(
    State(state): State<Shared>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();

    let header = |name: axum::http::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let seen_headers = (header(USER_AGENT), header(ACCEPT));
    state.request_headers.push(seen_headers);

    let hits = {
        let counter = state.hits.entry(name.clone()).or_insert(0);
        *counter += 1;
        *counter
    };

    if let Some(&failures) = state.failures.get(&name) {
        if hits <= failures {
            return (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response();
        }
    }

    match state.feeds.get(&name) {
        Some(xml) => ([(CONTENT_TYPE, "application/rss+xml")], xml.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn send_message_handler(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    state.messages.push(body);

    let status = state.telegram_status.unwrap_or(200);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status == StatusCode::OK {
        (status, Json(json!({ "ok": true }))).into_response()
    } else {
        (
            status,
            Json(json!({ "ok": false, "description": "Bad Request: chat not found" })),
        )
            .into_response()
    }
}
