//! In-process fake of the Fay backend: canned HTTP answers plus a scripted
//! panel WebSocket at `/ws`. Every request and inbound frame is recorded.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub content_type: String,
    pub body: String,
}

impl Hit {
    /// JSON carried in a form-encoded `data=` body.
    pub fn form_data(&self) -> Value {
        let url = reqwest::Url::parse(&format!("http://fake/?{}", self.body)).unwrap();
        let (_, data) = url.query_pairs().find(|(k, _)| k == "data").unwrap();
        serde_json::from_str(&data).unwrap()
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Default)]
struct Inner {
    responses: HashMap<String, (u16, String)>,
    hits: Vec<Hit>,
    script: Vec<String>,
    close_after_script: bool,
    connected_at: Vec<Instant>,
    received: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

pub struct Served {
    pub api_url: String,
    pub ws_url: String,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned answer for `path`. Unknown paths get a 404.
    pub fn respond(&self, path: &str, status: u16, body: &str) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .responses
            .insert(path.to_owned(), (status, body.to_owned()));
        self
    }

    /// Frames sent on every new socket connection, optionally followed by a close.
    pub fn script(&self, frames: &[&str], close_after: bool) -> &Self {
        let mut g = self.inner.lock().unwrap();
        g.script = frames.iter().map(|f| f.to_string()).collect();
        g.close_after_script = close_after;
        self
    }

    pub fn hits(&self, path: &str) -> Vec<Hit> {
        self.inner
            .lock()
            .unwrap()
            .hits
            .iter()
            .filter(|h| h.path == path)
            .cloned()
            .collect()
    }

    pub fn total_hits(&self) -> usize {
        self.inner.lock().unwrap().hits.len()
    }

    pub fn connections(&self) -> Vec<Instant> {
        self.inner.lock().unwrap().connected_at.clone()
    }

    pub fn received(&self) -> Vec<String> {
        self.inner.lock().unwrap().received.clone()
    }

    pub async fn serve(&self) -> Served {
        let app = Router::new()
            .route("/ws", get(ws_handler))
            .fallback(http_handler)
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Served {
            api_url: format!("http://{addr}"),
            ws_url: format!("ws://{addr}/ws"),
        }
    }
}

async fn http_handler(
    State(fake): State<FakeBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_owned();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let mut g = fake.inner.lock().unwrap();
    g.hits.push(Hit { method: method.to_string(), path: path.clone(), content_type, body });
    match g.responses.get(&path) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap(),
            [(CONTENT_TYPE, "text/html; charset=utf-8")],
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn ws_handler(State(fake): State<FakeBackend>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_socket(fake, socket))
}

async fn run_socket(fake: FakeBackend, mut socket: WebSocket) {
    let (frames, close) = {
        let mut g = fake.inner.lock().unwrap();
        g.connected_at.push(Instant::now());
        (g.script.clone(), g.close_after_script)
    };

    for frame in frames {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }
    if close {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        if let Message::Text(text) = msg {
            fake.inner.lock().unwrap().received.push(text.as_str().to_owned());
        }
    }
}

/// Poll `cond` until it holds or the deadline passes.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}
