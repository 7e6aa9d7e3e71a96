//! In-process API double for HTTP-level tests.
//!
//! Every request is recorded; the reply comes from a per-test closure.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::config::AdminConfig;
use crate::net::ApiClient;
use crate::state::session::{SessionEvents, SessionStore};
use crate::state::storage::MemoryStorage;

#[derive(Clone, Debug)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self { status, body: body.to_string() }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self { status, body: body.to_owned() }
    }
}

type Responder = Arc<dyn Fn(&Captured) -> Reply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    captured: Arc<Mutex<Vec<Captured>>>,
    responder: Responder,
}

pub struct MockServer {
    pub base_url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockServer {
    pub async fn spawn<F>(responder: F) -> Self
    where
        F: Fn(&Captured) -> Reply + Send + Sync + 'static,
    {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState { captured: captured.clone(), responder: Arc::new(responder) };
        let app = Router::new().fallback(record).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}/api"), captured }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn last(&self) -> Captured {
        self.requests().pop().expect("no request captured")
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let captured = Captured {
        method: method.to_string(),
        path: uri.path().to_owned(),
        query: uri.query().map(ToOwned::to_owned),
        headers,
        body: body.to_vec(),
    };
    let reply = (state.responder)(&captured);
    state.captured.lock().unwrap().push(captured);

    let status = StatusCode::from_u16(reply.status).unwrap();
    if reply.body.is_empty() {
        return status.into_response();
    }
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub fn config_for(base_url: &str) -> AdminConfig {
    AdminConfig { api_url: base_url.to_owned(), ..AdminConfig::default() }
}

/// Fresh in-memory session plus a client pointed at `base_url`.
pub fn client_for(base_url: &str) -> (ApiClient, Arc<SessionStore>, Arc<MemoryStorage>, SessionEvents) {
    client_with_config(&config_for(base_url))
}

pub fn client_with_config(config: &AdminConfig) -> (ApiClient, Arc<SessionStore>, Arc<MemoryStorage>, SessionEvents) {
    let storage = Arc::new(MemoryStorage::new());
    let (session, events) = SessionStore::initialize(storage.clone());
    let session = Arc::new(session);
    let client = ApiClient::new(config, session.clone()).unwrap();
    (client, session, storage, events)
}
