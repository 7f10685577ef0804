#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Serves `app` on an ephemeral localhost port from a background thread.
pub fn spawn_router(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().expect("local addr");
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, app).await.expect("mock server");
        });
    });
    addr
}

#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub account_id: Option<String>,
    pub accept: Option<String>,
    pub api_id: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone)]
struct ProviderState {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Stand-in for the provider's site listing endpoint.
pub struct MockProvider {
    pub url: String,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockProvider {
    pub fn start(status: u16, body: impl Into<String>) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = ProviderState {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.into(),
            hits: hits.clone(),
            seen: seen.clone(),
        };
        let app = Router::new()
            .route("/api/prov/v1/sites/list", post(list_sites))
            .with_state(state);
        let addr = spawn_router(app);
        Self {
            url: format!("http://{}/api/prov/v1/sites/list", addr),
            hits,
            seen,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SeenRequest> {
        self.seen.lock().expect("seen lock").last().cloned()
    }
}

async fn list_sites(
    State(state): State<ProviderState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    state.seen.lock().expect("seen lock").push(SeenRequest {
        account_id: query.get("account_id").cloned(),
        accept: header_str("accept"),
        api_id: header_str("x-api-id"),
        api_key: header_str("x-api-key"),
    });
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
        .into_response()
}

/// Origin that answers every request with 200 and the given extra headers.
pub fn spawn_origin(extra_headers: &[(&'static str, &'static str)]) -> SocketAddr {
    let extra = extra_headers.to_vec();
    let app = Router::new().fallback(move || {
        let extra = extra.clone();
        async move {
            let mut resp = (StatusCode::OK, "origin says hi").into_response();
            for (k, v) in extra {
                resp.headers_mut().append(k, HeaderValue::from_static(v));
            }
            resp
        }
    });
    spawn_router(app)
}

/// Origin that accepts connections and never answers.
pub fn spawn_silent_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind silent origin");
    let addr = listener.local_addr().expect("local addr");
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            match stream {
                Ok(s) => held.push(s),
                Err(_) => break,
            }
        }
    });
    addr
}

/// A localhost port with nothing listening on it.
pub fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

pub fn write_env_file(dir: &Path, endpoint: &str, skip: Option<&str>) -> PathBuf {
    let mut contents = String::new();
    for (key, value) in [
        ("API_ENDPOINT", endpoint),
        ("API_KEY", "test-api-key-0123456789"),
        ("API_ID", "31337"),
        ("ACCOUNT_ID", "4242"),
    ] {
        if Some(key) != skip {
            contents.push_str(&format!("{}={}\n", key, value));
        }
    }
    let path = dir.join(".env");
    std::fs::write(&path, contents).expect("write env file");
    path
}
