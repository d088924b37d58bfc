//! Echo server used by the integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Router};
use courier_common_log::LogConfig;
use courier_http::{serve, ServerConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

static LOGGING: Once = Once::new();

/// Install the log subscriber once per test binary.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = courier_common_log::init(LogConfig::from_env());
    });
}

/// Server that echoes parts of each request back as the body.
pub struct EchoServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl EchoServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        init_logging();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind echo server");
        let addr = listener.local_addr().expect("echo server address");
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let shutdown = async move {
                let _ = rx.await;
            };
            serve(listener, router(), &config, shutdown)
                .await
                .expect("echo server");
        });

        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for EchoServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn router() -> Router {
    Router::new()
        .route("/get", get(echo_query))
        .route("/post-form", post(echo_form))
        .route("/post-body", post(echo_body))
        .route("/header", get(echo_header).post(echo_header))
        .route("/headers/:name", get(echo_header_values).post(echo_header_values))
        .route("/status/:code", get(status).post(status))
        .route("/slow", get(slow))
}

async fn echo_query(Query(params): Query<HashMap<String, String>>) -> String {
    params.get("v").cloned().unwrap_or_default()
}

async fn echo_form(Form(params): Form<HashMap<String, String>>) -> String {
    params.get("v").cloned().unwrap_or_default()
}

async fn echo_body(body: String) -> String {
    body
}

async fn echo_header(headers: HeaderMap) -> String {
    headers
        .get("h")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn echo_header_values(Path(name): Path<String>, headers: HeaderMap) -> String {
    headers
        .get_all(name.as_str())
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(",")
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {}", code))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "late"
}
