use std::{collections::BTreeMap, net::SocketAddr, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Body returned by the success routes. The trailing newline matches what a
/// plain `fprintln`-style handler writes.
pub const SUCCESS_BODY: &str = "{\"message\": \"success\"}\n";

/// Body returned by `/status/{code}`.
pub const FAILURE_BODY: &str = "{\"result\": \"failure\"}";

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoReply {
    pub method: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Deserialize)]
pub struct SlowParams {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    200
}

pub fn app() -> Router {
    Router::new()
        .route("/", any(success))
        .route("/test_endpoint", any(success))
        .route("/slow", get(slow))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/multi", get(multi))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Start the server on an ephemeral port in a background thread and return
/// its address. The server lives until the process exits.
pub fn spawn_background() -> std::io::Result<SocketAddr> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(err) => {
                tracing::error!(error = %err, "failed to start mock server runtime");
                return;
            }
        };
        let result = rt.block_on(async {
            let listener = TcpListener::from_std(std_listener)?;
            run(listener).await
        });
        if let Err(err) = result {
            tracing::error!(error = %err, "mock server stopped");
        }
    });

    Ok(addr)
}

async fn success() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], SUCCESS_BODY)
}

async fn slow(Query(params): Query<SlowParams>) -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(params.delay_ms)).await;
    success().await
}

async fn echo(
    method: Method,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<EchoReply> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(EchoReply {
        method: method.to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], FAILURE_BODY)
}

async fn multi() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, "a=1"), (header::SET_COOKIE, "b=2")]),
        "ok",
    )
}
