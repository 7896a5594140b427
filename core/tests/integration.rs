//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the full
//! build → execute → normalize pipeline over real HTTP, through both the
//! default client and custom clients.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use mock_server::{EchoReply, FAILURE_BODY, SUCCESS_BODY};
use rest_core::{
    api, build_request_object, build_response, make_request, Client, ClientConfig, Method,
    Request, RestClientError, RestError,
};

/// One server per test binary; tests run in parallel against it.
fn server() -> SocketAddr {
    static ADDR: OnceLock<SocketAddr> = OnceLock::new();
    *ADDR.get_or_init(|| mock_server::spawn_background().expect("mock server failed to bind"))
}

fn url(path: &str) -> String {
    format!("http://{}{path}", server())
}

#[test]
fn staged_pipeline_normalizes_response() {
    let request = Request::new(Method::GET, url("/"));

    let built = build_request_object(request).unwrap();
    let raw = make_request(built).unwrap();
    let (parts, body) = raw.into_parts();
    let response = build_response(ureq::http::Response::from_parts(parts, body.into_reader())).unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, SUCCESS_BODY);
    assert!(!response.headers.is_empty());
}

#[test]
fn api_with_headers_and_query() {
    let request = Request::new(Method::GET, url("/test_endpoint"))
        .header("Content-Type", "application/json")
        .bearer_auth("API_KEY")
        .query_param("test", "1")
        .query_param("test2", "2");

    let response = api(request).unwrap();

    assert_eq!(response.status_code, 200);
    assert!(!response.body.is_empty());
    assert!(!response.headers.is_empty());
    assert_eq!(response.header("Content-Type"), Some("application/json"));
}

#[test]
fn api_rejects_invalid_method_before_sending() {
    let result = api(Request {
        method: Method::new("@"),
        ..Request::default()
    });
    assert!(matches!(result, Err(RestClientError::InvalidMethod { .. })));
}

#[test]
fn request_reaches_server_as_described() {
    let request = Request::new(Method::POST, url("/echo"))
        .header("X-Trace", "abc")
        .query_param("page", "2")
        .query_param("limit", "10")
        .body(r#"{"name":"widget"}"#);

    let response = api(request).unwrap();
    let reply: EchoReply = response.json().unwrap();

    assert_eq!(reply.method, "POST");
    assert_eq!(reply.query["page"], "2");
    assert_eq!(reply.query["limit"], "10");
    assert_eq!(reply.headers["x-trace"], "abc");
    assert_eq!(reply.headers["content-type"], "application/json");
    assert_eq!(reply.body, r#"{"name":"widget"}"#);
}

#[test]
fn extension_method_reaches_server() {
    let reply: EchoReply = api(Request::new("PURGE", url("/echo")))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(reply.method, "PURGE");
}

#[test]
fn caller_content_type_reaches_server() {
    let request = Request::new(Method::PUT, url("/echo"))
        .header("Content-Type", "text/plain")
        .body("plain text");

    let reply: EchoReply = api(request).unwrap().json().unwrap();

    assert_eq!(reply.method, "PUT");
    assert_eq!(reply.headers["content-type"], "text/plain");
    assert_eq!(reply.body, "plain text");
}

#[test]
fn error_status_is_returned_as_data() {
    let response = api(Request::new(Method::GET, url("/status/404"))).unwrap();

    assert_eq!(response.status_code, 404);
    assert_eq!(response.body, FAILURE_BODY);
    assert!(!response.is_success());
}

#[test]
fn caller_wraps_failure_in_rest_error() {
    fn fetch(path: &str) -> Result<String, RestClientError> {
        let response = api(Request::new(Method::DELETE, url(path)))?;
        if !response.is_success() {
            return Err(RestError::new(response).into());
        }
        Ok(response.body)
    }

    let err = fetch("/status/500").unwrap_err();
    match err {
        RestClientError::Status(rest) => {
            assert_eq!(rest.status_code(), 500);
            assert_eq!(rest.to_string(), FAILURE_BODY);
        }
        other => panic!("expected Status, got {other:?}"),
    }
    assert_eq!(fetch("/").unwrap(), SUCCESS_BODY);
}

#[test]
fn repeated_headers_are_preserved() {
    let response = api(Request::new(Method::GET, url("/multi"))).unwrap();
    assert_eq!(response.headers["set-cookie"], ["a=1", "b=2"]);
}

#[test]
fn custom_client_times_out() {
    let client = Client::with_timeout(Duration::from_millis(10));
    let request = Request::new(Method::GET, url("/slow")).query_param("delay_ms", "200");

    let err = client.api(request).unwrap_err();

    assert!(err.is_timeout(), "expected a timeout, got {err:?}");
    let message = err.to_string().to_lowercase();
    assert!(
        message.contains("timeout") || message.contains("timed out"),
        "unexpected message: {message}"
    );
}

#[test]
fn custom_client_with_generous_timeout_succeeds() {
    let client = Client::with_config(ClientConfig {
        timeout: Some(Duration::from_secs(5)),
        connect_timeout: Some(Duration::from_secs(1)),
        ..ClientConfig::default()
    });
    let request = Request::new(Method::GET, url("/slow")).query_param("delay_ms", "20");

    let response = client.api(request).unwrap();
    assert_eq!(response.status_code, 200);
}

#[test]
fn caller_supplied_agent_is_used_as_is() {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(true)
        .build()
        .new_agent();
    let client = Client::from_agent(agent);

    let result = client.api(Request::new(Method::GET, url("/status/404")));

    assert!(matches!(
        result,
        Err(RestClientError::Transport(ureq::Error::StatusCode(404)))
    ));
    assert_eq!(client.api(Request::new(Method::GET, url("/"))).unwrap().status_code, 200);
}

#[test]
fn connection_refused_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let result = api(Request::new(Method::GET, format!("http://{addr}/")));
    assert!(matches!(result, Err(RestClientError::Transport(_))));
}

#[test]
fn shared_client_serves_concurrent_callers() {
    let client = Client::new();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = client.clone();
            std::thread::spawn(move || {
                let request = Request::new(Method::GET, url("/echo")).query_param("n", i.to_string());
                let reply: EchoReply = client.api(request).unwrap().json().unwrap();
                reply.query["n"].clone()
            })
        })
        .collect();

    let mut seen: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    seen.sort();
    assert_eq!(seen, ["0", "1", "2", "3"]);
}
