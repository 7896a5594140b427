//! Blocking transport and the build → execute → normalize pipeline.
//!
//! # Design
//! `Client` wraps a `ureq::Agent`. The agent is configured with
//! `http_status_as_error(false)` so 4xx/5xx responses come back as data and
//! the caller decides what counts as failure. A process-wide default client
//! is created lazily and never mutated; callers who need different settings
//! build their own `Client` and pass it around (clones share the agent's
//! connection pool).

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use ureq::http;
use ureq::Agent;

use crate::builder::{build_request_object, build_response};
use crate::error::RestClientError;
use crate::http::{Request, Response};

static DEFAULT_CLIENT: OnceLock<Client> = OnceLock::new();

/// Transport settings for a [`Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bound on the whole call, including reading the body. `None` waits
    /// indefinitely.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Redirects followed before giving up. `0` disables following.
    pub max_redirects: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            max_redirects: 10,
        }
    }
}

/// Executes transport-ready requests. Safe to share across threads.
#[derive(Clone)]
pub struct Client {
    agent: Agent,
}

impl Client {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .timeout_global(config.timeout)
            .timeout_connect(config.connect_timeout)
            .max_redirects(config.max_redirects)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_config(ClientConfig {
            timeout: Some(timeout),
            ..ClientConfig::default()
        })
    }

    /// Use a caller-configured agent as-is. Unless the agent was built with
    /// `http_status_as_error(false)`, ureq reports 4xx/5xx as transport errors,
    /// and without `allow_non_standard_methods(true)` it refuses extension
    /// verbs.
    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }

    /// Send `request` and return the raw response with its body unread.
    pub fn make_request(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<ureq::Body>, RestClientError> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        tracing::debug!(%method, %uri, "sending request");

        let (parts, body) = request.into_parts();
        let result = if body.is_empty() {
            self.agent.run(http::Request::from_parts(parts, ()))
        } else {
            self.agent.run(http::Request::from_parts(parts, body))
        };

        match result {
            Ok(response) => {
                tracing::debug!(%method, %uri, status = response.status().as_u16(), "response received");
                Ok(response)
            }
            Err(err) => {
                tracing::debug!(%method, %uri, error = %err, "request failed");
                Err(RestClientError::Transport(err))
            }
        }
    }

    /// Build, send, and normalize `request`, stopping at the first failure.
    pub fn api(&self, request: Request) -> Result<Response, RestClientError> {
        let request = build_request_object(request)?;
        let raw = self.make_request(request)?;
        let (parts, body) = raw.into_parts();
        build_response(http::Response::from_parts(parts, body.into_reader()))
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// The shared client used by [`api`] and [`make_request`].
pub fn default_client() -> &'static Client {
    DEFAULT_CLIENT.get_or_init(Client::new)
}

/// [`Client::make_request`] on the default client.
pub fn make_request(
    request: http::Request<Vec<u8>>,
) -> Result<http::Response<ureq::Body>, RestClientError> {
    default_client().make_request(request)
}

/// [`Client::api`] on the default client.
pub fn api(request: Request) -> Result<Response, RestClientError> {
    default_client().api(request)
}
