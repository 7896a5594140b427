//! Error types for the REST client pipeline.
//!
//! # Design
//! `RestClientError` covers everything the pipeline itself can fail with.
//! Transport failures keep ureq's own message so callers can match on it
//! (for example, timeouts). `RestError` is separate: the pipeline never
//! produces it, callers build it from a `Response` they consider a failure.

use std::io;

use ureq::http::method::InvalidMethod;
use ureq::http::uri::InvalidUri;

use crate::http::Response;

/// Errors returned by the request builder, the transport, and the response
/// builder.
#[derive(Debug, thiserror::Error)]
pub enum RestClientError {
    /// The method is not a valid HTTP token.
    #[error("invalid HTTP method {method:?}")]
    InvalidMethod {
        method: String,
        #[source]
        source: InvalidMethod,
    },

    /// The base URL plus query string does not parse as a URI.
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: InvalidUri,
    },

    /// A header name or value contains characters HTTP does not allow.
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },

    #[error(transparent)]
    Transport(#[from] ureq::Error),

    /// Draining the response body failed or panicked.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] io::Error),

    /// An application-level failure raised by the caller.
    #[error(transparent)]
    Status(#[from] RestError),
}

impl RestClientError {
    pub fn is_timeout(&self) -> bool {
        match self {
            RestClientError::Transport(ureq::Error::Timeout(_)) => true,
            RestClientError::Transport(ureq::Error::Io(err)) => {
                err.kind() == io::ErrorKind::TimedOut
            }
            RestClientError::BodyRead(err) => err.kind() == io::ErrorKind::TimedOut,
            _ => false,
        }
    }
}

/// A response that completed at the transport level but that the caller
/// treats as failed. Its message is exactly the response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .response.body)]
pub struct RestError {
    pub response: Response,
}

impl RestError {
    pub fn new(response: Response) -> Self {
        Self { response }
    }

    pub fn status_code(&self) -> u16 {
        self.response.status_code
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

impl From<Response> for RestError {
    fn from(response: Response) -> Self {
        RestError::new(response)
    }
}
