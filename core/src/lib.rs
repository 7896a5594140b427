//! Minimal blocking REST client.
//!
//! # Overview
//! Turns a declarative `Request` into an HTTP call, executes it through a
//! configurable `Client`, and normalizes the result into a `Response`.
//!
//! # Design
//! - Three stages, each callable on its own: `build_request_object`,
//!   `make_request`, `build_response`. `api` runs them in order and stops at
//!   the first error.
//! - Status codes are never interpreted. Callers that want 4xx/5xx as errors
//!   wrap the response in `RestError` (or call `Response::error_for_status`).
//! - No retries, no streaming: every call drains the body before returning.

pub mod builder;
pub mod client;
pub mod error;
pub mod http;

pub use builder::{add_query_parameters, build_request_object, build_response};
pub use client::{api, default_client, make_request, Client, ClientConfig};
pub use error::{RestClientError, RestError};
pub use http::{Method, Request, Response, CONTENT_TYPE_JSON};
