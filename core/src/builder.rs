//! Request construction and response normalization.
//!
//! # Design
//! Both halves are free functions with no I/O of their own:
//! `build_request_object` turns a declarative `Request` into an
//! `http::Request`, and `build_response` turns any `http::Response` whose
//! body is a reader into a `Response`. Keeping the body generic over `Read`
//! lets tests feed in readers that fail or panic.

use std::any::Any;
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::panic::{self, AssertUnwindSafe};

use ureq::http;
use ureq::http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use crate::error::RestClientError;
use crate::http::{Request, Response, CONTENT_TYPE_JSON};

/// Append `params` to `base_url` as `?k1=v1&k2=v2`, keys in sorted order.
///
/// Keys and values are inserted verbatim; callers must escape them first if
/// they contain reserved characters.
pub fn add_query_parameters(base_url: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return base_url.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base_url}?{query}")
}

/// Convert a declarative request into a transport-ready one.
pub fn build_request_object(request: Request) -> Result<http::Request<Vec<u8>>, RestClientError> {
    let method = http::Method::from_bytes(request.method.as_str().as_bytes()).map_err(|source| {
        RestClientError::InvalidMethod {
            method: request.method.to_string(),
            source,
        }
    })?;

    let url = add_query_parameters(&request.base_url, &request.query_params);
    let uri = match url.parse::<http::Uri>() {
        Ok(uri) => uri,
        Err(source) => return Err(RestClientError::InvalidUrl { url, source }),
    };

    let mut headers = HeaderMap::with_capacity(request.headers.len() + 1);
    for (name, value) in &request.headers {
        let invalid = || RestClientError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(header_name, header_value);
    }

    let body = request.body.unwrap_or_default();
    if !body.is_empty() && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    }

    let mut built = http::Request::new(body);
    *built.method_mut() = method;
    *built.uri_mut() = uri;
    *built.headers_mut() = headers;
    Ok(built)
}

/// Drain `raw` and normalize it into a `Response`.
///
/// The body reader is owned here and dropped before returning, whether the
/// read succeeds, fails, or panics. A panic inside the reader is caught and
/// reported as `BodyRead`.
pub fn build_response<B: Read>(raw: http::Response<B>) -> Result<Response, RestClientError> {
    let (parts, body) = raw.into_parts();
    let bytes = drain_body(body).inspect_err(|err| {
        tracing::warn!(status = parts.status.as_u16(), error = %err, "response body read failed");
    })?;

    Ok(Response {
        status_code: parts.status.as_u16(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
        headers: collect_headers(&parts.headers),
    })
}

fn drain_body<B: Read>(mut body: B) -> Result<Vec<u8>, RestClientError> {
    let mut buf = Vec::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body.read_to_end(&mut buf)));
    drop(body);

    match outcome {
        Ok(Ok(_)) => Ok(buf),
        Ok(Err(err)) => Err(RestClientError::BodyRead(err)),
        Err(payload) => Err(RestClientError::BodyRead(io::Error::other(format!(
            "panic while reading response body: {}",
            panic_message(payload.as_ref())
        )))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        collected
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}
