//! Declarative request and normalized response types.
//!
//! # Design
//! `Request` describes an HTTP call as plain data before any transport type
//! exists; `Response` is the fully-read result handed back to the caller.
//! Both use owned `String` / `Vec` / `BTreeMap` fields so values can be
//! cloned, compared, and serialized without lifetime concerns. `BTreeMap`
//! keeps iteration order deterministic, which the query encoder relies on.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RestError;

/// Default content type applied to requests that carry a body.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP verb of a declarative request.
///
/// An open tag rather than a closed enum: the common verbs are provided as
/// constants, and any other token is accepted here and validated against the
/// HTTP token grammar when the request is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Method(Cow<'static, str>);

impl Method {
    pub const GET: Method = Method(Cow::Borrowed("GET"));
    pub const POST: Method = Method(Cow::Borrowed("POST"));
    pub const PUT: Method = Method(Cow::Borrowed("PUT"));
    pub const PATCH: Method = Method(Cow::Borrowed("PATCH"));
    pub const DELETE: Method = Method(Cow::Borrowed("DELETE"));
    pub const HEAD: Method = Method(Cow::Borrowed("HEAD"));
    pub const OPTIONS: Method = Method(Cow::Borrowed("OPTIONS"));

    /// Wrap an arbitrary method token. Validity is checked at build time.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Cow::Owned(token.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::GET
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Method {
    fn from(token: &str) -> Self {
        Method::new(token)
    }
}

impl From<String> for Method {
    fn from(token: String) -> Self {
        Method::new(token)
    }
}

/// A declarative description of an HTTP call.
///
/// Consumed once by [`build_request_object`](crate::builder::build_request_object).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub method: Method,
    pub base_url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query_params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: impl Into<Method>, base_url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set a header, replacing any previous value under the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the request body. The content type is left to the
    /// builder's JSON default unless the caller set one.
    pub fn json_body<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.body(bytes))
    }

    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }
}

/// A fully-read HTTP response.
///
/// Header names are lower-case; every value of a repeated header is kept in
/// the order it was received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, Vec<String>>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// First value of the named header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Wrap a non-2xx response in a [`RestError`]. Nothing in the pipeline
    /// calls this; it is for callers that want status-based failures.
    pub fn error_for_status(self) -> Result<Response, RestError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(RestError::new(self))
        }
    }
}
