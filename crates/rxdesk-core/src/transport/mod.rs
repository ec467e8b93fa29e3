//! HTTP transport seam between resource clients and the network.
//!
//! Resource clients build an [`HttpRequest`] and hand it to a [`Transport`].
//! The production transport is [`CurlTransport`] (libcurl, blocking); tests
//! substitute an in-memory transport.

mod easy;
mod headers;

pub use easy::{CurlOptions, CurlTransport};
pub use headers::{parse_header_lines, HeaderMap};

use anyhow::Context;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// HTTP verbs used by the back-office API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File(FilePart),
}

impl FormPart {
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } => name,
            FormPart::File(f) => &f.field,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// Upload progress callback; receives a percentage in 0..=100.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
    /// Response is a file, not JSON (sets `Accept: */*`).
    pub expect_binary: bool,
    pub upload_progress: Option<ProgressFn>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: RequestBody::Empty,
            expect_binary: false,
            upload_progress: None,
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn binary(mut self) -> Self {
        self.expect_binary = true;
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressFn>) -> Self {
        self.upload_progress = progress;
        self
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("body", &self.body)
            .field("expect_binary", &self.expect_binary)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u32,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Parses the body as JSON. An empty body is treated as `null`.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&self.body)
    }
}

/// Failure below HTTP: the request never produced a status line.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Sends one request and returns the raw response, whatever its status.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Runs a blocking client call (curl) on tokio's blocking pool.
pub async fn run_blocking<F, R>(f: F) -> anyhow::Result<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("blocking client task join")
}
