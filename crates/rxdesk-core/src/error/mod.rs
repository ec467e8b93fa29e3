//! Normalized client error.
//!
//! Every resource call funnels its failures through [`RequestFailed`]: a
//! classification plus a display-ready message. Callers never see curl errors
//! or raw response bodies.

mod classify;

pub use classify::{classify_transport_error, extract_message};

use crate::transport::{HttpResponse, TransportError};
use std::fmt;

/// Why the network layer failed before any HTTP status was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// Connect or whole-request timeout.
    Timeout,
    /// DNS, refused connection, reset, empty reply.
    Connection,
    Other,
}

/// Classification carried by [`RequestFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network failure; message is the resource fallback.
    Transport(TransportFailure),
    /// Non-2xx response; message comes from the body when it has one.
    Backend { status: u32 },
    /// 2xx response whose body did not have the expected shape.
    Decode,
    /// Downloaded bytes could not be written to the destination.
    Save,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport(TransportFailure::Timeout) => write!(f, "timeout"),
            FailureKind::Transport(TransportFailure::Connection) => write!(f, "connection"),
            FailureKind::Transport(TransportFailure::Other) => write!(f, "transport"),
            FailureKind::Backend { status } => write!(f, "HTTP {}", status),
            FailureKind::Decode => write!(f, "decode"),
            FailureKind::Save => write!(f, "save"),
        }
    }
}

/// The single error shape surfaced by resource clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RequestFailed {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestFailed {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Network failure: the user sees the fallback, the log gets the cause.
    pub fn transport(err: &TransportError, fallback: &str) -> Self {
        let kind = classify_transport_error(err);
        tracing::warn!("{} ({}): {}", fallback, FailureKind::Transport(kind), err);
        Self::new(FailureKind::Transport(kind), fallback)
    }

    /// Non-2xx response. Uses the body's message when present.
    pub fn rejected(response: &HttpResponse, fallback: &str) -> Self {
        let message = extract_message(&response.body).unwrap_or_else(|| fallback.to_string());
        tracing::warn!("{} (HTTP {}): {}", fallback, response.status, message);
        Self::new(
            FailureKind::Backend {
                status: response.status,
            },
            message,
        )
    }

    pub fn decode(fallback: &str, detail: impl fmt::Display) -> Self {
        tracing::warn!("{} (decode): {}", fallback, detail);
        Self::new(FailureKind::Decode, fallback)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Transport(_))
    }

    /// HTTP status for backend rejections.
    pub fn status(&self) -> Option<u32> {
        match self.kind {
            FailureKind::Backend { status } => Some(status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HeaderMap;

    fn response(status: u32, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HeaderMap::default(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn rejection_surfaces_backend_message_verbatim() {
        let err = RequestFailed::rejected(
            &response(400, r#"{"message":"GST number already registered"}"#),
            "Failed to create supplier",
        );
        assert_eq!(err.to_string(), "GST number already registered");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_transport());
    }

    #[test]
    fn rejection_without_message_uses_fallback() {
        let err = RequestFailed::rejected(&response(500, "<html>oops</html>"), "Failed to fetch drugs");
        assert_eq!(err.message, "Failed to fetch drugs");
        assert_eq!(err.kind, FailureKind::Backend { status: 500 });
    }

    #[test]
    fn transport_failure_uses_fallback() {
        let err = RequestFailed::transport(
            &TransportError::InvalidRequest("bad".to_string()),
            "Failed to fetch suppliers",
        );
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Failed to fetch suppliers");
        assert_eq!(err.status(), None);
    }
}
