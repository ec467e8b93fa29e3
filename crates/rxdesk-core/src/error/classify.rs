//! Classify transport errors and pull display messages out of error bodies.

use super::TransportFailure;
use crate::transport::TransportError;

/// Classify a transport error for logging and display.
pub fn classify_transport_error(e: &TransportError) -> TransportFailure {
    match e {
        TransportError::Curl(ce) => {
            if ce.is_operation_timedout() {
                return TransportFailure::Timeout;
            }
            if ce.is_couldnt_connect()
                || ce.is_couldnt_resolve_host()
                || ce.is_couldnt_resolve_proxy()
                || ce.is_read_error()
                || ce.is_recv_error()
                || ce.is_send_error()
                || ce.is_got_nothing()
            {
                return TransportFailure::Connection;
            }
            TransportFailure::Other
        }
        TransportError::InvalidRequest(_) => TransportFailure::Other,
    }
}

/// Message keys in order of preference. Backends differ: most send
/// `message`, some framework defaults send `detail` or `error`.
const MESSAGE_KEYS: [&str; 3] = ["message", "detail", "error"];

/// Extracts a human-readable message from a JSON error body.
///
/// Returns None for non-JSON bodies, non-object bodies and blank messages.
pub fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let obj = value.as_object()?;
    MESSAGE_KEYS.iter().find_map(|key| {
        obj.get(*key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
