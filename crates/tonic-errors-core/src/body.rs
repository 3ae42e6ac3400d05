//! Canonical JSON body encoding.

use serde::de::Error as _;
use serde_json::Value;

use crate::AppError;

/// Serialize `err` to its canonical JSON body.
///
/// Never fails: if serialization fails the body degrades to a plain-text
/// description that still names the status and the serialization error.
///
/// # Examples
///
/// ```
/// use tonic_errors_core::{encode_body, AppError};
///
/// let body = encode_body(&AppError::new(404).with_detail("gone"));
/// assert_eq!(body, r#"{"statusHTTP":404,"details":["gone"]}"#);
/// ```
#[must_use]
pub fn encode_body(err: &AppError) -> String {
    or_fallback(serde_json::to_string(err), err.status())
}

/// Parse a canonical JSON body.
///
/// Only a JSON object is accepted; arrays such as `[404]` are rejected even
/// though they would fill the fields positionally.
///
/// # Errors
///
/// Returns the JSON error if `body` is not a canonical error document.
pub fn decode_body(body: &str) -> Result<AppError, serde_json::Error> {
    match serde_json::from_str::<Value>(body)? {
        document @ Value::Object(_) => serde_json::from_value(document),
        _ => Err(serde_json::Error::custom("error body is not a JSON object")),
    }
}

fn or_fallback(encoded: Result<String, serde_json::Error>, status: u16) -> String {
    encoded.unwrap_or_else(|err| {
        tracing::warn!(status, error = %err, "failed to encode error body");
        format!("statusHTTP {status}; with error {err}")
    })
}
