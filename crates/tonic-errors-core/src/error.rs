//! Structured application error.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::status::UNCLASSIFIED;

/// Boxed, thread-safe error used for causes and unstructured handler failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Structured application error carrying a transport-neutral status.
///
/// The status reuses HTTP status semantics (plus `444`, client closed
/// request). Transport boundaries derive the wire status from it: HTTP uses it
/// as-is, gRPC looks it up in a mapping table.
///
/// Serializes to the canonical body:
///
/// ```json
/// { "statusHTTP": 404, "details": ["user 42 not found"] }
/// ```
///
/// The optional cause is kept for logging and is never serialized.
///
/// # Examples
///
/// ```
/// use tonic_errors_core::AppError;
///
/// let err = AppError::new(404).with_detail("user 42 not found");
/// assert_eq!(err.status(), 404);
/// assert_eq!(err.to_string(), "status 404: user 42 not found");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppError {
    #[serde(rename = "statusHTTP", deserialize_with = "lenient_status")]
    status: u16,

    #[serde(default)]
    details: Vec<String>,

    #[serde(skip)]
    cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create an error with the given transport-neutral status and no details.
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self {
            status,
            details: Vec::new(),
            cause: None,
        }
    }

    /// Transport-neutral status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Diagnostic details, in insertion order.
    #[must_use]
    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Wrapped lower-level error, if one was attached.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Append a detail.
    pub fn add_detail(&mut self, detail: impl Into<String>) -> &mut Self {
        self.details.push(detail.into());
        self
    }

    /// Append a detail, builder style.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.add_detail(detail);
        self
    }

    /// Append the display text of `err` as a detail.
    #[must_use]
    pub fn with_error_detail(mut self, err: &(dyn std::error::Error + 'static)) -> Self {
        self.add_detail(err.to_string());
        self
    }

    /// Attach a cause.
    ///
    /// The cause is set at most once; later calls keep the first cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        let cause = cause.into();
        if self.cause.is_some() {
            tracing::debug!(
                status = self.status,
                ignored = %cause,
                "cause already set, keeping the first one",
            );
        } else {
            self.cause = Some(Arc::from(cause));
        }
        self
    }

    /// Attach a cause and emit an error event describing this error.
    #[must_use]
    pub fn log_cause(self, cause: impl Into<BoxError>) -> Self {
        let err = self.with_cause(cause);
        match err.cause() {
            Some(cause) => tracing::error!(
                status = err.status,
                details = ?err.details,
                cause = %cause,
                "application error",
            ),
            None => tracing::error!(
                status = err.status,
                details = ?err.details,
                "application error",
            ),
        }
        err
    }
}

impl PartialEq for AppError {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status && self.details == other.details
    }
}

impl Eq for AppError {}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.status)?;
        if !self.details.is_empty() {
            write!(f, ": {}", self.details.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Accept any JSON number as a status; values outside `u16` become
/// [`UNCLASSIFIED`].
fn lenient_status<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    Ok(number
        .as_u64()
        .and_then(|value| u16::try_from(value).ok())
        .unwrap_or(UNCLASSIFIED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn new_has_no_details_or_cause() {
        let err = AppError::new(500);
        assert_eq!(err.status(), 500);
        assert!(err.details().is_empty());
        assert!(err.cause().is_none());
    }

    #[test]
    fn details_keep_insertion_order() {
        let mut err = AppError::new(400);
        err.add_detail("first").add_detail("second");
        let err = err.with_detail("third");
        assert_eq!(err.details(), ["first", "second", "third"]);
    }

    #[test]
    fn error_detail_uses_display_text() {
        let io = std::io::Error::other("disk on fire");
        let err = AppError::new(500).with_error_detail(&io);
        assert_eq!(err.details(), ["disk on fire"]);
    }

    #[test]
    fn cause_is_set_at_most_once() {
        let err = AppError::new(500).with_cause("first").with_cause("second");
        assert_eq!(err.cause().unwrap().to_string(), "first");
    }

    #[test]
    fn log_cause_attaches_cause() {
        let err = AppError::new(500).log_cause("boom");
        assert_eq!(err.cause().unwrap().to_string(), "boom");
    }

    #[test]
    fn source_is_cause() {
        let err = AppError::new(500).with_cause("connection reset");
        assert_eq!(err.source().unwrap().to_string(), "connection reset");
        assert!(AppError::new(500).source().is_none());
    }

    #[test]
    fn display_without_details() {
        assert_eq!(AppError::new(503).to_string(), "status 503");
    }

    #[test]
    fn display_joins_details() {
        let err = AppError::new(400).with_detail("a").with_detail("b");
        assert_eq!(err.to_string(), "status 400: a; b");
    }

    #[test]
    fn equality_ignores_cause() {
        let a = AppError::new(404).with_detail("x").with_cause("one");
        let b = AppError::new(404).with_detail("x");
        assert_eq!(a, b);
        assert_ne!(a, AppError::new(404));
    }

    #[test]
    fn serializes_canonical_body() {
        let err = AppError::new(404).with_detail("gone").with_cause("secret");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "statusHTTP": 404, "details": ["gone"] })
        );
    }

    #[test]
    fn missing_details_default_to_empty() {
        let err: AppError = serde_json::from_str(r#"{"statusHTTP": 409}"#).unwrap();
        assert_eq!(err.status(), 409);
        assert!(err.details().is_empty());
    }

    #[test]
    fn out_of_range_status_is_unclassified() {
        for raw in ["-1", "70000", "404.5"] {
            let json = format!(r#"{{"statusHTTP": {raw}, "details": []}}"#);
            let err: AppError = serde_json::from_str(&json).unwrap();
            assert_eq!(err.status(), UNCLASSIFIED, "statusHTTP {raw}");
        }
    }

    #[test]
    fn missing_status_is_rejected() {
        assert!(serde_json::from_str::<AppError>(r#"{"details": []}"#).is_err());
    }

    /// Compile-time assertion that `AppError` can cross task boundaries.
    const _: () = {
        const fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<AppError>();
    };
}
