//! HTTP error wrapper — converts [`AppError`] to an Axum JSON response.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use tonic_errors_core::{encode_body, AppError};

/// HTTP status for a transport-neutral status.
///
/// The transport-neutral status is used as-is. Values that are not valid HTTP
/// statuses (for example the unclassified `0`) become `500`.
#[must_use]
pub fn http_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or_else(|_| {
        tracing::warn!(status, "not a valid HTTP status, responding with 500");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// HTTP error wrapper — converts an [`AppError`] to an HTTP error response.
///
/// The response status is the error's transport-neutral status and the body
/// is the canonical JSON document:
///
/// ```json
/// { "statusHTTP": 404, "details": ["user not found"] }
/// ```
///
/// Handlers return `Result<T, HttpError>` and use `?` on [`AppError`] values
/// thanks to the [`From<AppError>`] impl.
///
/// # Examples
///
/// ```
/// use tonic_errors::{AppError, HttpError};
/// use axum::response::IntoResponse;
///
/// let err = HttpError::new(AppError::new(404).with_detail("user not found"));
/// let response = err.into_response();
/// assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError(AppError);

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl HttpError {
    /// Wrap an [`AppError`].
    #[must_use]
    pub const fn new(err: AppError) -> Self {
        Self(err)
    }

    /// Returns a reference to the underlying [`AppError`].
    #[must_use]
    pub const fn error(&self) -> &AppError {
        &self.0
    }

    /// Consumes the `HttpError` and returns the underlying [`AppError`].
    #[must_use]
    pub fn into_inner(self) -> AppError {
        self.0
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        (
            http_status(self.0.status()),
            [(header::CONTENT_TYPE, "application/json")],
            encode_body(&self.0),
        )
            .into_response()
    }
}
