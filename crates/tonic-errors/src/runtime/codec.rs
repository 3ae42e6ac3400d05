//! [`AppError`] ↔ [`tonic::Status`] / HTTP codec.

use std::sync::Arc;

use axum::http::StatusCode;
use tonic::Status;
use tonic_errors_core::{decode_body, encode_body, AppError};

use super::http_error::http_status;
use super::status_map::StatusTable;

/// Converts [`AppError`] values to and from transport representations.
///
/// - gRPC: the code comes from the shared [`StatusTable`], the message is the
///   canonical JSON body.
/// - HTTP: the status *is* the transport-neutral status, the body is the same
///   canonical JSON.
///
/// Decoding never reverse-maps a gRPC code: a failure carries a structured
/// error if and only if its message parses as a canonical body.
///
/// # Examples
///
/// ```
/// use tonic_errors::{AppError, Codec};
///
/// let codec = Codec::default();
/// let status = codec.encode_status(&AppError::new(404).with_detail("gone"));
/// assert_eq!(status.code(), tonic::Code::NotFound);
///
/// let decoded = tonic_errors::decode_status(&status).unwrap();
/// assert_eq!(decoded.details(), ["gone"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Codec {
    table: Arc<StatusTable>,
}

impl Codec {
    /// Create a codec over a shared mapping table.
    #[must_use]
    pub const fn new(table: Arc<StatusTable>) -> Self {
        Self { table }
    }

    /// The mapping table in use.
    #[must_use]
    pub fn table(&self) -> &StatusTable {
        &self.table
    }

    /// Encode `err` as a gRPC status. Never fails.
    #[must_use]
    pub fn encode_status(&self, err: &AppError) -> Status {
        Status::new(self.table.lookup(err.status()), encode_body(err))
    }

    /// Encode `err` as an HTTP status and JSON body. Never fails.
    #[must_use]
    pub fn encode_http(&self, err: &AppError) -> (StatusCode, String) {
        (http_status(err.status()), encode_body(err))
    }
}

/// Decode the structured error carried by a gRPC status, if any.
///
/// Returns `None` when the message is not a canonical error body; the gRPC
/// code is not consulted.
#[must_use]
pub fn decode_status(status: &Status) -> Option<AppError> {
    match decode_body(status.message()) {
        Ok(err) => Some(err),
        Err(parse) => {
            tracing::debug!(
                code = ?status.code(),
                error = %parse,
                "gRPC status does not carry a structured error",
            );
            None
        }
    }
}

/// Decode the structured error carried by an arbitrary failure.
///
/// Returns `None` when `err` is not a [`tonic::Status`] or does not carry a
/// canonical body.
#[must_use]
pub fn decode_error(err: &(dyn std::error::Error + 'static)) -> Option<AppError> {
    err.downcast_ref::<Status>().and_then(decode_status)
}
