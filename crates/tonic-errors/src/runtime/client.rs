//! Client-side decoding of structured errors from gRPC failures.

use std::future::Future;
use std::sync::Arc;

use tonic::Status;
use tonic_errors_core::{AppError, ErrorFactory};

use super::codec::decode_status;

/// Maps failed outbound gRPC calls back to [`AppError`].
///
/// A status whose message carries a canonical body yields that error. Any
/// other status (transport failure, a server without a boundary) becomes the
/// default error with the status text as a detail and the status as cause.
///
/// # Examples
///
/// ```
/// use tonic_errors::{AppError, ClientErrors};
///
/// let errors = ClientErrors::new(|| AppError::new(502));
/// let err = errors.map_status(tonic::Status::unavailable("connection refused"));
/// assert_eq!(err.status(), 502);
/// ```
pub struct ClientErrors<F> {
    default_error: Arc<F>,
}

impl<F: ErrorFactory> ClientErrors<F> {
    /// Create a mapper with the given default error.
    pub fn new(default_error: F) -> Self {
        Self {
            default_error: Arc::new(default_error),
        }
    }

    /// Convert a failed call's status into an [`AppError`].
    pub fn map_status(&self, status: Status) -> AppError {
        match decode_status(&status) {
            Some(err) => err,
            None => self
                .default_error
                .make()
                .with_error_detail(&status)
                .with_cause(status),
        }
    }

    /// Await an outbound call, mapping its failure.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`AppError`] when the call fails.
    pub async fn call<T, Fut>(&self, call: Fut) -> Result<T, AppError>
    where
        Fut: Future<Output = Result<T, Status>>,
    {
        call.await.map_err(|status| self.map_status(status))
    }
}

impl<F> Clone for ClientErrors<F> {
    fn clone(&self) -> Self {
        Self {
            default_error: Arc::clone(&self.default_error),
        }
    }
}

impl<F> std::fmt::Debug for ClientErrors<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientErrors").finish_non_exhaustive()
    }
}
