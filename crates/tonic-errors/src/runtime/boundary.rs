//! Server-side error boundary for individual handlers.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use tonic_errors_core::{AppError, BoxError, ErrorFactory};

use super::codec::Codec;
use super::http_error::HttpError;
use super::recovery::recover_panic;

/// Wraps handler futures so every failure leaves as a structured error.
///
/// - `Ok` results pass through unchanged.
/// - An [`AppError`] or [`HttpError`] failure is encoded as-is.
/// - Any other failure becomes the default error, with the failure's display
///   text as a detail and the failure itself as the cause.
/// - A panic raised while the handler runs is caught and converted the same
///   way (see [`RecoveryLayer`](crate::RecoveryLayer) for whole services).
///
/// # Examples
///
/// ```
/// use tonic_errors::{AppError, ErrorBoundary};
///
/// # async fn demo() -> Result<(), tonic::Status> {
/// let boundary = ErrorBoundary::new(|| AppError::new(500));
///
/// let reply: Result<u32, tonic::Status> = boundary
///     .grpc(async { Err::<u32, _>(AppError::new(404).with_detail("no such user")) })
///     .await;
/// assert_eq!(reply.unwrap_err().code(), tonic::Code::NotFound);
/// # Ok(())
/// # }
/// ```
pub struct ErrorBoundary<F> {
    codec: Codec,
    default_error: Arc<F>,
}

impl<F: ErrorFactory> ErrorBoundary<F> {
    /// Boundary using the standard mapping table.
    pub fn new(default_error: F) -> Self {
        Self::with_codec(default_error, Codec::default())
    }

    /// Boundary using a specific codec.
    pub fn with_codec(default_error: F, codec: Codec) -> Self {
        Self {
            codec,
            default_error: Arc::new(default_error),
        }
    }

    /// Turn any handler failure into an [`AppError`].
    ///
    /// [`AppError`] and [`HttpError`] are kept as they are; anything else is
    /// wrapped into the default error.
    pub fn classify(&self, err: BoxError) -> AppError {
        let err = match err.downcast::<AppError>() {
            Ok(err) => return *err,
            Err(other) => other,
        };
        match err.downcast::<HttpError>() {
            Ok(err) => (*err).into_inner(),
            Err(other) => self
                .default_error
                .make()
                .with_error_detail(other.as_ref())
                .with_cause(other),
        }
    }

    /// Run a handler, catching its failure and any panic.
    ///
    /// # Errors
    ///
    /// Returns the classified [`AppError`] when the handler fails or panics.
    pub async fn run<T, E, Fut>(&self, handler: Fut) -> Result<T, AppError>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        match AssertUnwindSafe(handler).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(self.classify(err.into())),
            Err(payload) => Err(recover_panic(payload, self.default_error.as_ref())),
        }
    }

    /// Run a gRPC handler and encode its failure as a [`tonic::Status`].
    ///
    /// # Errors
    ///
    /// Returns the encoded status when the handler fails or panics.
    pub async fn grpc<T, E, Fut>(&self, handler: Fut) -> Result<T, tonic::Status>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        self.run(handler)
            .await
            .map_err(|err| self.codec.encode_status(&err))
    }

    /// Run an HTTP handler and render its failure as a JSON response.
    pub async fn http<T, E, Fut>(&self, handler: Fut) -> Response
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
        T: IntoResponse,
    {
        match self.run(handler).await {
            Ok(value) => value.into_response(),
            Err(err) => HttpError::new(err).into_response(),
        }
    }
}

impl<F> Clone for ErrorBoundary<F> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            default_error: Arc::clone(&self.default_error),
        }
    }
}

impl<F> std::fmt::Debug for ErrorBoundary<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorBoundary")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
