//! Panic recovery for whole HTTP and gRPC services.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::response::IntoResponse;
use futures::future::{self, BoxFuture, FutureExt};
use tonic_errors_core::{AppError, ErrorFactory};
use tower::{Layer, Service};

use super::codec::Codec;
use super::http_error::HttpError;

/// Convert a panic payload into an [`AppError`].
///
/// A payload that already is an [`AppError`] (raised with
/// [`std::panic::panic_any`]) is returned unchanged. Otherwise the default
/// error gets the panic message as a detail and as its logged cause.
pub(crate) fn recover_panic<F>(payload: Box<dyn Any + Send>, default_error: &F) -> AppError
where
    F: ErrorFactory + ?Sized,
{
    let payload = match payload.downcast::<AppError>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };

    let description = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic with a non-string payload".to_string());

    default_error
        .make()
        .with_detail(description.clone())
        .log_cause(format!("handler panicked: {description}"))
}

/// Renders an [`AppError`] as a transport response.
pub trait RenderError<B>: Clone + Send + Sync + 'static {
    /// Build the response for `err`.
    fn render(&self, err: AppError) -> http::Response<B>;
}

/// Renders errors as HTTP JSON responses (see [`HttpError`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrors;

impl RenderError<axum::body::Body> for JsonErrors {
    fn render(&self, err: AppError) -> http::Response<axum::body::Body> {
        HttpError::new(err).into_response()
    }
}

/// Renders errors as trailers-only gRPC responses.
#[derive(Debug, Clone, Default)]
pub struct GrpcErrors {
    codec: Codec,
}

impl GrpcErrors {
    /// Render with a specific codec.
    #[must_use]
    pub const fn new(codec: Codec) -> Self {
        Self { codec }
    }
}

impl<B: Default> RenderError<B> for GrpcErrors {
    fn render(&self, err: AppError) -> http::Response<B> {
        self.codec.encode_status(&err).into_http()
    }
}

/// Tower layer that turns handler panics into error responses.
///
/// Wraps a service so that a panic raised while creating or polling its
/// response future is caught and answered with the default error rendered for
/// the transport. The worker keeps running and the request still gets exactly
/// one response.
///
/// # Examples
///
/// ```
/// use axum::{routing::get, Router};
/// use tonic_errors::{DefaultError, RecoveryLayer};
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(RecoveryLayer::http(DefaultError::new(500)));
/// ```
pub struct RecoveryLayer<F, R> {
    default_error: Arc<F>,
    renderer: R,
}

impl<F: ErrorFactory> RecoveryLayer<F, JsonErrors> {
    /// Recover HTTP services, answering with a JSON error body.
    pub fn http(default_error: F) -> Self {
        Self {
            default_error: Arc::new(default_error),
            renderer: JsonErrors,
        }
    }
}

impl<F: ErrorFactory> RecoveryLayer<F, GrpcErrors> {
    /// Recover gRPC services with the standard mapping table.
    pub fn grpc(default_error: F) -> Self {
        Self::grpc_with_codec(default_error, Codec::default())
    }

    /// Recover gRPC services with a specific codec.
    pub fn grpc_with_codec(default_error: F, codec: Codec) -> Self {
        Self {
            default_error: Arc::new(default_error),
            renderer: GrpcErrors::new(codec),
        }
    }
}

impl<F, R: Clone> Clone for RecoveryLayer<F, R> {
    fn clone(&self) -> Self {
        Self {
            default_error: Arc::clone(&self.default_error),
            renderer: self.renderer.clone(),
        }
    }
}

impl<F, R: std::fmt::Debug> std::fmt::Debug for RecoveryLayer<F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryLayer")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl<S, F, R: Clone> Layer<S> for RecoveryLayer<F, R> {
    type Service = Recovery<S, F, R>;

    fn layer(&self, inner: S) -> Self::Service {
        Recovery {
            inner,
            default_error: Arc::clone(&self.default_error),
            renderer: self.renderer.clone(),
        }
    }
}

/// Service produced by [`RecoveryLayer`].
pub struct Recovery<S, F, R> {
    inner: S,
    default_error: Arc<F>,
    renderer: R,
}

impl<S: Clone, F, R: Clone> Clone for Recovery<S, F, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            default_error: Arc::clone(&self.default_error),
            renderer: self.renderer.clone(),
        }
    }
}

impl<S, F, R, ReqBody, ResBody> Service<http::Request<ReqBody>> for Recovery<S, F, R>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    F: ErrorFactory,
    R: RenderError<ResBody>,
    ResBody: Send + 'static,
{
    type Response = http::Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: http::Request<ReqBody>) -> Self::Future {
        let default_error = Arc::clone(&self.default_error);
        let renderer = self.renderer.clone();

        let response = match panic::catch_unwind(AssertUnwindSafe(|| self.inner.call(request))) {
            Ok(response) => response,
            Err(payload) => {
                let err = recover_panic(payload, default_error.as_ref());
                return future::ready(Ok(renderer.render(err))).boxed();
            }
        };

        async move {
            match AssertUnwindSafe(response).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Ok(renderer.render(recover_panic(payload, default_error.as_ref()))),
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use http_body_util::BodyExt;
    use tonic_errors_core::DefaultError;
    use tower::ServiceExt;

    type Body = axum::body::Body;

    fn internal() -> DefaultError {
        DefaultError::new(500)
    }

    async fn json_body(response: http::Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn string_payloads_become_details() {
        let err = recover_panic(Box::new("index out of bounds"), &internal());
        assert_eq!(err.status(), 500);
        assert_eq!(err.details(), ["index out of bounds"]);
        assert!(err.cause().unwrap().to_string().contains("index out of bounds"));

        let err = recover_panic(Box::new(String::from("owned message")), &internal());
        assert_eq!(err.details(), ["owned message"]);
    }

    #[test]
    fn app_error_payload_is_used_directly() {
        let raised = AppError::new(409).with_detail("conflict");
        let err = recover_panic(Box::new(raised.clone()), &internal());
        assert_eq!(err, raised);
    }

    #[test]
    fn opaque_payload_still_produces_default_error() {
        let err = recover_panic(Box::new(42_u32), &internal());
        assert_eq!(err.status(), 500);
        assert_eq!(err.details().len(), 1);
    }

    #[tokio::test]
    async fn passes_successful_responses_through() {
        let inner = tower::service_fn(|_req: http::Request<Body>| async {
            Ok::<_, Infallible>(http::Response::new(Body::from("fine")))
        });
        let svc = RecoveryLayer::http(internal()).layer(inner);
        let response = svc.oneshot(http::Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn panic_while_polling_becomes_json_error() {
        let inner = tower::service_fn(|_req: http::Request<Body>| async {
            if true {
                panic!("handler exploded");
            }
            Ok::<_, Infallible>(http::Response::new(Body::empty()))
        });
        let svc = RecoveryLayer::http(internal()).layer(inner);
        let response = svc.oneshot(http::Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["statusHTTP"], 500);
        assert_eq!(json["details"][0], "handler exploded");
    }

    #[tokio::test]
    async fn panic_in_call_becomes_json_error() {
        let inner = tower::service_fn(|_req: http::Request<Body>| {
            if true {
                panic!("refused synchronously");
            }
            future::ready(Ok::<_, Infallible>(http::Response::new(Body::empty())))
        });
        let svc = RecoveryLayer::http(internal()).layer(inner);
        let response = svc.oneshot(http::Request::new(Body::empty())).await.unwrap();
        let json = json_body(response).await;
        assert_eq!(json["details"][0], "refused synchronously");
    }

    #[tokio::test]
    async fn panic_becomes_grpc_status() {
        let inner = tower::service_fn(|_req: http::Request<Body>| async {
            if true {
                std::panic::panic_any(AppError::new(503).with_detail("draining"));
            }
            Ok::<_, Infallible>(http::Response::new(Body::empty()))
        });
        let svc = RecoveryLayer::grpc(internal()).layer(inner);
        let response = svc.oneshot(http::Request::new(Body::empty())).await.unwrap();

        let status = tonic::Status::from_header_map(response.headers()).expect("grpc-status header");
        assert_eq!(status.code(), tonic::Code::Unavailable);
        let err = crate::decode_status(&status).unwrap();
        assert_eq!(err, AppError::new(503).with_detail("draining"));
    }
}
