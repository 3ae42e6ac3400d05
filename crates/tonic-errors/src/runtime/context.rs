//! Typed request-scoped context populated from inbound headers.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tonic::metadata::MetadataMap;
use tonic_errors_core::status::BAD_REQUEST;
use tonic_errors_core::AppError;

use super::headers::{
    parse_accept_language, ACCEPT_LANGUAGE_HEADER, PRODUCT_ID_HEADER, REQUEST_ID_HEADER,
    USER_CLIENT_HEADER,
};
use super::http_error::HttpError;

/// Request metadata extracted once at ingress.
///
/// Built by [`prepare_context`] (Axum) or [`context_interceptor`] (tonic) and
/// stored in the request extensions. Header values that are absent, empty, or
/// not visible ASCII are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// `User-Client` header.
    pub client_id: Option<String>,
    /// `X-Product-ID` header.
    pub product_id: Option<String>,
    /// `X-Request-ID` header.
    pub request_id: Option<String>,
    /// `Accept-Language` tags in preference order, without quality values.
    pub accepted_languages: Vec<String>,
}

impl RequestContext {
    /// Build from HTTP headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_lookup(|name| headers.get(name).and_then(|v| v.to_str().ok()))
    }

    /// Build from gRPC request metadata.
    #[must_use]
    pub fn from_metadata(metadata: &MetadataMap) -> Self {
        Self::from_lookup(|name| metadata.get(name).and_then(|v| v.to_str().ok()))
    }

    /// Context stored by [`context_interceptor`], or one built from the
    /// request metadata when the interceptor did not run.
    #[must_use]
    pub fn from_request<T>(request: &tonic::Request<T>) -> Self {
        request
            .extensions()
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self::from_metadata(request.metadata()))
    }

    fn from_parts(parts: &Parts) -> Self {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self::from_headers(&parts.headers))
    }

    fn from_lookup<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Self {
        let value = |header: &str| {
            get(&header.to_ascii_lowercase())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };

        Self {
            client_id: value(USER_CLIENT_HEADER),
            product_id: value(PRODUCT_ID_HEADER),
            request_id: value(REQUEST_ID_HEADER),
            accepted_languages: value(ACCEPT_LANGUAGE_HEADER)
                .map(|v| parse_accept_language(&v))
                .unwrap_or_default(),
        }
    }

    /// The client id, or a `400` error naming the missing header.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] when no client id was sent.
    pub fn require_client_id(&self) -> Result<&str, AppError> {
        required(self.client_id.as_deref(), USER_CLIENT_HEADER)
    }

    /// The product id, or a `400` error naming the missing header.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] when no product id was sent.
    pub fn require_product_id(&self) -> Result<&str, AppError> {
        required(self.product_id.as_deref(), PRODUCT_ID_HEADER)
    }
}

fn required<'a>(value: Option<&'a str>, header: &str) -> Result<&'a str, AppError> {
    value.ok_or_else(|| {
        AppError::new(BAD_REQUEST).with_detail(format!("required header {header} was not provided"))
    })
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// Mandatory client id. Rejects the request with `400` when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientId {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = RequestContext::from_parts(parts);
        Ok(Self(context.require_client_id()?.to_string()))
    }
}

/// Mandatory product id. Rejects the request with `400` when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ProductId {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = RequestContext::from_parts(parts);
        Ok(Self(context.require_product_id()?.to_string()))
    }
}

/// Axum middleware storing a [`RequestContext`] in the request extensions.
pub async fn prepare_context(mut request: Request, next: Next) -> Response {
    let context = RequestContext::from_headers(request.headers());
    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Tonic interceptor storing a [`RequestContext`] in the request extensions.
///
/// # Errors
///
/// Never fails; the signature matches [`tonic::service::Interceptor`].
#[allow(clippy::result_large_err, clippy::unnecessary_wraps)]
pub fn context_interceptor(
    mut request: tonic::Request<()>,
) -> Result<tonic::Request<()>, tonic::Status> {
    let context = RequestContext::from_metadata(request.metadata());
    request.extensions_mut().insert(context);
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }

    #[test]
    fn from_headers_reads_every_field() {
        let ctx = RequestContext::from_headers(&headers(&[
            ("user-client", "android"),
            ("x-product-id", "wallet"),
            ("x-request-id", "req-1"),
            ("accept-language", "en-US;q=0.9, fr;q=0.8"),
        ]));
        assert_eq!(ctx.client_id.as_deref(), Some("android"));
        assert_eq!(ctx.product_id.as_deref(), Some("wallet"));
        assert_eq!(ctx.request_id.as_deref(), Some("req-1"));
        assert_eq!(ctx.accepted_languages, vec!["en-US", "fr"]);
    }

    #[test]
    fn product_id_is_not_client_id() {
        let ctx = RequestContext::from_headers(&headers(&[("user-client", "android")]));
        assert_eq!(ctx.require_client_id().unwrap(), "android");
        let err = ctx.require_product_id().unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.details(), ["required header X-Product-ID was not provided"]);
    }

    #[test]
    fn absent_and_empty_headers_are_none() {
        let ctx = RequestContext::from_headers(&headers(&[("user-client", "")]));
        assert_eq!(ctx, RequestContext::default());
    }

    #[test]
    fn from_metadata_matches_headers() {
        let mut request = tonic::Request::new(());
        let metadata = request.metadata_mut();
        metadata.insert("user-client", "cli".parse().unwrap());
        metadata.insert("accept-language", "pt".parse().unwrap());

        let ctx = RequestContext::from_metadata(request.metadata());
        assert_eq!(ctx.client_id.as_deref(), Some("cli"));
        assert_eq!(ctx.accepted_languages, vec!["pt"]);
    }

    #[test]
    fn interceptor_stores_context() {
        let mut request = tonic::Request::new(());
        request
            .metadata_mut()
            .insert("x-request-id", "abc-123".parse().unwrap());

        let request = context_interceptor(request).unwrap();
        let ctx = request.extensions().get::<RequestContext>().unwrap();
        assert_eq!(ctx.request_id.as_deref(), Some("abc-123"));
        assert_eq!(RequestContext::from_request(&request), *ctx);
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn middleware_context_reaches_handler() {
        let app = Router::new()
            .route(
                "/",
                get(|ctx: RequestContext| async move { ctx.accepted_languages.join("|") }),
            )
            .layer(axum::middleware::from_fn(prepare_context));

        let request = axum::http::Request::builder()
            .uri("/")
            .header("accept-language", "de-CH, de;q=0.9, *;q=0.5")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_text(response).await, "de-CH|de|*");
    }

    #[tokio::test]
    async fn client_id_extractor_rejects_with_400() {
        let app = Router::new().route("/", get(|ClientId(id): ClientId| async move { id }));

        let response = app
            .clone()
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["details"][0], "required header User-Client was not provided");

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header("user-client", "web")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "web");
    }

    #[tokio::test]
    async fn product_id_extractor_reads_its_own_header() {
        let app = Router::new().route("/", get(|ProductId(id): ProductId| async move { id }));
        let request = axum::http::Request::builder()
            .uri("/")
            .header("user-client", "web")
            .header("x-product-id", "loyalty")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_text(response).await, "loyalty");
    }
}
