//! Inbound header contract — required headers and `Accept-Language` parsing.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tonic::metadata::MetadataMap;
use tonic_errors_core::{AppError, ErrorFactory};

use super::codec::Codec;
use super::http_error::HttpError;

/// Client identifier header.
pub const USER_CLIENT_HEADER: &str = "User-Client";

/// Caller credential header.
pub const USER_TOKEN_HEADER: &str = "User-Token";

/// Internal request identifier header.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Product identifier header.
pub const PRODUCT_ID_HEADER: &str = "X-Product-ID";

/// Standard language negotiation header.
pub const ACCEPT_LANGUAGE_HEADER: &str = "Accept-Language";

/// Split an `Accept-Language` value into language tags, keeping order.
///
/// Quality values (`;q=0.8`) are dropped, entries are trimmed, and empty
/// entries are skipped.
///
/// # Examples
///
/// ```
/// use tonic_errors::parse_accept_language;
///
/// assert_eq!(parse_accept_language("en-US;q=0.9, fr;q=0.8"), ["en-US", "fr"]);
/// assert!(parse_accept_language("").is_empty());
/// ```
#[must_use]
pub fn parse_accept_language(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(|entry| {
            let tag = entry.split(';').next().unwrap_or_default().trim();
            (!tag.is_empty()).then(|| tag.to_string())
        })
        .collect()
}

/// Names from `names` that are absent or empty in `headers`.
///
/// Lookup is case-insensitive; the returned names are spelled as given.
/// Names that are not valid header names count as missing.
#[must_use]
pub fn missing_headers(headers: &HeaderMap, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .filter(|name| {
            !HeaderName::from_bytes(name.as_bytes())
                .is_ok_and(|key| headers.get(&key).is_some_and(|v| !v.is_empty()))
        })
        .map(|name| (*name).to_string())
        .collect()
}

/// Parse a name for the required-header list.
///
/// Binary metadata keys (`-bin` suffix) are rejected: gRPC metadata stores
/// them apart from ASCII values, so a check over both transports could never
/// see them.
pub(crate) fn required_header_name(name: &str) -> crate::Result<HeaderName> {
    let key = HeaderName::from_bytes(name.as_bytes()).map_err(|_| crate::Error::InvalidHeader {
        name: name.to_string(),
    })?;
    if key.as_str().ends_with("-bin") {
        return Err(crate::Error::BinaryHeader {
            name: name.to_string(),
        });
    }
    Ok(key)
}

#[derive(Debug)]
struct RequiredHeader {
    display: String,
    key: HeaderName,
}

/// A list of headers every request must carry.
///
/// Missing headers are reported through the default error, with one detail
/// per header: `required header <name> was not provided`.
///
/// Works as Axum middleware ([`require_headers`]) and as a tonic
/// [`Interceptor`](tonic::service::Interceptor) over request metadata.
///
/// # Examples
///
/// ```
/// use axum::http::HeaderMap;
/// use tonic_errors::{DefaultError, RequiredHeaders};
///
/// let required = RequiredHeaders::new(["User-Token"], DefaultError::new(400)).unwrap();
/// let err = required.check(&HeaderMap::new()).unwrap_err();
/// assert_eq!(err.details(), ["required header User-Token was not provided"]);
/// ```
#[derive(Clone)]
pub struct RequiredHeaders {
    headers: Arc<[RequiredHeader]>,
    default_error: Arc<dyn ErrorFactory>,
    codec: Codec,
}

impl RequiredHeaders {
    /// Require `names`, reporting misses with `default_error`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`](crate::Error::InvalidHeader) if a name
    /// is not a valid HTTP header name, or
    /// [`Error::BinaryHeader`](crate::Error::BinaryHeader) for a `-bin` key.
    pub fn new<I, S>(names: I, default_error: impl ErrorFactory) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers = names
            .into_iter()
            .map(|name| {
                let display = name.as_ref();
                required_header_name(display).map(|key| RequiredHeader {
                    display: display.to_string(),
                    key,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(Self {
            headers: headers.into(),
            default_error: Arc::new(default_error),
            codec: Codec::default(),
        })
    }

    /// Use a specific codec when rejecting gRPC requests.
    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Check HTTP headers.
    ///
    /// # Errors
    ///
    /// Returns the default error with one detail per missing header.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), AppError> {
        self.report(|key| headers.get(key).is_some_and(|v| !v.is_empty()))
    }

    /// Check gRPC request metadata.
    ///
    /// # Errors
    ///
    /// Returns the default error with one detail per missing header.
    pub fn check_metadata(&self, metadata: &MetadataMap) -> Result<(), AppError> {
        self.report(|key| metadata.get(key.as_str()).is_some_and(|v| !v.is_empty()))
    }

    fn report(&self, is_present: impl Fn(&HeaderName) -> bool) -> Result<(), AppError> {
        let mut missing = self
            .headers
            .iter()
            .filter(|header| !is_present(&header.key))
            .peekable();

        if missing.peek().is_none() {
            return Ok(());
        }

        let mut err = self.default_error.make();
        for header in missing {
            tracing::debug!(header = %header.display, "required header missing");
            err.add_detail(format!(
                "required header {} was not provided",
                header.display
            ));
        }
        Err(err)
    }
}

impl std::fmt::Debug for RequiredHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequiredHeaders")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl tonic::service::Interceptor for RequiredHeaders {
    fn call(&mut self, request: tonic::Request<()>) -> Result<tonic::Request<()>, tonic::Status> {
        self.check_metadata(request.metadata())
            .map_err(|err| self.codec.encode_status(&err))?;
        Ok(request)
    }
}

/// Axum middleware rejecting requests that miss a required header.
///
/// ```ignore
/// let required = RequiredHeaders::new([USER_CLIENT_HEADER, USER_TOKEN_HEADER], DefaultError::new(400))?;
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn(move |req, next| {
///         tonic_errors::require_headers(required.clone(), req, next)
///     }));
/// ```
pub async fn require_headers(required: RequiredHeaders, request: Request, next: Next) -> Response {
    match required.check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(err) => HttpError::new(err).into_response(),
    }
}
