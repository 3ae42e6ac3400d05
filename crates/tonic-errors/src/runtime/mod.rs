//! Runtime types for serving and consuming structured errors.
//!
//! - [`StatusTable`] / [`Codec`] — status mapping and wire encoding
//! - [`HttpError`] — Axum JSON error response
//! - [`ErrorBoundary`] — per-handler failure and panic conversion (server)
//! - [`ClientErrors`] — failure decoding for outbound gRPC calls
//! - [`RecoveryLayer`] — tower layer recovering whole services from panics
//! - [`RequiredHeaders`] / [`RequestContext`] — inbound header plumbing

mod boundary;
mod client;
mod codec;
mod context;
mod headers;
mod http_error;
mod recovery;
mod status_map;

pub use boundary::ErrorBoundary;
pub use client::ClientErrors;
pub use codec::{decode_error, decode_status, Codec};
pub use context::{context_interceptor, prepare_context, ClientId, ProductId, RequestContext};
pub(crate) use headers::required_header_name;
pub use headers::{
    missing_headers, parse_accept_language, require_headers, RequiredHeaders,
    ACCEPT_LANGUAGE_HEADER, PRODUCT_ID_HEADER, REQUEST_ID_HEADER, USER_CLIENT_HEADER,
    USER_TOKEN_HEADER,
};
pub use http_error::{http_status, HttpError};
pub use recovery::{GrpcErrors, JsonErrors, Recovery, RecoveryLayer, RenderError};
pub use status_map::{grpc_code_name, StatusTable};
