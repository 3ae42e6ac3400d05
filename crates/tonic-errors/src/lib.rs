//! Structured application errors for Tonic gRPC and Axum HTTP services.
//!
//! Business logic returns [`AppError`] values carrying a transport-neutral
//! status (HTTP status semantics) and human-readable details. This crate maps
//! them onto the wire and back:
//!
//! | Transport | Status | Body |
//! |-----------|--------|------|
//! | HTTP | the error's status | `{"statusHTTP": 404, "details": [...]}` |
//! | gRPC | looked up in [`StatusTable`] | same JSON, as the status message |
//!
//! # Types
//!
//! - [`Codec`] — encodes [`AppError`] as [`tonic::Status`] or HTTP; [`decode_status`] reverses it
//! - [`ErrorBoundary`] — wraps handlers so every failure (and panic) leaves structured
//! - [`ClientErrors`] — decodes structured errors from failed outbound calls
//! - [`RecoveryLayer`] — tower layer turning panics into error responses
//! - [`RequiredHeaders`], [`RequestContext`] — inbound header checks and typed context
//! - [`ErrorsConfig`] — YAML configuration for the default error and required headers
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! tonic-errors = "0.1"
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod runtime;

pub use config::ErrorsConfig;
pub use error::{Error, Result};
pub use runtime::*;
pub use tonic_errors_core::{
    decode_body, encode_body, status, AppError, BoxError, DefaultError, ErrorFactory,
};
