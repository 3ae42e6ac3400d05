//! Transport-neutral structured application error.
//!
//! This crate provides [`AppError`], the single error value that business
//! logic returns, together with its canonical JSON body and the
//! [`ErrorFactory`] contract used by transport boundaries to build a default
//! error when a failure is not already structured.
//!
//! It has no transport dependency. The `tonic-errors` crate maps [`AppError`]
//! onto HTTP responses and gRPC statuses. You should not need to depend on
//! this crate directly unless you only produce errors and never serve them.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod body;
mod error;
mod factory;
pub mod status;

pub use body::{decode_body, encode_body};
pub use error::{AppError, BoxError};
pub use factory::{DefaultError, ErrorFactory};
