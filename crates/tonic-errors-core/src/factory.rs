//! Default error constructors.

use serde::{Deserialize, Serialize};

use crate::status::INTERNAL_SERVER_ERROR;
use crate::AppError;

/// Builds a fresh default [`AppError`].
///
/// Boundaries call this when a failure is not already an [`AppError`] (a
/// plain error, a panic, an opaque RPC failure) and then attach the original
/// failure to the result. Implemented for any `Fn() -> AppError` closure.
///
/// # Examples
///
/// ```
/// use tonic_errors_core::{AppError, ErrorFactory};
///
/// let internal = || AppError::new(500).with_detail("internal error");
/// assert_eq!(internal.make().status(), 500);
/// ```
pub trait ErrorFactory: Send + Sync + 'static {
    /// Build a new default error.
    fn make(&self) -> AppError;
}

impl<F> ErrorFactory for F
where
    F: Fn() -> AppError + Send + Sync + 'static,
{
    fn make(&self) -> AppError {
        self()
    }
}

/// Data-driven [`ErrorFactory`], usually loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultError {
    /// Transport-neutral status of every produced error.
    pub status: u16,
    /// Details every produced error starts with.
    pub details: Vec<String>,
}

impl DefaultError {
    /// Factory producing errors with `status` and no initial details.
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self {
            status,
            details: Vec::new(),
        }
    }

    /// Add an initial detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

impl Default for DefaultError {
    fn default() -> Self {
        Self::new(INTERNAL_SERVER_ERROR)
    }
}

impl ErrorFactory for DefaultError {
    fn make(&self) -> AppError {
        self.details
            .iter()
            .fold(AppError::new(self.status), |err, detail| {
                err.with_detail(detail.clone())
            })
    }
}
