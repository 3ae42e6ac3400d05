//! Typed error enum for the `tonic-errors` library API.
//!
//! Library consumers can match on specific variants. The CLI converts these
//! to `anyhow::Error` at the binary boundary for richer context messages.

/// Errors produced by `tonic-errors` setup operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading a config file).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A configured status is not a valid HTTP status.
    #[error("status {status} is not a valid HTTP status; expected 100..=999")]
    InvalidStatus {
        /// The rejected status.
        status: u16,
    },

    /// A configured header name is not a valid HTTP header name.
    #[error("'{name}' is not a valid HTTP header name")]
    InvalidHeader {
        /// The rejected name.
        name: String,
    },

    /// A required header name is a binary (`-bin`) gRPC metadata key.
    #[error("'{name}' is a binary metadata key and cannot be required")]
    BinaryHeader {
        /// The rejected name.
        name: String,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
