//! Error-handling configuration loaded from YAML.
//!
//! Externalizes the default error and the required header list so they live
//! next to the service's other deployment files.
//!
//! # File format
//!
//! ```yaml
//! # config/errors.yaml
//!
//! # Error returned when a failure is not already structured
//! # (plain errors, panics, opaque upstream failures).
//! default_error:
//!   status: 500
//!   details:
//!     - internal server error
//!
//! # Headers every request must carry.
//! required_headers:
//!   - User-Client
//!   - User-Token
//! ```

use std::path::Path;

use serde::Deserialize;
use tonic_errors_core::DefaultError;

use crate::error::{Error, Result};
use crate::runtime::{required_header_name, RequiredHeaders};

/// Error-handling configuration.
///
/// Loaded from a YAML file via [`ErrorsConfig::load`]; every field has a
/// default, so an empty document is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorsConfig {
    /// Default error for unstructured failures.
    pub default_error: DefaultError,

    /// Header names every request must carry.
    pub required_headers: Vec<String>,
}

impl ErrorsConfig {
    /// Load and validate config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate config from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or validated.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the default status is a valid HTTP status and that every
    /// required header is a valid, non-binary header name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`], [`Error::InvalidHeader`] or
    /// [`Error::BinaryHeader`].
    pub fn validate(&self) -> Result<()> {
        let status = self.default_error.status;
        if !(100..=999).contains(&status) {
            return Err(Error::InvalidStatus { status });
        }
        for name in &self.required_headers {
            required_header_name(name)?;
        }
        Ok(())
    }

    /// Factory for the configured default error.
    #[must_use]
    pub fn default_error(&self) -> DefaultError {
        self.default_error.clone()
    }

    /// Required-header check reporting misses through the default error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] or [`Error::BinaryHeader`] for a name
    /// that cannot be required.
    pub fn required_headers(&self) -> Result<RequiredHeaders> {
        RequiredHeaders::new(&self.required_headers, self.default_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use indoc::indoc;

    #[test]
    fn deserialize_defaults() {
        let config = ErrorsConfig::from_yaml("{}").unwrap();
        assert_eq!(config.default_error.status, 500);
        assert!(config.default_error.details.is_empty());
        assert!(config.required_headers.is_empty());
    }

    #[test]
    fn deserialize_full() {
        let config = ErrorsConfig::from_yaml(indoc! {"
            default_error:
              status: 503
              details:
                - service unavailable
            required_headers:
              - User-Client
              - User-Token
        "})
        .unwrap();
        assert_eq!(config.default_error.status, 503);
        assert_eq!(config.default_error.details, vec!["service unavailable"]);
        assert_eq!(config.required_headers, vec!["User-Client", "User-Token"]);
    }

    #[test]
    fn partial_default_error_keeps_status_default() {
        let config = ErrorsConfig::from_yaml(indoc! {"
            default_error:
              details: [oops]
        "})
        .unwrap();
        assert_eq!(config.default_error.status, 500);
    }

    #[test]
    fn invalid_status_is_rejected() {
        let err = ErrorsConfig::from_yaml("default_error: { status: 42 }").unwrap_err();
        assert!(matches!(err, Error::InvalidStatus { status: 42 }));
    }

    #[test]
    fn invalid_header_is_rejected() {
        let err = ErrorsConfig::from_yaml("required_headers: ['User Token']").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { ref name } if name == "User Token"));
    }

    #[test]
    fn binary_header_is_rejected() {
        let err = ErrorsConfig::from_yaml("required_headers: [User-Token, grpc-trace-bin]").unwrap_err();
        assert!(matches!(err, Error::BinaryHeader { ref name } if name == "grpc-trace-bin"));
    }

    #[test]
    fn built_checker_uses_configured_error() {
        let config = ErrorsConfig::from_yaml(indoc! {"
            default_error: { status: 400 }
            required_headers: [User-Token]
        "})
        .unwrap();
        let err = config
            .required_headers()
            .unwrap()
            .check(&HeaderMap::new())
            .unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.details(), ["required header User-Token was not provided"]);
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join("tonic-errors-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("errors.yaml");
        std::fs::write(&path, "required_headers:\n  - X-Request-ID\n").unwrap();

        let config = ErrorsConfig::load(&path).unwrap();
        assert_eq!(config.required_headers, vec!["X-Request-ID"]);
        assert_eq!(config.default_error.status, 500);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let result = ErrorsConfig::load(Path::new("/nonexistent/errors.yaml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn load_invalid_yaml_returns_error() {
        let result = ErrorsConfig::from_yaml("required_headers: [[[invalid");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }
}
