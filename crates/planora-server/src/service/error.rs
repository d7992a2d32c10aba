//! Service layer error types.

use thiserror::Error;

/// Result type for service construction and startup.
pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// Failures while building the application state from configuration.
///
/// These happen at startup only; request-time failures use the handler
/// error envelope instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration error (invalid config values, empty secrets, etc.).
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ServiceError {
    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
