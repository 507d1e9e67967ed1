//! Custom error types for parsing, translation and rendering

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status
        status: u16,
        /// Provider or parser message
        message: String,
    },

    /// Provider rejected the credentials or signature
    #[error("Authentication failed: {message}")]
    AuthError {
        /// Provider or parser message
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    RateLimitError {
        /// Provider or parser message
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Provider or parser message
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// Provider or parser message
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// Backend constructed without a required secret
    #[error("Missing credentials for {provider}: {field} is required")]
    MissingCredentials {
        /// Provider name
        provider: String,
        /// Missing field
        field: String,
    },

    /// Unknown provider name in configuration
    #[error("Unknown translation provider: {name}")]
    UnknownProvider {
        /// Name as configured
        name: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslationError::TimeoutError
        } else if let Some(status) = err.status() {
            TranslationError::ApiError {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            TranslationError::NetworkError {
                message: err.to_string(),
            }
        }
    }
}

/// Errors raised by the conversion pipeline
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Malformed BibTeX input
    #[error("BibTeX parse error: {message}")]
    ParseError {
        /// Provider or parser message
        message: String,
    },

    /// Entry cannot be rendered
    #[error("Cannot render entry {entry}: missing required field {field}")]
    RenderError {
        /// Entry ID
        entry: String,
        /// Missing field
        field: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Provider or parser message
        message: String,
    },

    /// Translation failure surfaced to the caller
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<config::ConfigError> for MetadataError {
    fn from(err: config::ConfigError) -> Self {
        MetadataError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type TranslationResult<T> = std::result::Result<T, TranslationError>;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_message() {
        let err = TranslationError::MissingCredentials {
            provider: "baidu".to_string(),
            field: "appkey".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing credentials for baidu: appkey is required"
        );
    }

    #[test]
    fn test_translation_error_is_transparent() {
        let err: MetadataError = TranslationError::TimeoutError.into();
        assert_eq!(err.to_string(), "Request timeout");
    }
}
