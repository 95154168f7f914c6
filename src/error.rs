//! Error types for resource-dispatch
//!
//! This module defines the error hierarchy for the whole engine.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for resource-dispatch
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Caller Usage Errors
    // ============================================================================
    #[error("a context is required for API operations")]
    ContextRequired,

    #[error("operation was cancelled")]
    Cancelled,

    #[error("operation '{operation}' is not supported")]
    OperationNotSupported { operation: String },

    #[error("type '{type_name}' is not supported here")]
    TypeNotSupported { type_name: String },

    #[error("cannot list with both paged output and an object channel")]
    CannotListChannelAndPaged,

    #[error("option '{key}' is not set")]
    KeyNotSet { key: String },

    #[error("option '{key}' is already set")]
    KeyAlreadySet { key: String },

    #[error("option '{key}' does not hold a value of type {expected}")]
    OptionTypeMismatch { key: String, expected: &'static str },

    // ============================================================================
    // Resource Shape Errors
    // ============================================================================
    #[error("object of type '{type_name}' has no identifier field")]
    ObjectWithoutIdentifier { type_name: String },

    #[error("object of type '{type_name}' has multiple identifier fields: {}", .fields.join(", "))]
    ObjectWithMultipleIdentifier {
        type_name: String,
        fields: Vec<String>,
    },

    #[error("identifier field '{field}' has unsupported type {field_type}")]
    ObjectIdentifierTypeNotSupported {
        field: String,
        field_type: &'static str,
    },

    #[error("object of type '{type_name}' has an empty identifier")]
    UnidentifiedObject { type_name: String },

    // ============================================================================
    // Transport / Protocol Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("resource not found: {method} {url}")]
    NotFound { method: String, url: String },

    #[error("access denied: {method} {url}")]
    AccessDenied { method: String, url: String },

    #[error("{method} {url} failed with HTTP {status}: {message}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("unsupported response format '{content_type}'")]
    UnsupportedResponseFormat { content_type: String },

    #[error("page response has an unsupported format")]
    PageResponseNotSupported,

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an error for a type the engine cannot work with
    pub fn type_not_supported(type_name: impl Into<String>) -> Self {
        Self::TypeNotSupported {
            type_name: type_name.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::HttpStatus {
            method: method.into(),
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Check if this error reports a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error reports a forbidden resource
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::AccessDenied { .. })
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::AccessDenied { .. } => Some(403),
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if retrying the same call could succeed.
    ///
    /// The engine never retries on its own; this is for callers layering a
    /// retry policy, e.g. around [`crate::PageIter::reset_error`].
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for resource-dispatch
pub type Result<T> = std::result::Result<T, Error>;

/// Swallow [`Error::NotFound`], passing every other outcome through.
///
/// Handy for idempotent deletes: destroying something that is already gone
/// is not a failure.
pub fn ignore_not_found(result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::http_status("GET", "https://api.example.com/x", 500, "Server error");
        assert_eq!(
            err.to_string(),
            "GET https://api.example.com/x failed with HTTP 500: Server error"
        );

        let err = Error::ObjectWithMultipleIdentifier {
            type_name: "Vm".into(),
            fields: vec!["identifier".into(), "meta.id".into()],
        };
        assert!(err.to_string().contains("identifier, meta.id"));
    }

    #[test]
    fn test_status_classification() {
        let err = Error::NotFound {
            method: "GET".into(),
            url: "u".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_access_denied());
        assert_eq!(err.status(), Some(404));

        let err = Error::AccessDenied {
            method: "GET".into(),
            url: "u".into(),
        };
        assert!(err.is_access_denied());
        assert_eq!(err.status(), Some(403));

        assert_eq!(Error::ContextRequired.status(), None);
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::http_status("GET", "u", 429, "").is_retryable());
        assert!(Error::http_status("GET", "u", 500, "").is_retryable());
        assert!(Error::http_status("GET", "u", 503, "").is_retryable());

        assert!(!Error::http_status("GET", "u", 400, "").is_retryable());
        assert!(!Error::PageResponseNotSupported.is_retryable());
        assert!(!Error::config("test").is_retryable());
    }

    #[test]
    fn test_ignore_not_found() {
        let not_found: Result<()> = Err(Error::NotFound {
            method: "DELETE".into(),
            url: "u".into(),
        });
        assert!(ignore_not_found(not_found).is_ok());

        let denied: Result<()> = Err(Error::AccessDenied {
            method: "DELETE".into(),
            url: "u".into(),
        });
        assert!(ignore_not_found(denied).is_err());
        assert!(ignore_not_found(Ok(())).is_ok());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
