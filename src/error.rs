//! Error handling for cogniforge

use thiserror::Error;

/// Main error type for cogniforge
#[derive(Error, Debug, Clone)]
pub enum CogniforgeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u64 },

    #[error("Network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        url: Option<String>,
    },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        content: Option<String>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CogniforgeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create a network error
    pub fn network(
        message: impl Into<String>,
        status_code: Option<u16>,
        url: Option<String>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            status_code,
            url,
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a rate limit error
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>, content: Option<String>) -> Self {
        Self::Parse {
            message: message.into(),
            content,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Network { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Convert from common error types
impl From<reqwest::Error> for CogniforgeError {
    fn from(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let url = err.url().map(|u| u.to_string());

        if err.is_timeout() {
            Self::timeout("HTTP request", 60)
        } else if err.is_connect() {
            Self::network("Connection failed", status_code, url)
        } else if err.is_request() {
            Self::network("Request failed", status_code, url)
        } else {
            Self::network(err.to_string(), status_code, url)
        }
    }
}

impl From<serde_json::Error> for CogniforgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string(), None)
    }
}

impl From<tokio::time::error::Elapsed> for CogniforgeError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::timeout("Operation", 60)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CogniforgeError>;
