//! Error types for index access.

use thiserror::Error;

/// Package index errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The index could not be reached or answered with an error status.
    #[error("index unavailable at {url}: {message}")]
    Unavailable {
        /// URL that failed.
        url: String,
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// URL that timed out.
        url: String,
        /// Timeout in seconds.
        timeout_secs: u64,
    },

    /// Listing page could not be interpreted.
    #[error("malformed listing at {url}: {message}")]
    Format {
        /// Listing URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Invalid URL.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl RepositoryError {
    /// Create an unavailable error from an HTTP status.
    #[must_use]
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Unavailable {
            url: url.into(),
            message: format!("HTTP {status}"),
            status: Some(status),
        }
    }

    /// Create a listing format error.
    #[must_use]
    pub fn format(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if a retry could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Unavailable { status: None, .. } => true,
            Self::Unavailable {
                status: Some(code), ..
            } => matches!(*code, 408 | 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Check if this is a "not found" error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Unavailable {
                status: Some(404),
                ..
            }
        )
    }
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

impl From<RepositoryError> for freeze2nix_core::Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Unavailable { ref url, .. } | RepositoryError::Timeout { ref url, .. } => {
                Self::index_unavailable(err.to_string(), Some(url.clone()))
            }
            RepositoryError::Format { ref url, .. } => {
                Self::index_format(err.to_string(), Some(url.clone()))
            }
            RepositoryError::InvalidUrl { ref url, .. } => {
                Self::config(err.to_string(), Some(url.clone()))
            }
            RepositoryError::InvalidConfig { message } => Self::config(message, None),
        }
    }
}
