//! Error types for the downloader.

use std::path::PathBuf;
use thiserror::Error;

/// Downloader-specific error types.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network/HTTP error.
    #[error("network error fetching {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status_code: Option<u16>,
        /// Whether the error is retryable.
        retryable: bool,
    },

    /// Connection error.
    #[error("connection to {url} failed: {message}")]
    Connection {
        /// Requested URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("timed out fetching {url}")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// I/O error with path context.
    #[error("I/O error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
        /// Underlying error kind.
        kind: std::io::ErrorKind,
    },

    /// The artifact filename cannot name a cache entry.
    #[error("invalid cache key '{0}'")]
    InvalidFilename(String),

    /// HTTP client could not be constructed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DownloadError {
    /// Create a network error with status code.
    #[must_use]
    pub fn network_with_status(url: impl Into<String>, status: u16) -> Self {
        let retryable = matches!(status, 408 | 429 | 500..=599);
        Self::Network {
            url: url.into(),
            message: format!("HTTP {status}"),
            status_code: Some(status),
            retryable,
        }
    }

    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            kind: err.kind(),
        }
    }

    /// Check if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network { retryable, .. } => *retryable,
            Self::Connection { .. } | Self::Timeout { .. } => true,
            Self::Io { .. } | Self::InvalidFilename(_) | Self::Config(_) => false,
        }
    }

    /// Check if this is a "not found" error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Network {
                status_code: Some(404),
                ..
            }
        )
    }

    /// Convert from a reqwest error raised while fetching `url`.
    #[must_use]
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
            };
        }
        if err.is_connect() {
            return Self::Connection {
                url: url.to_string(),
                message: err.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return Self::network_with_status(url, status.as_u16());
        }
        Self::Network {
            url: url.to_string(),
            message: err.to_string(),
            status_code: None,
            retryable: true,
        }
    }

    fn url(&self) -> Option<String> {
        match self {
            Self::Network { url, .. } | Self::Connection { url, .. } | Self::Timeout { url } => {
                Some(url.clone())
            }
            Self::Io { .. } | Self::InvalidFilename(_) | Self::Config(_) => None,
        }
    }
}

/// Result type for download operations.
pub type Result<T> = std::result::Result<T, DownloadError>;

impl From<DownloadError> for freeze2nix_core::Error {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Io { path, message, kind } => {
                Self::io(path, std::io::Error::new(kind, message))
            }
            other => {
                let url = other.url();
                Self::artifact_fetch(other.to_string(), url)
            }
        }
    }
}
