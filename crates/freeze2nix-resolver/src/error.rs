//! Error types for resolution.

use freeze2nix_downloader::DownloadError;
use freeze2nix_repository::RepositoryError;
use thiserror::Error;

/// Resolution errors.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Neither a compatible wheel nor a source archive matches the pin.
    #[error("no compatible artifact for '{requirement}'")]
    MissingArtifact {
        /// The requirement as written.
        requirement: String,
    },

    /// Listing fetch failed.
    #[error(transparent)]
    Index(#[from] RepositoryError),

    /// Artifact download or hashing failed.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Result type for resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;

impl From<ResolveError> for freeze2nix_core::Error {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::MissingArtifact { requirement } => Self::missing_artifact(requirement),
            ResolveError::Index(e) => e.into(),
            ResolveError::Download(e) => e.into(),
        }
    }
}
