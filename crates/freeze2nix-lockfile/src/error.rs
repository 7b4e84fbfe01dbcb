//! Error types for lockfile operations.

use std::path::PathBuf;
use thiserror::Error;

/// Lockfile parsing and graph errors.
#[derive(Error, Debug)]
pub enum LockfileError {
    /// IO error with path context.
    #[error("IO error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
        /// Underlying error kind.
        kind: std::io::ErrorKind,
    },

    /// A line or segment violates the pip-compile layout.
    #[error("line {line}: {message}")]
    Format {
        /// 1-based line number.
        line: usize,
        /// Error message.
        message: String,
    },

    /// An annotation names a package with no entry of its own.
    #[error("'{dependency}' is required by '{dependent}', which is not pinned in the lockfile")]
    DanglingDependent {
        /// The annotated package.
        dependency: String,
        /// The name that has no entry.
        dependent: String,
    },

    /// Two entries normalize to the same package name.
    #[error("package '{name}' is pinned twice (lines {first_line} and {second_line})")]
    DuplicatePackage {
        /// Normalized package name.
        name: String,
        /// Line of the first entry.
        first_line: usize,
        /// Line of the second entry.
        second_line: usize,
    },

    /// The depends-on graph has a cycle; carries the unordered names, sorted.
    #[error("cyclic dependency among: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
}

impl LockfileError {
    /// Create an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            kind: err.kind(),
        }
    }

    /// Create a format error at a 1-based line.
    #[must_use]
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// Check if this is a structural graph error rather than a text error.
    #[must_use]
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::DanglingDependent { .. } | Self::DuplicatePackage { .. } | Self::CyclicDependency(_)
        )
    }
}

impl From<LockfileError> for freeze2nix_core::Error {
    fn from(err: LockfileError) -> Self {
        match err {
            LockfileError::Io { path, message, kind } => {
                Self::io(path, std::io::Error::new(kind, message))
            },
            LockfileError::Format { line, message } => Self::lockfile_format(line, message),
            LockfileError::DanglingDependent { ref dependency, ref dependent } => {
                let packages = vec![dependent.clone(), dependency.clone()];
                Self::graph_consistency(err.to_string(), packages)
            }
            LockfileError::DuplicatePackage { ref name, .. } => {
                let packages = vec![name.clone()];
                Self::graph_consistency(err.to_string(), packages)
            }
            LockfileError::CyclicDependency(names) => Self::cyclic_dependency(names),
        }
    }
}

/// Result type for lockfile operations.
pub type Result<T> = std::result::Result<T, LockfileError>;
