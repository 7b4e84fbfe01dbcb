//! Error types for freeze2nix operations.
//!
//! Each error has:
//! - A unique error code (e.g., E0101) for easy reference and searching
//! - A clear error message explaining what went wrong
//! - Suggestions for how to fix the issue

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for freeze2nix errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lockfile errors (E01xx)
    /// Malformed lockfile line or segment
    E0101,
    /// Dangling or duplicate dependency record
    E0102,
    /// Dependency cycle
    E0103,
    /// Invalid requirement expression
    E0104,

    // Index errors (E02xx)
    /// Index unreachable or returned an error status
    E0201,
    /// Index listing could not be interpreted
    E0202,

    // Selection errors (E03xx)
    /// No compatible artifact for a pinned requirement
    E0301,

    // Fetch errors (E04xx)
    /// Artifact download failed
    E0401,

    // IO errors (E05xx)
    /// File not found
    E0501,
    /// Permission denied
    E0502,
    /// Other IO failure
    E0503,

    // Configuration errors (E06xx)
    /// Invalid configuration
    E0601,
    /// Interpreter probe failed
    E0602,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0301 => "E0301",
            Self::E0401 => "E0401",
            Self::E0501 => "E0501",
            Self::E0502 => "E0502",
            Self::E0503 => "E0503",
            Self::E0601 => "E0601",
            Self::E0602 => "E0602",
        }
    }

    /// Get a brief title for this error code.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::E0101 => "Malformed lockfile",
            Self::E0102 => "Inconsistent dependency graph",
            Self::E0103 => "Cyclic dependency",
            Self::E0104 => "Invalid requirement",
            Self::E0201 => "Index unavailable",
            Self::E0202 => "Malformed index listing",
            Self::E0301 => "No compatible artifact",
            Self::E0401 => "Artifact fetch failed",
            Self::E0501 => "File not found",
            Self::E0502 => "Permission denied",
            Self::E0503 => "IO error",
            Self::E0601 => "Invalid configuration",
            Self::E0602 => "Interpreter probe failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wrapper to make `ErrorCode` usable as a source.
#[derive(Debug)]
pub struct ErrorCodeSource(pub ErrorCode);

impl fmt::Display for ErrorCodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

impl std::error::Error for ErrorCodeSource {}

/// Main error type for freeze2nix.
#[derive(Error, Debug)]
pub enum Error {
    /// Lockfile could not be segmented.
    #[error("[{code}] line {line}: {message}")]
    LockfileFormat {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// 1-based line number.
        line: usize,
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Depended-on-by annotations do not form a consistent graph.
    #[error("[{code}] inconsistent dependency graph: {message}")]
    GraphConsistency {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// Packages involved.
        packages: Vec<String>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// The dependency graph contains a cycle.
    #[error("[{code}] cyclic dependency among: {}", packages.join(", "))]
    CyclicDependency {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Packages left unordered, sorted.
        packages: Vec<String>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// A requirement expression could not be interpreted.
    #[error("[{code}] invalid requirement '{input}': {message}")]
    InvalidRequirement {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// The offending input.
        input: String,
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// The package index could not be reached or answered with an error.
    #[error("[{code}] package index unavailable: {message}")]
    IndexUnavailable {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// URL that failed.
        url: Option<String>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// The index listing was malformed.
    #[error("[{code}] malformed index listing: {message}")]
    IndexFormat {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// Listing URL.
        url: Option<String>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// No artifact satisfies a pinned requirement.
    #[error("[{code}] no compatible artifact for '{requirement}'")]
    MissingArtifact {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Requirement that could not be satisfied.
        requirement: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// An artifact could not be downloaded for hashing.
    #[error("[{code}] failed to fetch artifact: {message}")]
    ArtifactFetch {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// Artifact URL.
        url: Option<String>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// IO error.
    #[error("[{code}] io error at {path}: {message}")]
    Io {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Configuration error.
    #[error("[{code}] config error: {message}")]
    Config {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// Configuration key.
        key: Option<String>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },
}

impl Error {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::LockfileFormat { code, .. }
            | Self::GraphConsistency { code, .. }
            | Self::CyclicDependency { code, .. }
            | Self::InvalidRequirement { code, .. }
            | Self::IndexUnavailable { code, .. }
            | Self::IndexFormat { code, .. }
            | Self::MissingArtifact { code, .. }
            | Self::ArtifactFetch { code, .. }
            | Self::Io { code, .. }
            | Self::Config { code, .. } => code.0,
        }
    }

    /// Get suggestions for fixing this error.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::LockfileFormat { suggestions, .. }
            | Self::GraphConsistency { suggestions, .. }
            | Self::CyclicDependency { suggestions, .. }
            | Self::InvalidRequirement { suggestions, .. }
            | Self::IndexUnavailable { suggestions, .. }
            | Self::IndexFormat { suggestions, .. }
            | Self::MissingArtifact { suggestions, .. }
            | Self::ArtifactFetch { suggestions, .. }
            | Self::Io { suggestions, .. }
            | Self::Config { suggestions, .. } => suggestions,
        }
    }

    /// Create a lockfile format error at a 1-based line.
    #[must_use]
    pub fn lockfile_format(line: usize, message: impl Into<String>) -> Self {
        Self::LockfileFormat {
            code: ErrorCodeSource(ErrorCode::E0101),
            line,
            message: message.into(),
            suggestions: vec![
                "Regenerate the lockfile with 'pip-compile' so every package carries '# via' annotations".to_string(),
                "Move trailing comments onto their own line".to_string(),
            ],
        }
    }

    /// Create a graph consistency error.
    #[must_use]
    pub fn graph_consistency(message: impl Into<String>, packages: Vec<String>) -> Self {
        let mut suggestions = vec![
            "Every package named in a '# via' annotation must be pinned in the same lockfile"
                .to_string(),
        ];
        if !packages.is_empty() {
            suggestions.push(format!("Check the entries for: {}", packages.join(", ")));
        }
        Self::GraphConsistency {
            code: ErrorCodeSource(ErrorCode::E0102),
            message: message.into(),
            packages,
            suggestions,
        }
    }

    /// Create a cyclic dependency error listing the unordered packages.
    #[must_use]
    pub fn cyclic_dependency(mut packages: Vec<String>) -> Self {
        packages.sort();
        Self::CyclicDependency {
            code: ErrorCodeSource(ErrorCode::E0103),
            packages,
            suggestions: vec![
                "Nix derivations cannot depend on each other in a loop".to_string(),
                "Remove one edge of the cycle from the lockfile annotations".to_string(),
            ],
        }
    }

    /// Create an invalid requirement error.
    #[must_use]
    pub fn invalid_requirement(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequirement {
            code: ErrorCodeSource(ErrorCode::E0104),
            input: input.into(),
            message: message.into(),
            suggestions: vec!["Pin every package exactly, e.g. 'requests==2.31.0'".to_string()],
        }
    }

    /// Create an index unavailable error.
    #[must_use]
    pub fn index_unavailable(message: impl Into<String>, url: Option<String>) -> Self {
        let message = message.into();
        let mut suggestions = vec![
            "Check your internet connection".to_string(),
            "Verify PIP_INDEX_URL points to a PEP 503 simple index".to_string(),
        ];
        if let Some(ref u) = url {
            suggestions.push(format!("Try accessing {u} in a browser"));
        }
        if message.contains("404") {
            suggestions.push("Check the package name for typos".to_string());
        }
        Self::IndexUnavailable {
            code: ErrorCodeSource(ErrorCode::E0201),
            message,
            url,
            suggestions,
        }
    }

    /// Create an index format error.
    #[must_use]
    pub fn index_format(message: impl Into<String>, url: Option<String>) -> Self {
        Self::IndexFormat {
            code: ErrorCodeSource(ErrorCode::E0202),
            message: message.into(),
            url,
            suggestions: vec!["The index did not return a PEP 503 listing page".to_string()],
        }
    }

    /// Create a missing artifact error.
    #[must_use]
    pub fn missing_artifact(requirement: impl Into<String>) -> Self {
        Self::MissingArtifact {
            code: ErrorCodeSource(ErrorCode::E0301),
            requirement: requirement.into(),
            suggestions: vec![
                "No wheel matches this interpreter and no source archive is published".to_string(),
                "Pass --tag to widen the accepted platform tags".to_string(),
            ],
        }
    }

    /// Create an artifact fetch error.
    #[must_use]
    pub fn artifact_fetch(message: impl Into<String>, url: Option<String>) -> Self {
        let mut suggestions = vec!["Retry; transient network failures are common".to_string()];
        if url.is_some() {
            suggestions.push("Clear the freeze2nix cache directory if the problem persists".to_string());
        }
        Self::ArtifactFetch {
            code: ErrorCodeSource(ErrorCode::E0401),
            message: message.into(),
            url,
            suggestions,
        }
    }

    /// Create an IO error with context.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let (code, suggestions) = match err.kind() {
            std::io::ErrorKind::NotFound => (
                ErrorCode::E0501,
                vec![
                    format!("Check if the path exists: {}", path.display()),
                    "Verify you're in the correct directory".to_string(),
                ],
            ),
            std::io::ErrorKind::PermissionDenied => (
                ErrorCode::E0502,
                vec![format!("Check permissions on: {}", path.display())],
            ),
            _ => (
                ErrorCode::E0503,
                vec![format!("Check the file: {}", path.display())],
            ),
        };
        Self::Io {
            code: ErrorCodeSource(code),
            path,
            message: err.to_string(),
            suggestions,
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, key: Option<String>) -> Self {
        Self::Config {
            code: ErrorCodeSource(ErrorCode::E0601),
            message: message.into(),
            key,
            suggestions: vec!["Run 'freeze2nix --help' to review the available options".to_string()],
        }
    }

    /// Create an interpreter probe error.
    #[must_use]
    pub fn interpreter(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCodeSource(ErrorCode::E0602),
            message: message.into(),
            key: Some("python".to_string()),
            suggestions: vec![
                "Point --python at an interpreter with 'packaging' or 'pip' installed".to_string(),
                "Or list accepted tags explicitly with --tag".to_string(),
            ],
        }
    }

    /// Format the error with suggestions for display.
    #[must_use]
    pub fn display_with_suggestions(&self) -> String {
        let mut output = format!("{self}");
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\n\nSuggestions:");
            for suggestion in suggestions {
                output.push_str(&format!("\n  - {suggestion}"));
            }
        }
        output
    }
}

/// Result type for freeze2nix operations.
pub type Result<T> = std::result::Result<T, Error>;
