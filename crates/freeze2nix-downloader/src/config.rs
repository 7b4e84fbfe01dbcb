//! Configuration types for the downloader.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "FREEZE2NIX_CACHE_DIR";

/// Download configuration.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory holding downloaded artifacts, one file per filename.
    pub cache_dir: PathBuf,
    /// Connection timeout for initial TCP connection.
    pub connect_timeout: Duration,
    /// Total request timeout, body included.
    pub timeout: Duration,
    /// Retries after the first failed attempt.
    pub max_retries: usize,
    /// Base delay for exponential backoff.
    pub retry_base_delay: Duration,
    /// Maximum delay between retries.
    pub retry_max_delay: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(300),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(30),
            user_agent: format!("freeze2nix/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DownloadConfig {
    /// Create a new config builder.
    #[must_use]
    pub fn builder() -> DownloadConfigBuilder {
        DownloadConfigBuilder::default()
    }

    /// Default configuration with the cache directory taken from
    /// `FREEZE2NIX_CACHE_DIR` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
            config.cache_dir = PathBuf::from(dir);
        }
        config
    }
}

/// `<user cache dir>/freeze2nix`, or a directory under the system temp dir
/// when no home directory can be determined.
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || std::env::temp_dir().join("freeze2nix"),
        |dirs| dirs.cache_dir().join("freeze2nix"),
    )
}

/// Builder for `DownloadConfig`.
#[derive(Debug, Default)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    /// Set the cache directory.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.cache_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set total request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set maximum retries.
    #[must_use]
    pub const fn max_retries(mut self, retries: usize) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the base retry delay.
    #[must_use]
    pub const fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.config.retry_base_delay = delay;
        self
    }

    /// Set user agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> DownloadConfig {
        self.config
    }
}
