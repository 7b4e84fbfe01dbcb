//! Index client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{RepositoryError, Result};

/// Index used when nothing else is configured.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/simple/";

/// Environment variable pip itself reads for the index base URL.
pub const INDEX_URL_ENV: &str = "PIP_INDEX_URL";

/// Simple index client configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Index base URL, always ending in `/`.
    pub index_url: Url,
    /// Total request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Retries after the first failed attempt.
    pub max_retries: usize,
    /// Initial retry delay.
    pub retry_delay: Duration,
    /// Maximum retry delay.
    pub max_retry_delay: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_delay: Duration::from_millis(200),
            max_retry_delay: Duration::from_secs(5),
            user_agent: format!("freeze2nix/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl IndexConfig {
    /// Create a new config builder.
    #[must_use]
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::default()
    }

    /// Default configuration with the index taken from `PIP_INDEX_URL` when set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = std::env::var(INDEX_URL_ENV).ok().filter(|v| !v.trim().is_empty()) {
            config.index_url = normalize_index_url(&value)?;
        }
        Ok(config)
    }
}

/// Parse an index base URL, appending the trailing `/` that relative joins need.
pub fn normalize_index_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| RepositoryError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(RepositoryError::InvalidUrl {
            url: raw.to_string(),
            message: "index URL cannot be used as a base".into(),
        });
    }
    Ok(url)
}

fn default_index_url() -> Url {
    Url::parse(DEFAULT_INDEX_URL).expect("default index URL is valid")
}

/// Builder for `IndexConfig`.
#[derive(Debug, Default)]
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    /// Set the index base URL.
    pub fn index_url(mut self, raw: &str) -> Result<Self> {
        self.config.index_url = normalize_index_url(raw)?;
        Ok(self)
    }

    /// Set total request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set maximum retries.
    #[must_use]
    pub const fn max_retries(mut self, retries: usize) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the initial retry delay.
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> IndexConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://pypi.org/simple", "https://pypi.org/simple/")]
    #[test_case("https://pypi.org/simple/", "https://pypi.org/simple/")]
    #[test_case("  http://localhost:8080/root/pypi  ", "http://localhost:8080/root/pypi/")]
    fn appends_trailing_slash(input: &str, expected: &str) {
        assert_eq!(normalize_index_url(input).unwrap().as_str(), expected);
    }

    #[test_case("not a url")]
    #[test_case("mailto:someone@example.com")]
    fn rejects_unusable_urls(input: &str) {
        assert!(normalize_index_url(input).is_err());
    }

    #[test]
    fn builder_overrides() {
        let config = IndexConfig::builder()
            .index_url("https://mirror.example/simple")
            .unwrap()
            .max_retries(0)
            .build();
        assert_eq!(config.index_url.as_str(), "https://mirror.example/simple/");
        assert_eq!(config.max_retries, 0);
        assert_eq!(IndexConfig::default().index_url.as_str(), DEFAULT_INDEX_URL);
    }
}
