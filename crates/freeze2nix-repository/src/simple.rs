//! PEP 503 simple index client.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use backon::{ExponentialBuilder, Retryable};
use freeze2nix_core::{Artifact, PackageName};
use futures::future::BoxFuture;
use reqwest::{Client, header};
use tracing::{debug, warn};
use url::Url;

use crate::config::IndexConfig;
use crate::error::{RepositoryError, Result};
use crate::html;

/// Source of artifact listings for a package.
pub trait PackageIndex: Send + Sync {
    /// Every artifact the index lists for `name`, in listing order.
    fn artifacts<'a>(&'a self, name: &'a PackageName) -> BoxFuture<'a, Result<Vec<Artifact>>>;
}

/// Request counters.
#[derive(Debug, Default)]
pub struct IndexStats {
    /// Listing pages fetched successfully.
    pub listings: AtomicU64,
    /// Retries attempted.
    pub retries: AtomicU64,
    /// Artifacts parsed from listings.
    pub artifacts: AtomicU64,
}

/// HTTP client for a PEP 503 simple index.
#[derive(Debug, Clone)]
pub struct SimpleIndexClient {
    client: Client,
    config: IndexConfig,
    stats: Arc<IndexStats>,
}

impl SimpleIndexClient {
    /// Create a client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(IndexConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("text/html"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| RepositoryError::InvalidConfig {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self::with_client(client, config))
    }

    /// Create a client sharing an existing connection pool.
    #[must_use]
    pub fn with_client(client: Client, config: IndexConfig) -> Self {
        Self {
            client,
            config,
            stats: Arc::new(IndexStats::default()),
        }
    }

    /// The configured index base URL.
    #[must_use]
    pub fn index_url(&self) -> &Url {
        &self.config.index_url
    }

    /// Request counters.
    #[must_use]
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// `{index}{normalized-name}/`
    pub fn listing_url(&self, name: &PackageName) -> Result<Url> {
        self.config
            .index_url
            .join(&format!("{name}/"))
            .map_err(|e| RepositoryError::InvalidUrl {
                url: format!("{}{name}/", self.config.index_url),
                message: e.to_string(),
            })
    }

    /// Fetch and parse the listing for a package.
    pub async fn fetch_artifacts(&self, name: &PackageName) -> Result<Vec<Artifact>> {
        let url = self.listing_url(name)?;
        let (page_url, body) = self.fetch_listing(&url).await?;
        let artifacts = parse_listing(&page_url, &body)?;
        self.stats
            .artifacts
            .fetch_add(artifacts.len() as u64, Ordering::Relaxed);
        debug!(package = %name, artifacts = artifacts.len(), "parsed listing");
        Ok(artifacts)
    }

    async fn fetch_listing(&self, url: &Url) -> Result<(Url, String)> {
        let url_str = url.to_string();
        let timeout_secs = self.config.timeout.as_secs();

        let page = (|| async {
            debug!(url = %url_str, "fetching listing");
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| request_error(&url_str, timeout_secs, &e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(RepositoryError::status(url_str.clone(), status.as_u16()));
            }

            // Relative links resolve against the page actually served.
            let final_url = response.url().clone();
            let text = response
                .text()
                .await
                .map_err(|e| request_error(&url_str, timeout_secs, &e))?;
            Ok((final_url, text))
        })
        .retry(
            ExponentialBuilder::default()
                .with_min_delay(self.config.retry_delay)
                .with_max_delay(self.config.max_retry_delay)
                .with_max_times(self.config.max_retries),
        )
        .when(RepositoryError::is_retryable)
        .notify(|err, dur| {
            self.stats.retries.fetch_add(1, Ordering::Relaxed);
            warn!(error = %err, retry_in = ?dur, "retrying listing request");
        })
        .await?;

        self.stats.listings.fetch_add(1, Ordering::Relaxed);
        Ok(page)
    }
}

impl PackageIndex for SimpleIndexClient {
    fn artifacts<'a>(&'a self, name: &'a PackageName) -> BoxFuture<'a, Result<Vec<Artifact>>> {
        Box::pin(self.fetch_artifacts(name))
    }
}

fn request_error(url: &str, timeout_secs: u64, err: &reqwest::Error) -> RepositoryError {
    if err.is_timeout() {
        RepositoryError::Timeout {
            url: url.to_string(),
            timeout_secs,
        }
    } else {
        RepositoryError::Unavailable {
            url: url.to_string(),
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

/// Turn a listing page into artifacts, resolving links against `listing_url`.
pub fn parse_listing(listing_url: &Url, html: &str) -> Result<Vec<Artifact>> {
    html::anchors(html)
        .into_iter()
        .map(|anchor| {
            let href = anchor.href.ok_or_else(|| {
                RepositoryError::format(
                    listing_url.as_str(),
                    format!("anchor '{}' has no href attribute", anchor.text),
                )
            })?;
            let (url, sha256) = resolve_href(listing_url, &href)?;
            Ok(Artifact::new(url, anchor.text, sha256))
        })
        .collect()
}

/// Resolve an `href` against the listing URL and split off a `sha256` fragment.
///
/// The returned URL never carries a fragment. The digest is returned exactly
/// as published; fragments naming another hash algorithm yield no hash.
pub fn resolve_href(listing_url: &Url, href: &str) -> Result<(Url, Option<String>)> {
    let mut url = listing_url
        .join(href.trim())
        .map_err(|e| RepositoryError::format(listing_url.as_str(), format!("bad href '{href}': {e}")))?;

    let sha256 = url.fragment().and_then(|fragment| {
        let (algorithm, digest) = fragment.split_once('=')?;
        (algorithm.eq_ignore_ascii_case("sha256") && !digest.is_empty())
            .then(|| digest.to_string())
    });
    url.set_fragment(None);
    Ok((url, sha256))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const LISTING: &str = "https://packagestore.com/simple/somepackage/";

    #[test_case(
        "https://files.pythonhosted.org/path/to/artifact.whl",
        "https://files.pythonhosted.org/path/to/artifact.whl" ; "already absolute"
    )]
    #[test_case(
        "/some/other/path/someartifact.whl",
        "https://packagestore.com/some/other/path/someartifact.whl" ; "absolute path"
    )]
    #[test_case(
        "./someartifact.whl",
        "https://packagestore.com/simple/somepackage/someartifact.whl" ; "relative"
    )]
    #[test_case(
        "../../someartifact.whl",
        "https://packagestore.com/someartifact.whl" ; "relative parent"
    )]
    #[test_case(
        "//mirror.example/x.tar.gz",
        "https://mirror.example/x.tar.gz" ; "scheme relative"
    )]
    fn resolves_against_listing(href: &str, expected: &str) {
        let base = Url::parse(LISTING).unwrap();
        let (url, sha256) = resolve_href(&base, href).unwrap();
        assert_eq!(url.as_str(), expected);
        assert_eq!(sha256, None);
    }

    #[test]
    fn sha256_fragment_is_split_off() {
        let base = Url::parse(LISTING).unwrap();
        let (url, sha256) = resolve_href(&base, "pkg-1.0.tar.gz#sha256=abcdef").unwrap();
        assert_eq!(url.as_str(), "https://packagestore.com/simple/somepackage/pkg-1.0.tar.gz");
        assert_eq!(sha256.as_deref(), Some("abcdef"));
    }

    #[test]
    fn published_digest_is_kept_verbatim() {
        let base = Url::parse(LISTING).unwrap();
        let (_, sha256) = resolve_href(&base, "pkg-1.0.tar.gz#SHA256=ABCdef01").unwrap();
        assert_eq!(sha256.as_deref(), Some("ABCdef01"));
    }

    #[test]
    fn other_fragments_yield_no_hash() {
        let base = Url::parse(LISTING).unwrap();
        let (url, sha256) = resolve_href(&base, "pkg-1.0.tar.gz#md5=123").unwrap();
        assert!(url.fragment().is_none());
        assert_eq!(sha256, None);
    }

    #[test]
    fn listing_keeps_order_and_filenames() {
        let base = Url::parse(LISTING).unwrap();
        let html = r#"
<a href="b-1.0.tar.gz#sha256=01">b-1.0.tar.gz</a>
<a href="a-1.0-py3-none-any.whl">a-1.0-py3-none-any.whl</a>"#;
        let artifacts = parse_listing(&base, html).unwrap();
        let names: Vec<_> = artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["b-1.0.tar.gz", "a-1.0-py3-none-any.whl"]);
        assert_eq!(artifacts[0].sha256.as_deref(), Some("01"));
        assert!(artifacts[1].is_wheel());
    }

    #[test]
    fn anchor_without_href_is_a_format_error() {
        let base = Url::parse(LISTING).unwrap();
        let err = parse_listing(&base, "<a>orphan.tar.gz</a>").unwrap_err();
        assert!(matches!(err, RepositoryError::Format { .. }));
    }

    #[test]
    fn listing_url_uses_normalized_name() {
        let client = SimpleIndexClient::new().unwrap();
        let name: PackageName = "Zope.Interface".parse().unwrap();
        assert_eq!(
            client.listing_url(&name).unwrap().as_str(),
            "https://pypi.org/simple/zope-interface/"
        );
    }
}
