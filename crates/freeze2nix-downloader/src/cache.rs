//! Filename-keyed on-disk artifact cache.
//!
//! Each artifact lives at `<cache_dir>/<lowercased filename>`. Downloads are
//! streamed into a temporary file in the same directory and renamed into
//! place once complete, so an interrupted download never leaves a truncated
//! entry behind. A per-key async lock makes concurrent requests for one
//! filename share a single fetch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use backon::{ExponentialBuilder, Retryable};
use dashmap::DashMap;
use freeze2nix_core::Artifact;
use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::DownloadConfig;
use crate::error::{DownloadError, Result};

/// Cache counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Completed downloads.
    pub downloads: AtomicU64,
    /// Lookups answered from disk.
    pub hits: AtomicU64,
    /// Retries attempted.
    pub retries: AtomicU64,
    /// Bytes written by completed downloads.
    pub bytes: AtomicU64,
}

/// On-disk artifact cache backed by an HTTP client.
#[derive(Debug)]
pub struct ArtifactCache {
    client: Client,
    config: DownloadConfig,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    stats: Arc<CacheStats>,
}

impl ArtifactCache {
    /// Create a cache with its own HTTP client.
    ///
    /// # Errors
    /// Returns error if the client cannot be built.
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| DownloadError::Config(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Create a cache sharing an existing connection pool.
    #[must_use]
    pub fn with_client(client: Client, config: DownloadConfig) -> Self {
        Self {
            client,
            config,
            in_flight: DashMap::new(),
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Cache directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.cache_dir
    }

    /// Cache counters.
    #[must_use]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Where `filename` is stored, whether or not it is present.
    ///
    /// # Errors
    /// Returns `InvalidFilename` if the name cannot be a single path component.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.config.cache_dir.join(cache_key(filename)?))
    }

    /// Path of the cached artifact, downloading it first when absent.
    ///
    /// # Errors
    /// Returns a network error if the download fails after retries, or an
    /// I/O error if the cache directory cannot be written.
    pub async fn get_or_fetch(&self, artifact: &Artifact) -> Result<PathBuf> {
        let key = cache_key(&artifact.filename)?;
        let dest = self.config.cache_dir.join(&key);

        let lock = Arc::clone(&self.in_flight.entry(key).or_default());
        let _guard = lock.lock().await;

        if tokio::fs::try_exists(&dest)
            .await
            .map_err(|e| DownloadError::io(&dest, e))?
        {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!(file = %artifact.filename, "cache hit");
            return Ok(dest);
        }

        tokio::fs::create_dir_all(&self.config.cache_dir)
            .await
            .map_err(|e| DownloadError::io(&self.config.cache_dir, e))?;
        self.download(&artifact.url, &dest).await?;
        Ok(dest)
    }

    async fn download(&self, url: &Url, dest: &Path) -> Result<()> {
        let url_str = url.to_string();

        let written = (|| self.download_once(url, &url_str, dest))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(self.config.retry_base_delay)
                    .with_max_delay(self.config.retry_max_delay)
                    .with_max_times(self.config.max_retries),
            )
            .when(DownloadError::is_retryable)
            .notify(|err, dur| {
                self.stats.retries.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, retry_in = ?dur, "retrying download");
            })
            .await?;

        self.stats.downloads.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes.fetch_add(written, Ordering::Relaxed);
        debug!(url = %url_str, bytes = written, dest = %dest.display(), "downloaded");
        Ok(())
    }

    async fn download_once(&self, url: &Url, url_str: &str, dest: &Path) -> Result<u64> {
        trace!(url = %url_str, "requesting artifact");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url_str, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::network_with_status(url_str, status.as_u16()));
        }

        let dir = &self.config.cache_dir;
        let temp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| DownloadError::io(dir, e))?;
        let (file, temp_path) = temp.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk.map_err(|e| DownloadError::from_reqwest(url_str, &e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(&*temp_path, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| DownloadError::io(&*temp_path, e))?;
        drop(file);

        temp_path
            .persist(dest)
            .map_err(|e| DownloadError::io(dest, e.error))?;
        Ok(written)
    }
}

/// Cache key for an artifact filename: lowercased, one path component.
///
/// # Errors
/// Returns `InvalidFilename` for empty names, `.`/`..`, and names containing
/// path separators.
pub fn cache_key(filename: &str) -> Result<String> {
    let key = filename.trim().to_lowercase();
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\', '\0']) {
        return Err(DownloadError::InvalidFilename(filename.to_string()));
    }
    Ok(key)
}
