//! Content hashes for selected artifacts.

use std::sync::atomic::{AtomicU64, Ordering};

use freeze2nix_core::Artifact;
use futures::future::BoxFuture;
use tracing::debug;

use crate::cache::ArtifactCache;
use crate::checksum::sha256_file_async;
use crate::config::DownloadConfig;
use crate::error::Result;

/// Source of sha256 digests for artifacts.
pub trait ContentHashSource: Send + Sync {
    /// Lowercase hex sha256 of the artifact's content.
    fn sha256<'a>(&'a self, artifact: &'a Artifact) -> BoxFuture<'a, Result<String>>;
}

/// Hash counters.
#[derive(Debug, Default)]
pub struct HashStats {
    /// Hashes taken from the index listing.
    pub embedded: AtomicU64,
    /// Hashes computed from cached content.
    pub computed: AtomicU64,
}

/// Uses the index-published hash when there is one, otherwise hashes the
/// cached download.
#[derive(Debug)]
pub struct HashResolver {
    cache: ArtifactCache,
    stats: HashStats,
}

impl HashResolver {
    /// Create a resolver over a fresh cache.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: DownloadConfig) -> Result<Self> {
        Ok(Self::with_cache(ArtifactCache::new(config)?))
    }

    /// Create a resolver over an existing cache.
    #[must_use]
    pub fn with_cache(cache: ArtifactCache) -> Self {
        Self {
            cache,
            stats: HashStats::default(),
        }
    }

    /// The underlying cache.
    #[must_use]
    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Hash counters.
    #[must_use]
    pub fn stats(&self) -> &HashStats {
        &self.stats
    }

    /// sha256 of `artifact`, fetching it only when the listing had no hash.
    ///
    /// # Errors
    /// Returns a download error if the artifact must be fetched and cannot be.
    pub async fn resolve(&self, artifact: &Artifact) -> Result<String> {
        if let Some(hash) = &artifact.sha256 {
            self.stats.embedded.fetch_add(1, Ordering::Relaxed);
            return Ok(hash.clone());
        }

        let path = self.cache.get_or_fetch(artifact).await?;
        let digest = sha256_file_async(path).await?;
        self.stats.computed.fetch_add(1, Ordering::Relaxed);
        debug!(file = %artifact.filename, sha256 = %digest, "computed hash");
        Ok(digest)
    }
}

impl ContentHashSource for HashResolver {
    fn sha256<'a>(&'a self, artifact: &'a Artifact) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.resolve(artifact))
    }
}
