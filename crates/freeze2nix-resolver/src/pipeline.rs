//! Listing, selection and hashing for every node in emission order.

use std::fmt;

use freeze2nix_core::{Artifact, PackageName};
use freeze2nix_downloader::ContentHashSource;
use freeze2nix_lockfile::RequirementNode;
use freeze2nix_repository::PackageIndex;
use futures::{StreamExt, stream};
use tracing::{debug, info};

use crate::error::Result;
use crate::selector::ArtifactSelector;

/// Resolution settings.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Nodes resolved at once. `1` resolves strictly one after another.
    pub max_concurrent: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_concurrent: 8 }
    }
}

impl ResolverConfig {
    /// Set the number of nodes resolved at once; `0` is treated as `1`.
    #[must_use]
    pub fn with_max_concurrent(mut self, jobs: usize) -> Self {
        self.max_concurrent = jobs.max(1);
        self
    }
}

/// How Nix should build an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Prebuilt wheel.
    Wheel,
    /// Source archive built with setuptools.
    Setuptools,
}

impl ArtifactFormat {
    /// Classify an artifact by filename.
    #[must_use]
    pub fn of(artifact: &Artifact) -> Self {
        if artifact.is_wheel() {
            Self::Wheel
        } else {
            Self::Setuptools
        }
    }

    /// The `format` attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::Setuptools => "setuptools",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node with its artifact chosen and hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Normalized package name.
    pub name: PackageName,
    /// Version exactly as pinned.
    pub version: String,
    /// Requested by an input file rather than another package.
    pub is_direct: bool,
    /// Normalized names of direct dependencies, sorted.
    pub dependencies: Vec<PackageName>,
    /// The selected artifact.
    pub artifact: Artifact,
    /// Build format implied by the artifact.
    pub format: ArtifactFormat,
    /// Lowercase hex sha256 of the artifact.
    pub sha256: String,
}

/// Resolves lockfile nodes against an index and a hash source.
#[derive(Debug)]
pub struct Resolver<I, H> {
    index: I,
    hashes: H,
    selector: ArtifactSelector,
    config: ResolverConfig,
}

impl<I: PackageIndex, H: ContentHashSource> Resolver<I, H> {
    /// Create a resolver.
    pub fn new(index: I, hashes: H, selector: ArtifactSelector, config: ResolverConfig) -> Self {
        Self {
            index,
            hashes,
            selector,
            config,
        }
    }

    /// The index client.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// The hash source.
    pub fn hashes(&self) -> &H {
        &self.hashes
    }

    /// List, select and hash a single node.
    pub async fn resolve_one(&self, node: &RequirementNode) -> Result<ResolvedPackage> {
        let artifacts = self.index.artifacts(node.name()).await?;
        let artifact = self.selector.select(node.requirement(), &artifacts)?.clone();
        let sha256 = self.hashes.sha256(&artifact).await?;
        debug!(package = %node.name(), file = %artifact.filename, "resolved");

        Ok(ResolvedPackage {
            name: node.name().clone(),
            version: node.requirement().version_text().to_string(),
            is_direct: node.is_direct(),
            dependencies: node.dependencies().iter().cloned().collect(),
            format: ArtifactFormat::of(&artifact),
            artifact,
            sha256,
        })
    }

    /// Resolve `nodes`, returning results in the same order.
    ///
    /// Up to `max_concurrent` nodes are in flight at once. `on_progress` is
    /// called with `(position, total, package)` as each result is reached in
    /// order. The first failure stops the run and drops outstanding work.
    pub async fn resolve_all<F>(&self, nodes: &[&RequirementNode], mut on_progress: F) -> Result<Vec<ResolvedPackage>>
    where
        F: FnMut(usize, usize, &ResolvedPackage),
    {
        let total = nodes.len();
        info!(packages = total, jobs = self.config.max_concurrent, "resolving artifacts");

        let mut results = stream::iter(nodes.iter().copied())
            .map(|node| self.resolve_one(node))
            .buffered(self.config.max_concurrent.max(1));

        let mut resolved = Vec::with_capacity(total);
        while let Some(package) = results.next().await {
            let package = package?;
            on_progress(resolved.len() + 1, total, &package);
            resolved.push(package);
        }
        Ok(resolved)
    }
}
