//! Artifact selection for a pinned requirement.

use freeze2nix_core::{Artifact, ArtifactKind, Requirement, SourceDistFilename, TagSet, WheelFilename};
use tracing::{debug, trace};

use crate::error::{ResolveError, Result};

/// Picks the artifact to embed for a pin: a compatible wheel if the index has
/// one, otherwise a source archive.
#[derive(Debug, Clone)]
pub struct ArtifactSelector {
    tags: TagSet,
}

impl ArtifactSelector {
    /// Create a selector accepting `tags`.
    #[must_use]
    pub fn new(tags: TagSet) -> Self {
        Self { tags }
    }

    /// Accepted tags.
    #[must_use]
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// First wheel in listing order whose version equals the pin and which
    /// carries at least one accepted tag; failing that, the first source
    /// archive with that version.
    ///
    /// Listing order is kept as-is: a wheel is not preferred over an earlier
    /// one because it matched a more specific tag.
    pub fn select<'a>(&self, requirement: &Requirement, artifacts: &'a [Artifact]) -> Result<&'a Artifact> {
        let target = requirement.version();

        let wheel = artifacts
            .iter()
            .filter(|a| a.kind() == ArtifactKind::Wheel)
            .find(|a| match WheelFilename::parse(&a.filename) {
                Ok(wheel) => {
                    &wheel.version == target && wheel.tags.iter().any(|tag| self.tags.contains(tag))
                }
                Err(e) => {
                    debug!(file = %a.filename, error = %e, "skipping unparseable wheel");
                    false
                }
            });
        if let Some(wheel) = wheel {
            trace!(requirement = %requirement, file = %wheel.filename, "selected wheel");
            return Ok(wheel);
        }

        let sdist = artifacts
            .iter()
            .filter(|a| a.kind() == ArtifactKind::SourceArchive)
            .find(|a| match SourceDistFilename::parse(&a.filename) {
                Ok(sdist) => &sdist.version == target,
                Err(e) => {
                    debug!(file = %a.filename, error = %e, "skipping unparseable source archive");
                    false
                }
            });
        if let Some(sdist) = sdist {
            trace!(requirement = %requirement, file = %sdist.filename, "selected source archive");
            return Ok(sdist);
        }

        Err(ResolveError::MissingArtifact {
            requirement: requirement.to_string(),
        })
    }
}
