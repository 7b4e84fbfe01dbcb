//! Downloadable artifacts and filename classification.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};
use crate::name::PackageName;
use crate::tags::CompatibilityTag;
use crate::version::{Version, parse_version};

/// Source archive suffixes, checked in order.
pub const SOURCE_ARCHIVE_SUFFIXES: [&str; 2] = [".tar.gz", ".zip"];

/// Prebuilt package suffix.
pub const WHEEL_SUFFIX: &str = ".whl";

/// What a filename denotes, decided by suffix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// A `.whl` prebuilt package.
    Wheel,
    /// A `.tar.gz` or `.zip` source archive.
    SourceArchive,
    /// Anything else (eggs, `.exe` installers, `.tar.bz2`, ...).
    Other,
}

impl ArtifactKind {
    /// Classify a filename. Total: every string maps to exactly one kind.
    #[must_use]
    pub fn of(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(WHEEL_SUFFIX) {
            Self::Wheel
        } else if SOURCE_ARCHIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            Self::SourceArchive
        } else {
            Self::Other
        }
    }
}

/// One downloadable file from an index listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Absolute download URL, without fragment.
    pub url: Url,
    /// Filename as listed by the index.
    pub filename: String,
    /// Lowercase hex sha256 published by the index, if any.
    pub sha256: Option<String>,
}

impl Artifact {
    /// Create an artifact.
    #[must_use]
    pub fn new(url: Url, filename: impl Into<String>, sha256: Option<String>) -> Self {
        Self {
            url,
            filename: filename.into(),
            sha256,
        }
    }

    /// Suffix classification of the filename.
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        ArtifactKind::of(&self.filename)
    }

    /// Whether this is a prebuilt package.
    #[must_use]
    pub fn is_wheel(&self) -> bool {
        self.kind() == ArtifactKind::Wheel
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename)
    }
}

/// Parsed `{name}-{version}[-{build}]-{python}-{abi}-{platform}.whl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelFilename {
    /// Distribution name.
    pub name: PackageName,
    /// Distribution version.
    pub version: Version,
    /// Optional build tag, always starting with a digit.
    pub build: Option<String>,
    /// Expanded compatibility tags.
    pub tags: Vec<CompatibilityTag>,
}

impl WheelFilename {
    /// Parse a wheel filename.
    pub fn parse(filename: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::invalid_requirement(filename, reason);

        let stem = strip_suffix_ignore_case(filename, WHEEL_SUFFIX)
            .ok_or_else(|| invalid("not a wheel filename"))?;
        let parts: Vec<&str> = stem.split('-').collect();
        let (name, version, build, python, abi, platform) = match parts.as_slice() {
            [name, version, python, abi, platform] => (*name, *version, None, *python, *abi, *platform),
            [name, version, build, python, abi, platform] => {
                if !build.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(invalid("wheel build tag must start with a digit"));
                }
                (*name, *version, Some((*build).to_string()), *python, *abi, *platform)
            }
            _ => return Err(invalid("wrong number of wheel filename components")),
        };
        if name.contains("__") {
            return Err(invalid("invalid wheel project name"));
        }

        Ok(Self {
            name: PackageName::new(name)?,
            version: parse_version(version)?,
            build,
            tags: CompatibilityTag::expand(python, abi, platform),
        })
    }
}

/// Parsed `{name}-{version}.tar.gz` or `{name}-{version}.zip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDistFilename {
    /// Distribution name.
    pub name: PackageName,
    /// Distribution version.
    pub version: Version,
}

impl SourceDistFilename {
    /// Parse a source archive filename. The version is everything after the last `-`.
    pub fn parse(filename: &str) -> Result<Self> {
        let stem = SOURCE_ARCHIVE_SUFFIXES
            .iter()
            .find_map(|suffix| strip_suffix_ignore_case(filename, suffix))
            .ok_or_else(|| Error::invalid_requirement(filename, "not a source archive filename"))?;
        let (name, version) = stem
            .rsplit_once('-')
            .ok_or_else(|| Error::invalid_requirement(filename, "missing version in source archive name"))?;

        Ok(Self {
            name: PackageName::new(name)?,
            version: parse_version(version)?,
        })
    }
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
