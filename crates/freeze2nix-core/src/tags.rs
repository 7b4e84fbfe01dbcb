//! Wheel compatibility tags.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An `(interpreter, abi, platform)` triple such as `cp311-cp311-manylinux_2_17_x86_64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompatibilityTag {
    /// Python implementation and version, e.g. `cp311` or `py3`.
    pub interpreter: String,
    /// ABI tag, e.g. `cp311`, `abi3` or `none`.
    pub abi: String,
    /// Platform tag, e.g. `manylinux_2_17_x86_64` or `any`.
    pub platform: String,
}

impl CompatibilityTag {
    /// Build a tag from its three components, lowercased.
    #[must_use]
    pub fn new(interpreter: &str, abi: &str, platform: &str) -> Self {
        Self {
            interpreter: interpreter.to_ascii_lowercase(),
            abi: abi.to_ascii_lowercase(),
            platform: platform.to_ascii_lowercase(),
        }
    }

    /// Expand compressed tag sets (`py2.py3-none-any`) into every concrete tag.
    ///
    /// Order is interpreter-major, then abi, then platform.
    #[must_use]
    pub fn expand(interpreter: &str, abi: &str, platform: &str) -> Vec<Self> {
        let mut tags = Vec::new();
        for i in interpreter.split('.') {
            for a in abi.split('.') {
                for p in platform.split('.') {
                    tags.push(Self::new(i, a, p));
                }
            }
        }
        tags
    }
}

impl fmt::Display for CompatibilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.interpreter, self.abi, self.platform)
    }
}

impl FromStr for CompatibilityTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(i), Some(a), Some(p)) if !i.is_empty() && !a.is_empty() && !p.is_empty() => {
                Ok(Self::new(i, a, p))
            }
            _ => Err(Error::config(
                format!("invalid compatibility tag '{s}', expected interpreter-abi-platform"),
                Some("tag".to_string()),
            )),
        }
    }
}

/// Ordered set of tags the running environment accepts, most preferred first.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    ordered: Vec<CompatibilityTag>,
    members: HashSet<CompatibilityTag>,
}

impl TagSet {
    /// Build from tags in preference order; duplicates keep their first position.
    pub fn new(tags: impl IntoIterator<Item = CompatibilityTag>) -> Self {
        let mut set = Self::default();
        for tag in tags {
            if set.members.insert(tag.clone()) {
                set.ordered.push(tag);
            }
        }
        set
    }

    /// Parse textual tags, one per element.
    pub fn parse<'a>(tags: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let parsed = tags
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<CompatibilityTag>>>()?;
        Ok(Self::new(parsed))
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, tag: &CompatibilityTag) -> bool {
        self.members.contains(tag)
    }

    /// Tags in preference order.
    pub fn iter(&self) -> impl Iterator<Item = &CompatibilityTag> {
        self.ordered.iter()
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether no tags are accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl FromIterator<CompatibilityTag> for TagSet {
    fn from_iter<T: IntoIterator<Item = CompatibilityTag>>(iter: T) -> Self {
        Self::new(iter)
    }
}
