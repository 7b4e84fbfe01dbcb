//! Exactly-pinned requirement expressions.
//!
//! Lockfile entries are PEP 508 requirements restricted to a single `==`
//! specifier with a concrete version, e.g. `requests[socks]==2.31.0 ; python_version >= "3.8"`.
//! The grammar itself is `pep508_rs`'s; this module narrows it to exact pins.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use pep440_rs::Operator;
use pep508_rs::VersionOrUrl;
use regex::Regex;

use crate::error::{Error, Result};
use crate::name::PackageName;
use crate::version::Version;

// Something shaped like a requirement: a name, optional extras, then a
// specifier, a marker, a URL reference or nothing at all.
static REQUIREMENT_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?\s*(?:\[[^\]]*\])?\s*(?:\(?\s*(?:===|==|!=|~=|<=|>=|<|>)|;|@|$)",
    )
    .expect("requirement shape pattern is valid")
});

/// A requirement pinned to one exact version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    package: PackageName,
    extras: Vec<String>,
    version: Version,
    version_text: String,
    marker: Option<String>,
}

impl Requirement {
    /// Whether `input` is shaped like a requirement at all.
    ///
    /// Pip option lines (`--index-url …`, `-e …`) and bare URLs are not;
    /// `foo`, `foo>=1` and `foo @ https://…` are, even though only an exact
    /// pin parses successfully.
    #[must_use]
    pub fn looks_like_requirement(input: &str) -> bool {
        REQUIREMENT_SHAPE.is_match(input.trim())
    }

    /// Parse a requirement that must carry exactly one `==` specifier.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let parsed: pep508_rs::Requirement = trimmed
            .parse()
            .map_err(|e: pep508_rs::Pep508Error| Error::invalid_requirement(input, e.message.to_string()))?;

        let specifiers = match parsed.version_or_url {
            Some(VersionOrUrl::VersionSpecifier(specifiers)) => specifiers,
            Some(VersionOrUrl::Url(_)) => {
                return Err(Error::invalid_requirement(
                    input,
                    "direct URL references are not supported",
                ));
            }
            None => {
                return Err(Error::invalid_requirement(
                    input,
                    "expected exactly one '==' specifier, found 0",
                ));
            }
        };
        let [spec] = &*specifiers else {
            return Err(Error::invalid_requirement(
                input,
                format!("expected exactly one '==' specifier, found {}", specifiers.len()),
            ));
        };
        match spec.operator() {
            Operator::Equal => {}
            Operator::EqualStar => {
                return Err(Error::invalid_requirement(input, "wildcard pins are not exact"));
            }
            op => {
                return Err(Error::invalid_requirement(
                    input,
                    format!("expected an exact '==' pin, found '{op}'"),
                ));
            }
        }

        // pep508_rs only keeps the normalized name; the spelling as written
        // is the leading run of name characters.
        let name: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        let package = PackageName::new(&name)?;
        let extras = parsed.extras.iter().map(ToString::to_string).collect();
        let marker = trimmed
            .split_once(';')
            .map(|(_, marker)| marker.trim())
            .filter(|marker| !marker.is_empty())
            .map(str::to_string);
        let version = spec.version().clone();

        Ok(Self {
            name,
            package,
            extras,
            version_text: version.to_string(),
            version,
            marker,
        })
    }

    /// The name as written in the lockfile.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized package name.
    #[must_use]
    pub fn package(&self) -> &PackageName {
        &self.package
    }

    /// Requested extras.
    #[must_use]
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// The pinned version.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The pinned version in canonical form.
    #[must_use]
    pub fn version_text(&self) -> &str {
        &self.version_text
    }

    /// Environment marker, if any.
    #[must_use]
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        write!(f, "=={}", self.version_text)?;
        if let Some(marker) = &self.marker {
            write!(f, " ; {marker}")?;
        }
        Ok(())
    }
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
