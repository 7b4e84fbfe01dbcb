//! PEP 440 versions.
//!
//! Parsing, canonical display, equality and ordering all come from
//! `pep440_rs`; this module only maps its parse errors into ours.

use std::str::FromStr;

pub use pep440_rs::Version;

use crate::error::{Error, Result};

/// Parse a version string.
pub fn parse_version(input: &str) -> Result<Version> {
    Version::from_str(input.trim())
        .map_err(|e| Error::invalid_requirement(input, format!("not a PEP 440 version: {e}")))
}
