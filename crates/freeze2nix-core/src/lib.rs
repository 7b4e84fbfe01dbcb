//! Core types for freeze2nix.
//!
//! This crate provides the vocabulary shared by every other crate:
//! - PEP 503 normalized package names
//! - PEP 440 versions and exactly-pinned requirements
//! - Wheel compatibility tags
//! - Index artifacts and filename classification
//! - Error types

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod artifact;
pub mod error;
mod name;
mod requirement;
mod tags;
mod version;

pub use artifact::{
    Artifact, ArtifactKind, SOURCE_ARCHIVE_SUFFIXES, SourceDistFilename, WHEEL_SUFFIX,
    WheelFilename,
};
pub use error::{Error, ErrorCode, Result};
pub use name::{PackageName, normalize};
pub use requirement::Requirement;
pub use tags::{CompatibilityTag, TagSet};
pub use version::{Version, parse_version};
