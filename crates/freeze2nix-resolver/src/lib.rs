//! Artifact resolution for freeze2nix.
//!
//! For each lockfile node, in emission order: fetch the index listing, pick a
//! compatible artifact with [`ArtifactSelector`], and obtain its sha256. The
//! [`Resolver`] runs nodes with bounded concurrency while keeping results in
//! input order.

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod pipeline;
pub mod selector;

pub use error::{ResolveError, Result};
pub use pipeline::{ArtifactFormat, ResolvedPackage, Resolver, ResolverConfig};
pub use selector::ArtifactSelector;
