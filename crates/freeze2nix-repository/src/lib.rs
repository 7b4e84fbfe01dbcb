//! Package index access for freeze2nix.
//!
//! Speaks the PEP 503 "simple" repository API: one HTML page per project,
//! one anchor per downloadable file, with an optional `#sha256=` fragment.
//!
//! - [`SimpleIndexClient`]: HTTP client with retry and backoff
//! - [`PackageIndex`]: the seam the resolver is generic over
//! - [`parse_listing`] / [`resolve_href`]: pure page interpretation

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod html;
pub mod simple;

pub use config::{DEFAULT_INDEX_URL, INDEX_URL_ENV, IndexConfig, IndexConfigBuilder, normalize_index_url};
pub use error::{RepositoryError, Result};
pub use simple::{IndexStats, PackageIndex, SimpleIndexClient, parse_listing, resolve_href};
