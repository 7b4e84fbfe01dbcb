//! Artifact downloads and content hashes for freeze2nix.
//!
//! Artifacts whose listing entry carries no `#sha256=` fragment are fetched
//! once into a filename-keyed cache directory and hashed in-process.
//!
//! - [`ArtifactCache`]: streaming download with retry, temp-file-and-rename
//!   writes and one fetch per filename under concurrency
//! - [`HashResolver`]: embedded hash or fetch-and-hash
//! - [`ContentHashSource`]: the seam the resolver pipeline depends on

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod checksum;
pub mod config;
pub mod error;
pub mod hash;

pub use cache::{ArtifactCache, CacheStats, cache_key};
pub use checksum::{sha256_file, sha256_file_async};
pub use config::{CACHE_DIR_ENV, DownloadConfig, DownloadConfigBuilder, default_cache_dir};
pub use error::{DownloadError, Result};
pub use hash::{ContentHashSource, HashResolver, HashStats};
