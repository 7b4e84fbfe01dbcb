//! Testing utilities for freeze2nix.
//!
//! # Modules
//!
//! - [`fixtures`]: lockfile texts in the shapes pip-compile produces
//! - [`mock_index`]: a wiremock-backed PEP 503 simple index

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod fixtures;
pub mod mock_index;

pub use fixtures::Fixtures;
pub use mock_index::{ListedFile, MockIndex, sha256_hex};
