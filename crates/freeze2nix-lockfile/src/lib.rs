//! pip-compile lockfile handling.
//!
//! This crate turns a pinned, annotated `requirements.txt` into an ordered
//! list of packages:
//!
//! - **Parsing**: requirement lines and their `# via` annotations are grouped
//!   into [`LockEntry`] records
//! - **Graph**: the "depended-on-by" annotations are inverted once into a
//!   forward [`DependencyGraph`], with duplicate and dangling checks
//! - **Ordering**: [`emission_order`] yields every package after all of its
//!   dependencies, identically on every run
//!
//! # Example
//!
//! ```
//! use freeze2nix_lockfile::{DependencyGraph, parse_lockfile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let text = "\
//! idna==3.4
//!     # via requests
//! requests==2.31.0
//!     # via -r requirements.in
//! ";
//! let graph = DependencyGraph::build(parse_lockfile(text)?)?;
//! let order: Vec<_> = graph
//!     .emission_order()?
//!     .iter()
//!     .map(|node| node.name().to_string())
//!     .collect();
//! assert_eq!(order, ["idna", "requests"]);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod graph;
pub mod order;
pub mod parser;

pub use error::{LockfileError, Result};
pub use graph::{DependencyGraph, RequirementNode};
pub use order::emission_order;
pub use parser::{LockEntry, parse_lockfile, read_lockfile};
