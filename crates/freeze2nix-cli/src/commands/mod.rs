//! CLI commands for freeze2nix.

pub mod convert;
pub mod order;
pub mod tags;

use clap::{Parser, Subcommand};
use std::path::Path;

use freeze2nix_lockfile::{DependencyGraph, read_lockfile};

/// Convert pip-compile lockfiles into Nix expressions
#[derive(Parser, Debug)]
#[command(name = "freeze2nix")]
#[command(author = "freeze2nix Contributors")]
#[command(version)]
#[command(about = "Convert pip-compile lockfiles into Nix expressions", long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Increase the verbosity of messages: -v for info, -vv for debug, -vvv for trace
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve every pin against a package index and write a Nix expression
    Convert(convert::ConvertArgs),

    /// Print packages in dependency order without touching the network
    Order(order::OrderArgs),

    /// Print the wheel tags an interpreter accepts, most preferred first
    Tags(tags::TagsArgs),
}

/// Read a lockfile and rebuild its dependency graph.
fn load_graph(path: &Path) -> freeze2nix_core::Result<DependencyGraph> {
    let entries = read_lockfile(path)?;
    Ok(DependencyGraph::build(entries)?)
}
