//! Order command - print the emission order.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use freeze2nix_core::Error;
use serde::Serialize;

/// Arguments for the order command.
#[derive(Args, Debug, Clone)]
pub struct OrderArgs {
    /// pip-compile output to order
    #[arg(value_name = "LOCKFILE")]
    pub lockfile: PathBuf,

    /// Print a JSON array with dependencies instead of one pin per line
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct OrderedPackage<'a> {
    name: &'a str,
    version: &'a str,
    direct: bool,
    dependencies: Vec<&'a str>,
}

/// Run the order command.
pub fn run(args: &OrderArgs) -> Result<()> {
    let graph = super::load_graph(&args.lockfile)?;
    let order = graph.emission_order().map_err(Error::from)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.json {
        let packages: Vec<_> = order
            .iter()
            .map(|node| OrderedPackage {
                name: node.name().as_str(),
                version: node.requirement().version_text(),
                direct: node.is_direct(),
                dependencies: node.dependencies().iter().map(|d| d.as_str()).collect(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut out, &packages)?;
        writeln!(out)?;
    } else {
        for node in order {
            writeln!(out, "{}=={}", node.name(), node.requirement().version_text())?;
        }
    }
    Ok(())
}
