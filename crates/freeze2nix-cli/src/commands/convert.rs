//! Convert command - lockfile to Nix expression.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use anyhow::Result;
use clap::Args;
use freeze2nix_core::{Error, TagSet};
use freeze2nix_downloader::{DownloadConfig, HashResolver};
use freeze2nix_repository::{DEFAULT_INDEX_URL, IndexConfig, SimpleIndexClient};
use freeze2nix_resolver::{ArtifactSelector, Resolver, ResolverConfig};
use tracing::info;

use crate::output::progress::ResolveProgress;
use crate::platform;
use crate::render::render_nix;

/// Arguments for the convert command.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// pip-compile output to convert
    #[arg(value_name = "LOCKFILE")]
    pub lockfile: PathBuf,

    /// Where to write the Nix expression [default: LOCKFILE with a .nix extension]
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Simple index base URL
    #[arg(long, env = "PIP_INDEX_URL", default_value = DEFAULT_INDEX_URL, value_name = "URL")]
    pub index_url: String,

    /// Artifact cache directory [default: user cache dir]
    #[arg(long, env = "FREEZE2NIX_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Interpreter whose wheel tags are accepted
    #[arg(long, env = "FREEZE2NIX_PYTHON", default_value = "python3", value_name = "BIN")]
    pub python: String,

    /// Accept this wheel tag (interpreter-abi-platform) instead of asking the
    /// interpreter; repeat for several, most preferred first
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Packages resolved at once; 1 resolves them one by one
    #[arg(short, long, default_value_t = 8, value_name = "N")]
    pub jobs: usize,
}

/// Run the convert command.
pub async fn run(args: ConvertArgs, quiet: bool) -> Result<()> {
    let graph = super::load_graph(&args.lockfile)?;
    let order = graph.emission_order().map_err(Error::from)?;
    info!(packages = order.len(), direct = graph.direct().len(), "ordered lockfile");

    let tags = if args.tags.is_empty() {
        platform::detect_tags(&args.python).await?
    } else {
        TagSet::parse(args.tags.iter().map(String::as_str))?
    };
    info!(tags = tags.len(), "accepted wheel tags");

    let index_config = IndexConfig::builder()
        .index_url(&args.index_url)
        .map_err(Error::from)?
        .build();
    let download_config = match &args.cache_dir {
        Some(dir) => DownloadConfig::builder().cache_dir(dir).build(),
        None => DownloadConfig::from_env(),
    };
    info!(index = %index_config.index_url, cache = %download_config.cache_dir.display(), "resolving");

    let resolver = Resolver::new(
        SimpleIndexClient::with_config(index_config).map_err(Error::from)?,
        HashResolver::new(download_config).map_err(Error::from)?,
        ArtifactSelector::new(tags),
        ResolverConfig::default().with_max_concurrent(args.jobs),
    );

    let progress = ResolveProgress::new(order.len(), quiet);
    let resolved = resolver
        .resolve_all(&order, |position, total, package| {
            progress.advance(position, total, package.name.as_str());
        })
        .await;
    progress.finish();
    let resolved = resolved.map_err(Error::from)?;

    let out_path = output_path(&args.lockfile, args.output.as_deref());
    tokio::fs::write(&out_path, render_nix(&resolved))
        .await
        .map_err(|e| Error::io(&out_path, e))?;

    let stats = resolver.hashes().stats();
    let cache = resolver.hashes().cache().stats();
    info!(
        embedded_hashes = stats.embedded.load(Ordering::Relaxed),
        computed_hashes = stats.computed.load(Ordering::Relaxed),
        downloads = cache.downloads.load(Ordering::Relaxed),
        cache_hits = cache.hits.load(Ordering::Relaxed),
        listings = resolver.index().stats().listings.load(Ordering::Relaxed),
        "conversion complete"
    );
    if !quiet {
        eprintln!("Wrote {} packages to {}", resolved.len(), out_path.display());
    }
    Ok(())
}

/// `OUT` when given, otherwise the lockfile path with its extension replaced by `nix`.
fn output_path(lockfile: &Path, output: Option<&Path>) -> PathBuf {
    output.map_or_else(|| lockfile.with_extension("nix"), Path::to_path_buf)
}
