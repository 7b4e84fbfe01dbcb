//! Tags command - show the interpreter's accepted wheel tags.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crate::platform;

/// Arguments for the tags command.
#[derive(Args, Debug, Clone)]
pub struct TagsArgs {
    /// Interpreter to ask
    #[arg(long, env = "FREEZE2NIX_PYTHON", default_value = "python3", value_name = "BIN")]
    pub python: String,
}

/// Run the tags command.
pub async fn run(args: &TagsArgs) -> Result<()> {
    let tags = platform::detect_tags(&args.python).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for tag in tags.iter() {
        writeln!(out, "{tag}")?;
    }
    Ok(())
}
