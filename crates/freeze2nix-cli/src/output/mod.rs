//! Terminal output.

pub mod progress;

use console::style;

/// Print an error to stderr, with code and suggestions when it carries them.
pub fn print_error(err: &anyhow::Error) {
    let body = match err.downcast_ref::<freeze2nix_core::Error>() {
        Some(e) => e.display_with_suggestions(),
        None => format!("{err:#}"),
    };
    eprintln!("{} {body}", style("error:").red().bold());
}
