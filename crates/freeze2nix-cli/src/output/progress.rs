//! Resolution progress on stderr.
//!
//! A progress bar on a terminal; plain `Processing` lines otherwise, so logs
//! of non-interactive runs still show where a run stopped.

use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

#[derive(Debug)]
enum Mode {
    Hidden,
    Bar(ProgressBar),
    Lines,
}

/// Progress reporter for the resolution pipeline.
#[derive(Debug)]
pub struct ResolveProgress {
    mode: Mode,
}

impl ResolveProgress {
    /// Reporter for `total` packages; silent when `quiet`.
    pub fn new(total: usize, quiet: bool) -> Self {
        let mode = if quiet {
            Mode::Hidden
        } else if Term::stderr().is_term() {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
                bar.set_style(style.progress_chars("=>-"));
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            Mode::Bar(bar)
        } else {
            Mode::Lines
        };
        Self { mode }
    }

    /// Record that the package at 1-based `position` is done.
    pub fn advance(&self, position: usize, total: usize, name: &str) {
        match &self.mode {
            Mode::Hidden => {}
            Mode::Bar(bar) => {
                bar.set_position(position as u64);
                bar.set_message(name.to_string());
            }
            Mode::Lines => eprintln!("{}", progress_line(position, total, name)),
        }
    }

    /// Clear the bar, if any.
    pub fn finish(&self) {
        if let Mode::Bar(bar) = &self.mode {
            bar.finish_and_clear();
        }
    }
}

/// `Processing 3/40 (7.50%) name`
pub fn progress_line(position: usize, total: usize, name: &str) -> String {
    let percent = if total == 0 {
        100.0
    } else {
        position as f64 / total as f64 * 100.0
    };
    format!("Processing {position}/{total} ({percent:.2}%) {name}")
}
