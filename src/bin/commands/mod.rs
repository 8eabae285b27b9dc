use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

use molecule_kit::MoleculeLibrary;

pub mod build;
pub mod check;
pub mod library;

/// Loads the bundled reference data behind a spinner.
pub fn load_library() -> Result<MoleculeLibrary> {
    run_with_spinner("Loading molecule library", || {
        MoleculeLibrary::load().context("Bundled molecule data is corrupt")
    })
}

/// Wraps long-running operations with a spinner rendered to stderr.
///
/// The spinner is skipped when stderr is not a terminal so logs and pipes stay clean.
pub fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    if !io::stderr().is_terminal() {
        return work();
    }

    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_with_message(format!("{} ✓", message)),
        Err(_) => spinner.abandon_with_message(format!("{} ✗", message)),
    }

    result
}

pub fn print_boxed_label<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    let inner = format!(" {title} ");
    let width = inner.chars().count();
    writeln!(writer, "╭{}╮", "─".repeat(width))?;
    writeln!(writer, "│{}│", inner)?;
    writeln!(writer, "╰{}╯", "─".repeat(width))?;
    Ok(())
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
