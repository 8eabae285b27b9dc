use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

mod commands;

use commands::{build, check, library};

#[derive(Parser, Debug)]
#[command(
    name = "molkit",
    about = "Inspect the molecule library, validate serialized structures, and simulate kit builds.",
    version,
    author,
    arg_required_else_help = true
)]
struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the named molecules bundled with the library.
    Library(library::LibraryArgs),
    /// Validate a serialized structure against the library.
    Check(check::CheckArgs),
    /// Drop atoms into a kit one at a time and report the molecules that form.
    Build(build::BuildArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let library = commands::load_library()?;
    match cli.command {
        Command::Library(args) => library::run(&library, &args),
        Command::Check(args) => check::run(&library, &args),
        Command::Build(args) => build::run(&library, &args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
