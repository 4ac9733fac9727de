use std::error::Error;
use std::path::{Path, PathBuf};

use bbh_meta::ParseOptions;
use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    fmt::{self, FmtArgs},
    keys::{self, KeysArgs},
    show::{self, ShowArgs},
    version::{self, VersionArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "bbh", about = "Inspect and format binary black hole simulation metadata")]
struct Cli {
    /// YAML file with parse options (duplicate policy, aliases, invariants).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a metadata file and print it as JSON, canonical text or CSV.
    Show(ShowArgs),
    /// Parse and validate metadata files or directories of them.
    Check(CheckArgs),
    /// Rewrite a metadata file in the canonical layout.
    Fmt(FmtArgs),
    /// List the known keys with their kinds and sections.
    Keys(KeysArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bbh_meta=info,bbh=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_options(path: Option<&Path>) -> Result<ParseOptions, Box<dyn Error>> {
    match path {
        Some(path) => {
            let opts = ParseOptions::load(path)?;
            tracing::debug!(path = %path.display(), ?opts, "loaded parse options");
            Ok(opts)
        }
        None => Ok(ParseOptions::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();
    let opts = load_options(cli.config.as_deref())?;
    match cli.command {
        Command::Show(args) => show::run(&args, &opts),
        Command::Check(args) => check::run(&args, &opts),
        Command::Fmt(args) => fmt::run(&args, &opts),
        Command::Keys(args) => keys::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
