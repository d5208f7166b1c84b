//! emoji-canon - build a canonical multi-vendor emoji image library
//!
//! Downloads vendor emoji sets, renames every image to its canonical name,
//! expands aliases and fills gaps from the Unicode reference set.

use clap::{Parser, Subcommand};
use emoji_canon::cli::{
    AliasesArgs, BuildArgs, CliResult, CoverageArgs, DecodeArgs, DoctorArgs, ProcessArgs,
    SyncArgs, TonableArgs,
};
use emoji_canon::constants::APP_BINARY_NAME;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build a canonical multi-vendor emoji image library
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process sets, expand aliases and synchronize from the reference set
    Build(BuildArgs),
    /// Acquire and process a single set
    Process(ProcessArgs),
    /// Copy assets to their alias names
    Aliases(AliasesArgs),
    /// Fill gaps in every set from the reference set
    Sync(SyncArgs),
    /// Report reference assets missing from each set
    Coverage(CoverageArgs),
    /// Decode a codepoint-named file
    Decode(DecodeArgs),
    /// Derive the tone-eligible name list
    Tonable(TonableArgs),
    /// Check rasterizer programs and lookup tables
    Doctor(DoctorArgs),
}

impl Command {
    fn execute(&self, config: Option<&Path>) -> CliResult<()> {
        match self {
            Self::Build(args) => args.execute(config),
            Self::Process(args) => args.execute(config),
            Self::Aliases(args) => args.execute(config),
            Self::Sync(args) => args.execute(config),
            Self::Coverage(args) => args.execute(config),
            Self::Decode(args) => args.execute(config),
            Self::Tonable(args) => args.execute(config),
            Self::Doctor(args) => args.execute(config),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli.command.execute(cli.config.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code.code());
    }
}
