//! `serp-flag`: highlight search results whose titles a remote classifier flags.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serp_flag_cli::cli::{
    self, annotate_cmd, classify_cmd, doctor, extract_cmd, settings::ConfigArgs,
};

#[derive(Parser)]
#[command(
    name = "serp-flag",
    version,
    about = "Classify search-result titles with a remote model and highlight the matches"
)]
struct Cli {
    /// Config file (default: ~/.serp-flag/config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Machine-readable JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Only print errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Per-candidate output and debug logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable ANSI colors.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every result title in a page and highlight the matches.
    Annotate(annotate_cmd::AnnotateArgs),
    /// List the texts the selector picks out, without classifying them.
    Extract(extract_cmd::ExtractArgs),
    /// Classify free text.
    Classify(classify_cmd::ClassifyArgs),
    /// Check configuration and endpoint reachability.
    Doctor(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Output helpers read these, so set them before anything prints.
    if cli.json {
        std::env::set_var("SERP_FLAG_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("SERP_FLAG_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("SERP_FLAG_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("SERP_FLAG_NO_COLOR", "1");
    }

    cli::init_tracing();

    let config_path = cli.config.as_deref();
    match &cli.command {
        Commands::Annotate(args) => annotate_cmd::run(args, config_path).await,
        Commands::Extract(args) => extract_cmd::run(args, config_path).await,
        Commands::Classify(args) => classify_cmd::run(args, config_path).await,
        Commands::Doctor(args) => doctor::run(args, config_path).await,
    }
}
