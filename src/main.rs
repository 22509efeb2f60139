//! Assetter - on-demand asset transpiler.

use anyhow::Result;
use assetter::cli::{self, Cli, Commands};
use assetter::config::AssetterConfig;
use assetter::logger;
use clap::{ColorChoice, Parser};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = AssetterConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Transpile { args } => cli::transpile::run_transpile(args, &config).await,
        Commands::Resolve { requested } => cli::resolve::run_resolve(requested, &config),
        Commands::Clean => cli::clean::run_clean(&config).await,
    }
}
