//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::transpile::MapPolicy;

/// On-demand asset transpiler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: assetter.toml, searched upward)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (skip, cache and done lines)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile and combine source files into one output
    #[command(visible_alias = "t")]
    Transpile {
        #[command(flatten)]
        args: TranspileArgs,
    },

    /// Print the source files that would produce a requested asset
    #[command(visible_alias = "r")]
    Resolve {
        /// Requested output path, e.g. `css/site.min.css` or `js/a,b.js`
        #[arg(value_hint = clap::ValueHint::FilePath)]
        requested: PathBuf,
    },

    /// Remove every cached compile result
    Clean,
}

/// Transpile command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct TranspileArgs {
    /// Source files, combined in order
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    /// Output file (default: derived from the inputs)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub outfile: Option<PathBuf>,

    /// Minify the output (default: from config)
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Source map placement: `inline`, `none`, or a directory relative to the output
    #[arg(long, value_parser = parse_maps)]
    pub maps: Option<MapPolicy>,

    /// Ignore cached compile results
    #[arg(long)]
    pub no_cache: bool,

    /// Print the result instead of writing it
    #[arg(long)]
    pub dry: bool,
}

fn parse_maps(value: &str) -> Result<MapPolicy, String> {
    Ok(match value {
        "inline" => MapPolicy::Inline,
        "none" => MapPolicy::Suppressed,
        dir => MapPolicy::Sibling(dir.to_string()),
    })
}
