//! Command-line interface module.

mod args;
pub mod clean;
pub mod resolve;
pub mod transpile;

pub use args::{Cli, Commands, TranspileArgs};
