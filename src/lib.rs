//! Assetter - on-demand asset transpiler.
//!
//! Resolves a requested asset to its source variant, compiles it through a
//! pluggable compiler registry, combines several inputs into one output with
//! a sectioned source map, and caches every compile by modification time.

pub mod asset;
pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod freshness;
pub mod logger;
pub mod sourcemap;
pub mod transpile;
pub mod utils;

pub use asset::AltfileResolver;
pub use compiler::{CompilerRegistry, DescriptorPatch, Registration};
pub use transpile::{CombinedResult, MapPath, MapPolicy, Minify, TranspileOptions, Transpiler};
