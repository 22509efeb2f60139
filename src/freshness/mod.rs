//! Freshness detection: mtime comparison between a source and its cached artifact.

pub mod mtime;

pub use mtime::{get_mtime, is_newer_than};
