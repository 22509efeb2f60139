//! Compiled artifacts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sourcemap::RegularMap;

/// Raw result of a compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOutput {
    pub content: String,
    pub mapping: RegularMap,
}

/// A compiled input, stamped with its output path.
///
/// This is also the cache file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub filename: PathBuf,
    pub content: String,
    pub mapping: RegularMap,
}

impl CompiledUnit {
    pub fn new(filename: PathBuf, output: CompilerOutput) -> Self {
        Self {
            filename,
            content: output.content,
            mapping: output.mapping,
        }
    }
}
