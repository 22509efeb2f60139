//! Compiler plugins and the registry that dispatches to them.
//!
//! A compiler turns one source file into text plus a regular source map.
//! The pipeline never looks inside a compiler; it only knows the
//! [`CompilerDescriptor`] it was registered with.
//!
//! # Built-in compilers
//!
//! | Alt extensions          | Compiler            | Output |
//! |-------------------------|---------------------|--------|
//! | `.css` `.sass` `.scss`  | [`StyleCompiler`]   | `.css` |
//! | `.js` `.es` `.es6`      | [`ScriptCompiler`]  | `.js`  |
//! | configured              | [`CommandCompiler`] | any    |

mod command;
mod registry;
mod rewrite;
mod script;
mod style;
mod unit;

pub use command::{CommandCompiler, resolve_args};
pub use registry::{
    CommentStyle, CompilerDescriptor, CompilerRegistry, DescriptorPatch, PostProcess,
    Registration, RegistryError, normalize_ext,
};
pub use rewrite::{RewriteRule, rewrite_post_process};
pub use script::{MARKER, ScriptCompiler};
pub use style::StyleCompiler;
pub use unit::{CompiledUnit, CompilerOutput};

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Options a compiler may honor.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Produce compressed output.
    pub minified: bool,
    /// Browser target query, forwarded as-is.
    pub browserslist: Option<String>,
    /// Scratch space for compilers that need intermediate files.
    pub tmpdir: PathBuf,
}

/// Async compile capability.
///
/// Implementations read `input` and must not have other side effects
/// visible to the pipeline.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Short name for logs and errors.
    fn name(&self) -> &str;

    async fn compile(&self, input: &Path, options: &CompileOptions) -> Result<CompilerOutput>;
}
