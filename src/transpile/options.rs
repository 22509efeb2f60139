//! Per-call pipeline options.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset::is_minified_name;
use crate::compiler::CompileOptions;
use crate::logger::{ConsoleLog, LogSink};

/// Where the source map of a result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapPolicy {
    /// Embed the map as a base64 `data:` URI in the output.
    Inline,
    /// No map and no map comment.
    Suppressed,
    /// Map file in a directory relative to the output (`""`: next to it).
    Sibling(String),
    /// One map copy per alias, referenced through its URL prefix.
    Aliases(Vec<MapAlias>),
}

impl Default for MapPolicy {
    fn default() -> Self {
        Self::Sibling(String::new())
    }
}

/// A `(url prefix, directory)` pairing for [`MapPolicy::Aliases`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAlias {
    pub url_prefix: String,
    pub dir: PathBuf,
}

impl MapAlias {
    pub fn new(url_prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            dir: dir.into(),
        }
    }
}

/// Minification request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Minify {
    On,
    #[default]
    Off,
    /// Minify iff the explicit output name carries `.min`.
    Auto,
}

impl Minify {
    pub fn resolve(self, outfile: Option<&Path>) -> bool {
        match self {
            Self::On => true,
            Self::Off => false,
            Self::Auto => outfile.is_some_and(is_minified_name),
        }
    }
}

impl From<bool> for Minify {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Options of one [`Transpiler::transpile`](super::Transpiler::transpile) call.
#[derive(Clone)]
pub struct TranspileOptions {
    pub maps: MapPolicy,
    /// Explicit output path (default: derived from the inputs).
    pub outfile: Option<PathBuf>,
    pub minified: Minify,
    /// Ignore existing cache entries (new entries are still written).
    pub nocache: bool,
    /// Compute results without writing outputs.
    pub nowrite: bool,
    /// Physical root of the logical mount used in maps.
    pub rootdir: PathBuf,
    /// Logical mount point of `rootdir` (e.g. `/assets`).
    pub localdir: String,
    /// Base directory of the cache.
    pub tmpdir: PathBuf,
    /// Inputs must match at least one pattern; empty allows everything.
    pub patterns: Vec<glob::Pattern>,
    pub logger: Arc<dyn LogSink>,
    /// Browser target query forwarded to compilers.
    pub browserslist: Option<String>,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            maps: MapPolicy::default(),
            outfile: None,
            minified: Minify::default(),
            nocache: false,
            nowrite: false,
            rootdir: std::env::current_dir().unwrap_or_default(),
            localdir: String::new(),
            tmpdir: std::env::temp_dir(),
            patterns: Vec::new(),
            logger: Arc::new(ConsoleLog),
            browserslist: None,
        }
    }
}

impl fmt::Debug for TranspileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranspileOptions")
            .field("maps", &self.maps)
            .field("outfile", &self.outfile)
            .field("minified", &self.minified)
            .field("nocache", &self.nocache)
            .field("nowrite", &self.nowrite)
            .field("rootdir", &self.rootdir)
            .field("localdir", &self.localdir)
            .field("tmpdir", &self.tmpdir)
            .field("patterns", &self.patterns)
            .field("browserslist", &self.browserslist)
            .finish_non_exhaustive()
    }
}

impl TranspileOptions {
    /// Whether `input` passes the pattern allow-list.
    pub fn allows(&self, input: &Path) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches_path(input))
    }

    pub(crate) fn compile_options(&self, minified: bool) -> CompileOptions {
        CompileOptions {
            minified,
            browserslist: self.browserslist.clone(),
            tmpdir: self.tmpdir.clone(),
        }
    }
}
