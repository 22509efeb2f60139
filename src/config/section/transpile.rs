//! `[transpile]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [transpile]
//! maps = "maps"              # true: inline, false: none, "dir": sibling dir
//! minified = "auto"          # true / false / "auto" (from the output name)
//! nocache = false
//! nowrite = false
//! rootdir = "public"         # physical root of the mount
//! localdir = "/assets"       # where rootdir is mounted
//! tmpdir = ".cache"          # cache base (default: system temp dir)
//! patterns = ["**/assets/**"]
//! browserslist = "defaults"
//!
//! # or, one map copy per alias:
//! # [transpile.maps]
//! # "/maps" = "build/maps"
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::transpile::{MapAlias, MapPolicy, Minify};

const FIELD_PATTERNS: FieldPath = FieldPath::new("transpile.patterns");
const FIELD_MAPS: FieldPath = FieldPath::new("transpile.maps");
const FIELD_LOCALDIR: FieldPath = FieldPath::new("transpile.localdir");

/// Map placement as written in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapsSetting {
    /// `true`: inline data URI, `false`: no map.
    Flag(bool),
    /// Directory relative to the output.
    Dir(String),
    /// URL prefix → directory, in document order.
    Aliases(IndexMap<String, PathBuf>),
}

impl Default for MapsSetting {
    fn default() -> Self {
        Self::Dir(String::new())
    }
}

impl MapsSetting {
    /// Alias directories are resolved against `root`.
    pub fn to_policy(&self, root: &Path) -> MapPolicy {
        match self {
            Self::Flag(true) => MapPolicy::Inline,
            Self::Flag(false) => MapPolicy::Suppressed,
            Self::Dir(dir) => MapPolicy::Sibling(dir.clone()),
            Self::Aliases(aliases) => MapPolicy::Aliases(
                aliases
                    .iter()
                    .map(|(prefix, dir)| MapAlias::new(prefix, root.join(dir)))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyKeyword {
    Auto,
}

/// `minified = true | false | "auto"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinifySetting {
    Flag(bool),
    Keyword(MinifyKeyword),
}

impl Default for MinifySetting {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl From<MinifySetting> for Minify {
    fn from(setting: MinifySetting) -> Self {
        match setting {
            MinifySetting::Flag(flag) => Minify::from(flag),
            MinifySetting::Keyword(MinifyKeyword::Auto) => Minify::Auto,
        }
    }
}

/// Default options applied to every transpile call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspileSection {
    pub maps: MapsSetting,
    pub minified: MinifySetting,
    pub nocache: bool,
    pub nowrite: bool,
    /// Physical root of the mount (default: config directory).
    pub rootdir: Option<PathBuf>,
    /// Logical mount point of `rootdir`.
    pub localdir: String,
    /// Cache base directory (default: system temp dir).
    pub tmpdir: Option<PathBuf>,
    /// Glob allow-list for inputs.
    pub patterns: Vec<String>,
    pub browserslist: Option<String>,
}

impl TranspileSection {
    /// Resolve relative directories against `root`.
    pub fn normalize_paths(&mut self, root: &Path) {
        for dir in [&mut self.rootdir, &mut self.tmpdir].into_iter().flatten() {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
    }

    /// Compile `patterns`; invalid ones are reported by [`validate`](Self::validate).
    pub fn compiled_patterns(&self) -> Vec<glob::Pattern> {
        self.patterns
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect()
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for pattern in &self.patterns {
            if let Err(err) = glob::Pattern::new(pattern) {
                diag.error_with_hint(
                    FIELD_PATTERNS,
                    format!("invalid glob `{pattern}`: {err}"),
                    "patterns are matched against absolute input paths",
                );
            }
        }

        if let MapsSetting::Aliases(aliases) = &self.maps
            && aliases.is_empty()
        {
            diag.warn(FIELD_MAPS, "empty alias table, no map will be written");
        }

        if !self.localdir.is_empty() && !self.localdir.starts_with('/') {
            diag.warn(
                FIELD_LOCALDIR,
                format!("`{}` is not absolute, map paths will be relative", self.localdir),
            );
        }
    }
}
