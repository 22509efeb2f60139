//! Project configuration for `assetter.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── compiler   # [[compilers]]
//! │   └── transpile  # [transpile]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # AssetterConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section         | Purpose                                       |
//! |-----------------|-----------------------------------------------|
//! | `[transpile]`   | Map policy, minification, mount, cache, globs |
//! | `[[compilers]]` | Extra alt extensions and compiler overrides   |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

// Re-export from section/
pub use section::{
    CommentKind, CompilerSection, MapsSetting, MinifySetting, RewriteSection, TranspileSection,
};

// Re-export from types/
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath, Severity};

use crate::compiler::CompilerRegistry;
use crate::logger::LogSink;
use crate::transpile::TranspileOptions;
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "assetter.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assetter.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetterConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Default transpile options
    #[serde(default)]
    pub transpile: TranspileSection,

    /// Registry additions, applied in order
    #[serde(default)]
    pub compilers: Vec<CompilerSection>,
}

impl AssetterConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `assetter.toml` is searched
    /// upward from cwd, and built-in defaults apply when none is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let config_path = match explicit {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => find_config_file(&cwd, Path::new(CONFIG_FILE)),
        };

        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None => {
                debug!("config"; "no {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };

        let root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or(cwd, Path::to_path_buf);
        config.config_path = config_path;
        config.finalize(&root);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Set the root and resolve relative directories against it.
    fn finalize(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        self.transpile.normalize_paths(root);
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Collect diagnostics for every section.
    ///
    /// Compiler entries are checked against the registry as built by the
    /// entries before them.
    pub fn diagnostics(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();
        self.transpile.validate(&mut diag);

        let mut registry = CompilerRegistry::with_defaults();
        for (index, entry) in self.compilers.iter().enumerate() {
            let before = diag.error_count();
            entry.validate(index, &registry, &mut diag);
            // later entries may inherit from this one
            if diag.error_count() == before
                && let Err(err) = entry.apply(&mut registry)
            {
                diag.registry(FieldPath::indexed("compilers", index, "ext"), &err);
            }
        }
        diag
    }

    /// Validate, printing warnings and failing on errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let diag = self.diagnostics();
        diag.log_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    // ========================================================================
    // pipeline construction
    // ========================================================================

    /// Default registry plus the `[[compilers]]` entries, in order.
    pub fn build_registry(&self) -> Result<CompilerRegistry, ConfigError> {
        let mut registry = CompilerRegistry::with_defaults();
        for entry in &self.compilers {
            entry.apply(&mut registry)?;
        }
        Ok(registry)
    }

    /// Cache base directory.
    pub fn tmpdir(&self) -> PathBuf {
        self.transpile
            .tmpdir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Transpile options from `[transpile]`.
    pub fn transpile_options(&self, logger: Arc<dyn LogSink>) -> TranspileOptions {
        let section = &self.transpile;
        TranspileOptions {
            maps: section.maps.to_policy(&self.root),
            outfile: None,
            minified: section.minified.into(),
            nocache: section.nocache,
            nowrite: section.nowrite,
            rootdir: section.rootdir.clone().unwrap_or_else(|| self.root.clone()),
            localdir: section.localdir.clone(),
            tmpdir: self.tmpdir(),
            patterns: section.compiled_patterns(),
            logger,
            browserslist: section.browserslist.clone(),
        }
    }
}

/// Parse config text.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AssetterConfig {
    let (parsed, ignored) = AssetterConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
