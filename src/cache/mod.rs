//! Compiled-unit cache, keyed by input path and minification mode.
//!
//! ```text
//! <tmpdir>/assetter/transpiled/
//! └── srv/www/css/site.scss.min-false.json
//! ```
//!
//! An entry is valid while its mtime is strictly newer than the input's.
//! Drive prefixes keep their letter with `:` escaped to `;`.

use std::io;
use std::path::{Path, PathBuf};

use crate::compiler::CompiledUnit;
use crate::freshness::is_newer_than;
use crate::utils::fs::{put_file, read_file};

/// Cache directory, relative to the temp directory.
pub const CACHE_DIR: &str = "assetter/transpiled";

/// Cache of compiled units under one temp directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(tmpdir: &Path) -> Self {
        Self {
            root: tmpdir.join(CACHE_DIR),
        }
    }

    /// Directory holding every entry.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry path for an absolute `input`.
    pub fn entry_path(&self, input: &Path, minified: bool) -> PathBuf {
        let escaped = input.to_string_lossy().replace(':', ";");
        let relative = escaped.trim_start_matches(['/', '\\']);
        self.root.join(format!("{relative}.min-{minified}.json"))
    }

    /// Whether the entry for `input` is newer than `input` itself.
    pub async fn is_fresh(&self, input: &Path, minified: bool) -> bool {
        is_newer_than(&self.entry_path(input, minified), input).await
    }

    /// Load a fresh entry. `Ok(None)` means stale or missing.
    ///
    /// Undecodable entries are reported as [`io::ErrorKind::InvalidData`].
    pub async fn load(&self, input: &Path, minified: bool) -> io::Result<Option<CompiledUnit>> {
        if !self.is_fresh(input, minified).await {
            return Ok(None);
        }
        let raw = read_file(&self.entry_path(input, minified)).await?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    /// Persist `unit` as the entry for `input`.
    pub async fn store(&self, input: &Path, minified: bool, unit: &CompiledUnit) -> io::Result<()> {
        let json = serde_json::to_string(unit)?;
        put_file(&self.entry_path(input, minified), json).await
    }

    /// Remove every entry. Returns `false` when there was nothing to remove.
    pub async fn clear(&self) -> io::Result<bool> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}
