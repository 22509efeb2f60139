//! Requested path → source file resolution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compiler::CompilerRegistry;
use crate::utils::fs::exists;

use super::name::{MIN_MARKER, extension_of, is_minified_name, separate_name};

/// Finds the source variant that produces a requested asset.
#[derive(Debug, Clone)]
pub struct AltfileResolver {
    registry: Arc<CompilerRegistry>,
}

impl AltfileResolver {
    pub fn new(registry: Arc<CompilerRegistry>) -> Self {
        Self { registry }
    }

    /// Alt extensions that compile to `ext`, in lookup order.
    ///
    /// `ext` itself is tried last and only when `include_self` is set.
    fn candidates(&self, ext: &str, include_self: bool) -> Vec<&str> {
        let (mut same, other): (Vec<&str>, Vec<&str>) = self
            .registry
            .iter()
            .filter(|(_, desc)| desc.extension == ext)
            .map(|(alt, _)| alt)
            .partition(|alt| *alt == ext);

        let mut alts = other;
        if include_self {
            alts.append(&mut same);
        }
        alts
    }

    /// Source file for `requested`, if any alt variant exists on disk.
    ///
    /// `site.css` finds `site.scss` or `site.sass`; `site.min.css` also
    /// accepts `site.css` itself (minifying a plain file). `forced` behaves
    /// as if the request carried the `.min` marker.
    pub fn get_altfile(&self, requested: &Path, forced: bool) -> Option<PathBuf> {
        let ext = extension_of(requested)?;
        let stem = requested.file_stem()?.to_str()?;
        let base = stem.strip_suffix(MIN_MARKER).unwrap_or(stem);
        let minified = forced || is_minified_name(requested);

        self.candidates(&ext, minified)
            .into_iter()
            .map(|alt| requested.with_file_name(format!("{base}{alt}")))
            .find(|candidate| exists(candidate))
    }

    /// Whether `path` has an extension that compiles into something else.
    pub fn can_transpile(&self, path: &Path) -> bool {
        let Some(ext) = extension_of(path) else {
            return false;
        };
        self.registry
            .iter()
            .any(|(alt, desc)| alt == ext && desc.extension != alt)
    }

    /// Sources for a possibly combined request (`dir/a,b.js`), in order.
    ///
    /// Parts without a source are dropped.
    pub fn resolve_request(&self, requested: &Path) -> Vec<PathBuf> {
        let parts = separate_name(requested);
        let forced = parts.len() > 1;
        parts
            .iter()
            .filter_map(|part| self.get_altfile(part, forced))
            .collect()
    }
}
