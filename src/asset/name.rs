//! File naming conventions.
//!
//! ```text
//! site.scss        → site.css         (change_ext)
//! site.scss + min  → site.min.css     (output_path)
//! [t1.js, t2.js]   → t1,t2.js         (combine_name)
//! t1,t2.js         → [t1.js, t2.js]   (separate_name)
//! ```

use std::path::{Path, PathBuf};

/// Base-name suffix marking a minified artifact.
pub const MIN_MARKER: &str = ".min";

/// Separator between combined base names.
const COMBINE_SEP: char = ',';

/// Extension of `path` with its leading dot (`.scss`), if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

/// Whether the base name (without extension) ends with [`MIN_MARKER`].
pub fn is_minified_name(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with(MIN_MARKER))
}

/// Replace the last extension of `path` with `ext` (which may be `.min.css`).
pub fn change_ext(path: &Path, ext: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{ext}"))
}

/// Default output path of `input` for a canonical extension.
pub fn output_path(input: &Path, canonical_ext: &str, minified: bool) -> PathBuf {
    let marker = if minified { MIN_MARKER } else { "" };
    change_ext(input, &format!("{marker}{canonical_ext}"))
}

/// Comma-join the base names of `files`.
///
/// The result lives in the first file's directory and keeps its extension.
/// Returns `None` when every base name is empty.
pub fn combine_name<P: AsRef<Path>>(files: &[P]) -> Option<PathBuf> {
    let first = files.first()?.as_ref();
    let stems: Vec<String> = files
        .iter()
        .filter_map(|f| f.as_ref().file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .collect();
    if stems.is_empty() {
        return None;
    }

    let ext = extension_of(first).unwrap_or_default();
    let name = format!("{}{ext}", stems.join(&COMBINE_SEP.to_string()));
    Some(first.with_file_name(name))
}

/// Split a combined name back into its parts, sharing directory and extension.
///
/// A name without separator yields itself.
pub fn separate_name(path: &Path) -> Vec<PathBuf> {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return vec![path.to_path_buf()];
    };
    if !stem.contains(COMBINE_SEP) {
        return vec![path.to_path_buf()];
    }

    let ext = extension_of(path).unwrap_or_default();
    stem.split(COMBINE_SEP)
        .filter(|part| !part.is_empty())
        .map(|part| path.with_file_name(format!("{part}{ext}")))
        .collect()
}
