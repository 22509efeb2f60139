//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `absolutize` - lexical absolute path, symlinks untouched
//! - `relative_to` - relative path between two absolute paths

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and clean it lexically.
///
/// The file does not need to exist and symlinks are kept, so the result is
/// stable for cache keys and output comparison.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        lexical_clean(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        lexical_clean(&cwd.join(path))
    }
}

/// Resolve `.` and `..` components without touching the file system.
///
/// `..` never climbs above the root of an absolute path; leading `..` of a
/// relative path are kept.
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Relative path leading from directory `base` to `path`.
///
/// Both are cleaned first; the result starts with `..` when `path` lies
/// outside `base`, and is empty when they are equal.
pub fn relative_to(base: &Path, path: &Path) -> PathBuf {
    let base = lexical_clean(base);
    let path = lexical_clean(path);
    let base: Vec<_> = base.components().collect();
    let path: Vec<_> = path.components().collect();

    let common = base
        .iter()
        .zip(path.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component.as_os_str());
    }
    relative
}
