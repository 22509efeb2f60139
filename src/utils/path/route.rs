//! Logical mount URL utilities.
//!
//! Map `file`/`sources` fields and map-reference comments are URLs, not
//! file system paths: they always use forward slashes, and joining an
//! absolute-looking segment appends instead of replacing.

use std::path::Path;

/// Render a path with forward slashes.
#[inline]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Join URL segments and normalize the result.
///
/// Empty segments are ignored, `.` is dropped and `..` pops the previous
/// segment. A leading `/` on the first non-empty segment is preserved.
///
/// # Examples
/// ```ignore
/// assert_eq!(join_url(&["/map", "/assets/site.css.map"]), "/map/assets/site.css.map");
/// assert_eq!(join_url(&["", "site.css.map"]), "site.css.map");
/// assert_eq!(join_url(&["maps", "../site.css.map"]), "site.css.map");
/// ```
pub fn join_url(segments: &[&str]) -> String {
    let joined = segments
        .iter()
        .map(|s| s.replace('\\', "/"))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let absolute = joined.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if absolute { format!("/{body}") } else { body }
}
