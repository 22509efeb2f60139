//! Mtime-based freshness detection.
//!
//! A cached artifact is fresh when its modification time is strictly newer
//! than the modification time of the source it was compiled from.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read.
/// `None` orders before every real time, so a missing file is never newer.
pub async fn get_mtime(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .ok()
}

/// Check if file A is newer than file B
///
/// Returns `true` if A exists and is strictly newer than B
/// Returns `false` if either file doesn't exist
pub async fn is_newer_than(a: &Path, b: &Path) -> bool {
    let (Some(a_time), Some(b_time)) = (get_mtime(a).await, get_mtime(b).await) else {
        return false;
    };
    a_time > b_time
}
