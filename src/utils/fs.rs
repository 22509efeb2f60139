//! File store used by the transpile pipeline.
//!
//! Every write goes through [`put_file`], which replaces the target
//! atomically (sibling temp file + rename). Concurrent requests compiling the
//! same input may race on one cache path; readers see either the old or the
//! new file, never a partial one.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter keeping temp names unique within the process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Read a whole file as UTF-8.
pub async fn read_file(path: &Path) -> io::Result<String> {
    tokio::fs::read_to_string(path).await
}

/// Create or replace `path` with `content`, creating parent directories.
pub async fn put_file(path: &Path, content: impl AsRef<[u8]>) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp = temp_sibling(path);
    if let Err(err) = tokio::fs::write(&temp, content.as_ref()).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(err);
    }
    if let Err(err) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(err);
    }
    Ok(())
}

/// Whether `path` exists (file or directory).
#[inline]
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Hidden temp path next to `path`: `.<name>.<pid>-<seq>.tmp`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}-{seq}.tmp", std::process::id()))
}
