//! `assetter clean`: drop the compile cache.

use anyhow::{Context, Result};

use crate::cache::CacheStore;
use crate::config::AssetterConfig;
use crate::log;

pub async fn run_clean(config: &AssetterConfig) -> Result<()> {
    let cache = CacheStore::new(&config.tmpdir());
    let removed = cache
        .clear()
        .await
        .with_context(|| format!("Failed to remove `{}`", cache.root().display()))?;

    if removed {
        log!("clean"; "removed {}", cache.root().display());
    } else {
        log!("clean"; "nothing to remove");
    }
    Ok(())
}
