//! `assetter resolve`: show which sources produce a requested asset.

use std::io::{Write, stdout};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::asset::AltfileResolver;
use crate::config::AssetterConfig;
use crate::utils::path::absolutize;

pub fn run_resolve(requested: &Path, config: &AssetterConfig) -> Result<()> {
    let resolver = AltfileResolver::new(Arc::new(config.build_registry()?));
    let requested = absolutize(requested);

    let sources = resolver.resolve_request(&requested);
    if sources.is_empty() {
        bail!("no source produces `{}`", requested.display());
    }

    let mut out = stdout().lock();
    for source in sources {
        writeln!(out, "{}", source.display())?;
    }
    Ok(())
}
