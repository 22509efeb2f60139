//! `assetter transpile`: run the pipeline once from the command line.

use std::io::{Write, stdout};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::TranspileArgs;
use crate::config::AssetterConfig;
use crate::logger::ConsoleLog;
use crate::transpile::{MapPath, Minify, TranspileOptions, Transpiler};
use crate::{debug, log};

/// Config defaults with the command-line overrides applied.
pub fn options_from_args(args: &TranspileArgs, config: &AssetterConfig) -> TranspileOptions {
    let mut options = config.transpile_options(Arc::new(ConsoleLog));
    if let Some(outfile) = &args.outfile {
        options.outfile = Some(outfile.clone());
    }
    if let Some(minify) = args.minify {
        options.minified = Minify::from(minify);
    }
    if let Some(maps) = &args.maps {
        options.maps = maps.clone();
    }
    options.nocache |= args.no_cache;
    options.nowrite |= args.dry;
    options
}

pub async fn run_transpile(args: &TranspileArgs, config: &AssetterConfig) -> Result<()> {
    let registry = Arc::new(config.build_registry()?);
    let transpiler = Transpiler::new(registry);
    let options = options_from_args(args, config);
    debug!("transpile"; "{:?}", options);

    let Some(result) = transpiler
        .transpile(&args.inputs, &options)
        .await
        .context("Transpile failed")?
    else {
        log!("skip"; "nothing to transpile");
        return Ok(());
    };

    if args.dry {
        let mut out = stdout().lock();
        writeln!(out, "{}", result.content)?;
        return Ok(());
    }

    log!("done"; "{}", result.filename.display());
    if let Some(MapPath::File(mappath)) = &result.mappath {
        log!("map"; "{}", mappath.display());
    }
    Ok(())
}
