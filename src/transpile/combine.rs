//! Concurrent compilation and concatenation of several inputs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;

use crate::asset::{combine_name, extension_of};
use crate::compiler::CompilerDescriptor;
use crate::sourcemap::{SourceMap, sectioned};

use super::compile::{Compiled, CompileEngine};
use super::{CombinedResult, TranspileError};

/// Fallback base name when no combined name can be derived.
const COMBINED: &str = "combined";

/// Compile `inputs` concurrently and merge the survivors in input order.
///
/// The first failure aborts the remaining compiles. Returns the merged
/// result together with the first unit's descriptor.
pub(super) async fn combine<P: AsRef<Path>>(
    engine: &CompileEngine<'_>,
    inputs: &[P],
) -> Result<Option<(CombinedResult, Arc<CompilerDescriptor>)>, TranspileError> {
    let compiled = try_join_all(inputs.iter().map(|input| engine.compile_one(input.as_ref()))).await?;
    let mut compiled: Vec<Compiled> = compiled.into_iter().flatten().collect();

    if compiled.len() <= 1 {
        return Ok(compiled.pop().map(|Compiled { unit, descriptor }| {
            let result = CombinedResult {
                filename: unit.filename,
                content: unit.content,
                mapping: SourceMap::Regular(unit.mapping),
                mappath: None,
            };
            (result, descriptor)
        }));
    }

    let filenames: Vec<&Path> = compiled.iter().map(|c| c.unit.filename.as_path()).collect();
    let filename = match engine.outfile() {
        Some(outfile) => outfile.to_path_buf(),
        None => default_filename(&filenames),
    };

    let content = compiled
        .iter()
        .map(|c| c.unit.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let mapping = sectioned(
        compiled
            .iter()
            .map(|c| (c.unit.content.as_str(), &c.unit.mapping)),
    );

    let descriptor = Arc::clone(&compiled[0].descriptor);
    let result = CombinedResult {
        filename,
        content,
        mapping: SourceMap::Sectioned(mapping),
        mappath: None,
    };
    Ok(Some((result, descriptor)))
}

/// `dir/a,b.ext` from the unit filenames, else `dir/combined.ext`.
fn default_filename(filenames: &[&Path]) -> PathBuf {
    combine_name(filenames).unwrap_or_else(|| {
        let first = filenames.first().copied().unwrap_or(Path::new(""));
        let ext = extension_of(first).unwrap_or_default();
        first.with_file_name(format!("{COMBINED}{ext}"))
    })
}
