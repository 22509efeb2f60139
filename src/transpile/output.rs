//! Map placement and output persistence.
//!
//! | Policy       | Comment URL                      | Map file                         |
//! |--------------|----------------------------------|----------------------------------|
//! | `Inline`     | `data:application/json;...`      | none                             |
//! | `Suppressed` | none                             | none                             |
//! | `Sibling`    | `<rel>/<name>.map`               | `<dir>/<rel>/<name>.map`         |
//! | `Aliases`    | `<prefix>/<localdir>/<path>.map` | `<alias dir>/<localdir>/<path>.map` |

use std::path::{Path, PathBuf};

use futures::future::try_join_all;

use crate::compiler::CommentStyle;
use crate::sourcemap::SourceMap;
use crate::utils::fs::put_file;
use crate::utils::path::{join_url, lexical_clean, relative_to, to_slash};

use super::compile::CompileEngine;
use super::{MapPolicy, TranspileError};

/// Where the map of a result ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapPath {
    /// The `data:` URI embedded in the content.
    Inline(String),
    /// Map file on disk (the last one for alias sets).
    File(PathBuf),
}

/// Final output of a transpile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedResult {
    pub filename: PathBuf,
    /// Content including the map comment, as written.
    pub content: String,
    pub mapping: SourceMap,
    /// `None` when maps are suppressed.
    pub mappath: Option<MapPath>,
}

/// Apply the map policy to `result` and persist it unless `nowrite` is set.
pub(super) async fn write_output(
    result: &mut CombinedResult,
    comment: CommentStyle,
    engine: &CompileEngine<'_>,
) -> Result<(), TranspileError> {
    let options = engine.options();
    let encode_err = |source| TranspileError::Map {
        path: result.filename.clone(),
        source,
    };

    let mut writes: Vec<(PathBuf, String)> = Vec::new();

    match &options.maps {
        MapPolicy::Inline => {
            let uri = result.mapping.to_data_uri().map_err(encode_err)?;
            result.content.push_str(&comment.render(&uri));
            result.mappath = Some(MapPath::Inline(uri));
        }
        MapPolicy::Suppressed => {
            result.mappath = None;
        }
        MapPolicy::Sibling(rel) => {
            let json = result.mapping.to_json(!engine.minified()).map_err(encode_err)?;
            let url = join_url(&[rel, &format!("{}.map", basename(&result.filename))]);
            let dir = result.filename.parent().unwrap_or(Path::new(""));
            let mappath = lexical_clean(&dir.join(url.trim_start_matches('/')));

            result.content.push_str(&comment.render(&url));
            writes.push((mappath.clone(), json));
            result.mappath = Some(MapPath::File(mappath));
        }
        MapPolicy::Aliases(aliases) => {
            let json = result.mapping.to_json(!engine.minified()).map_err(encode_err)?;
            let relative = relative_to(engine.rootdir(), &result.filename);
            let localname = join_url(&[&options.localdir, &to_slash(&relative)]);
            let mapname = format!("{localname}.map");

            for alias in aliases {
                let url = join_url(&[&alias.url_prefix, &mapname]);
                let mappath = lexical_clean(&alias.dir.join(mapname.trim_start_matches('/')));

                result.content.push_str(&comment.render(&url));
                writes.push((mappath.clone(), json.clone()));
                result.mappath = Some(MapPath::File(mappath));
            }
        }
    }
    writes.insert(0, (result.filename.clone(), result.content.clone()));

    if options.nowrite {
        return Ok(());
    }

    let log = &options.logger;
    try_join_all(writes.iter().map(|(path, content)| async move {
        put_file(path, content)
            .await
            .map_err(|err| TranspileError::io(path, err))?;
        log.info("write", &path.display().to_string());
        Ok::<_, TranspileError>(())
    }))
    .await?;
    Ok(())
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
