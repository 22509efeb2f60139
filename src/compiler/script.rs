//! Script compiler built on oxc.
//!
//! Parses the input as an ES module, lowers syntax the browserslist targets
//! lack, and regenerates it with a source map, minified and mangled when
//! requested. Every output starts with the [`MARKER`] statement on its own
//! line.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{EnvOptions, TransformOptions, Transformer};

use super::{CompileOptions, Compiler, CompilerOutput};
use crate::sourcemap::RegularMap;
use crate::utils::fs::read_file;

/// Statement prepended to every compiled script.
pub const MARKER: &str = "\"use transpile\";";

/// `.js` / `.es` / `.es6` → `.js`
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptCompiler;

#[async_trait]
impl Compiler for ScriptCompiler {
    fn name(&self) -> &str {
        "script"
    }

    async fn compile(&self, input: &Path, options: &CompileOptions) -> Result<CompilerOutput> {
        let source = read_file(input)
            .await
            .with_context(|| format!("Failed to read `{}`", input.display()))?;
        transform(input, &source, options.minified, options.browserslist.as_deref())
    }
}

/// Regenerate `source` and prefix it with [`MARKER`].
///
/// With a `browserslist` query, syntax unsupported by the matched browsers
/// is lowered (arrow functions become function expressions for `ie 11`).
fn transform(
    path: &Path,
    source: &str,
    minified: bool,
    browserslist: Option<&str>,
) -> Result<CompilerOutput> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        bail!("{}: {}", path.display(), join_errors(&ret.errors));
    }
    let mut program = ret.program;

    if let Some(query) = browserslist {
        let env = EnvOptions::from_browserslist_query(query)
            .map_err(|e| anyhow!("{}: browserslist `{query}`: {e}", path.display()))?;
        let options = TransformOptions {
            env,
            ..TransformOptions::default()
        };
        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();
        let ret = Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
        if !ret.errors.is_empty() {
            bail!("{}: {}", path.display(), join_errors(&ret.errors));
        }
    }

    let mut codegen = Codegen::new().with_options(CodegenOptions {
        minify: minified,
        comments: CommentOptions::disabled(),
        source_map_path: Some(path.to_path_buf()),
        ..CodegenOptions::default()
    });
    if minified {
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        codegen = codegen.with_scoping(ret.scoping);
    }

    let ret = codegen.build(&program);
    let map = ret
        .map
        .ok_or_else(|| anyhow!("{}: no source map generated", path.display()))?;
    let mut mapping: RegularMap = serde_json::from_str(&map.to_json_string())?;
    mapping.shift_lines(1);

    Ok(CompilerOutput {
        content: format!("{MARKER}\n{}", ret.code.trim_end()),
        mapping,
    })
}

fn join_errors<E: ToString>(errors: &[E]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_prefixes_marker() {
        let out = transform(Path::new("/app/a.es"), "const f = () => 123;\n", false, None).unwrap();
        let mut lines = out.content.lines();
        assert_eq!(lines.next(), Some(MARKER));
        assert!(lines.next().unwrap().contains("123"));
    }

    #[test]
    fn test_transform_shifts_mappings_past_marker() {
        let out = transform(Path::new("/app/a.es"), "let x = 1;\n", false, None).unwrap();
        assert!(out.mapping.mappings.starts_with(';'));
        assert_eq!(out.mapping.version, 3);
    }

    #[test]
    fn test_transform_minified_is_compact() {
        let source = "function add(first, second) {\n  return first + second;\n}\nexport { add };\n";
        let plain = transform(Path::new("/app/m.es"), source, false, None).unwrap();
        let mini = transform(Path::new("/app/m.es"), source, true, None).unwrap();
        assert!(mini.content.len() < plain.content.len());
        assert!(mini.content.starts_with(MARKER));
    }

    #[test]
    fn test_transform_reports_syntax_errors() {
        let err = transform(Path::new("/app/bad.es"), "let = ;", false, None).unwrap_err();
        assert!(err.to_string().contains("bad.es"));
    }

    #[test]
    fn test_transform_lowers_arrows_for_old_browsers() {
        let source = "export default () => 123;\n";
        let modern = transform(Path::new("/app/a.es"), source, false, None).unwrap();
        assert!(modern.content.contains("=>"));

        let legacy = transform(Path::new("/app/a.es"), source, false, Some("ie 11")).unwrap();
        assert!(legacy.content.starts_with(MARKER));
        assert!(!legacy.content.contains("=>"));
        assert!(legacy.content.contains("function"));
        assert!(legacy.content.contains("return 123"));
    }

    #[test]
    fn test_transform_keeps_arrows_for_modern_browsers() {
        let out = transform(
            Path::new("/app/a.es"),
            "export default () => 123;\n",
            false,
            Some("last 1 chrome version"),
        )
        .unwrap();
        assert!(out.content.contains("=>"));
    }

    #[test]
    fn test_transform_rejects_bad_query() {
        let err = transform(Path::new("/app/a.es"), "let x;", false, Some("unknownbrowser 1")).unwrap_err();
        assert!(err.to_string().contains("browserslist"));
    }
}
