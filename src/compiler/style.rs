//! Stylesheet compiler built on grass and lightningcss.
//!
//! Sass (indented syntax for `.sass`, SCSS otherwise; plain CSS is valid
//! SCSS) is compiled by grass, then printed by lightningcss, which adds the
//! vendor prefixes the browserslist targets need, minifies and produces the
//! source map. The map describes the printed
//! output against the CSS grass emitted, and that CSS is attached as
//! `sourcesContent`.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use grass::{InputSyntax, OutputStyle};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use super::{CompileOptions, Compiler, CompilerOutput};
use crate::sourcemap::RegularMap;
use crate::utils::fs::read_file;

/// `.css` / `.sass` / `.scss` → `.css`
///
/// Map positions refer to the CSS grass emitted, not to the Sass source,
/// even though `sources` names the `.scss`/`.sass` input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StyleCompiler;

#[async_trait]
impl Compiler for StyleCompiler {
    fn name(&self) -> &str {
        "style"
    }

    async fn compile(&self, input: &Path, options: &CompileOptions) -> Result<CompilerOutput> {
        let source = read_file(input)
            .await
            .with_context(|| format!("Failed to read `{}`", input.display()))?;
        let css = compile_sass(input, &source)?;
        print_css(input, &css, options.minified, options.browserslist.as_deref())
    }
}

/// Compile Sass/SCSS to expanded CSS; imports resolve next to `path`.
fn compile_sass(path: &Path, source: &str) -> Result<String> {
    let syntax = match path.extension().and_then(|e| e.to_str()) {
        Some("sass") => InputSyntax::Sass,
        _ => InputSyntax::Scss,
    };
    let mut options = grass::Options::default()
        .style(OutputStyle::Expanded)
        .input_syntax(syntax);
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }

    grass::from_string(source.to_owned(), &options)
        .map_err(|e| anyhow!("{}: {e}", path.display()))
}

/// Lightningcss targets for a browserslist query.
fn targets_for(path: &Path, browserslist: Option<&str>) -> Result<Targets> {
    let Some(query) = browserslist else {
        return Ok(Targets::default());
    };
    let browsers = Browsers::from_browserslist([query])
        .map_err(|e| anyhow!("{}: browserslist `{query}`: {e}", path.display()))?;
    Ok(browsers.map(Targets::from).unwrap_or_default())
}

/// Print `css` through lightningcss, collecting a source map.
fn print_css(
    path: &Path,
    css: &str,
    minified: bool,
    browserslist: Option<&str>,
) -> Result<CompilerOutput> {
    let targets = targets_for(path, browserslist)?;
    let filename = path.to_string_lossy().into_owned();
    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.clone(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{}: {e}", path.display()))?;

    if minified || targets.browsers.is_some() {
        stylesheet
            .minify(MinifyOptions {
                targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| anyhow!("{}: {e}", path.display()))?;
    }

    let mut source_map = parcel_sourcemap::SourceMap::new("/");
    source_map.add_source(&filename);
    source_map
        .set_source_content(0, css)
        .map_err(|e| anyhow!("{}: {e:?}", path.display()))?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: minified,
            source_map: Some(&mut source_map),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{}: {e}", path.display()))?;

    let json = source_map
        .to_json(None)
        .map_err(|e| anyhow!("{}: {e:?}", path.display()))?;
    let mapping: RegularMap = serde_json::from_str(&json)?;

    Ok(CompilerOutput {
        content: printed.code,
        mapping,
    })
}
