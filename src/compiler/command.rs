//! External command compiler.
//!
//! Runs a configured tool once per input inside a scratch directory. The
//! argv may reference `$ASSETTER_*` variables, which are substituted in the
//! arguments and also exported to the child's environment:
//!
//! | Variable                | Value                                  |
//! |-------------------------|----------------------------------------|
//! | `ASSETTER_INPUT`        | absolute input path                    |
//! | `ASSETTER_OUTPUT`       | where the tool should write its output |
//! | `ASSETTER_MAP`          | where the tool may write a source map  |
//! | `ASSETTER_MINIFY`       | `true` / `false`                       |
//! | `ASSETTER_BROWSERSLIST` | browser query, empty when unset        |
//!
//! If the tool writes nothing to `$ASSETTER_OUTPUT`, its stdout is used.
//! Without a map file the unit gets an empty map over the input.
//!
//! # Example
//!
//! ```toml
//! [[compilers]]
//! ext = ".styl"
//! extension = ".css"
//! command = ["stylus", "--sourcemap", "--out", "$ASSETTER_OUTPUT", "$ASSETTER_INPUT"]
//! ```

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use rustc_hash::FxHashMap;

use super::{CompileOptions, Compiler, CompilerOutput};
use crate::sourcemap::RegularMap;
use crate::utils::fs::read_file;

/// Compiler backed by an external program.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    name: String,
    command: Vec<String>,
    extension: String,
}

impl CommandCompiler {
    /// `command` is the argv; `extension` the output extension it produces.
    pub fn new(command: Vec<String>, extension: &str) -> Self {
        let name = command.first().cloned().unwrap_or_default();
        Self {
            name,
            command,
            extension: super::normalize_ext(extension),
        }
    }

    /// Build the `ASSETTER_*` variables for one run.
    fn vars(
        &self,
        input: &Path,
        scratch: &Path,
        options: &CompileOptions,
    ) -> FxHashMap<String, String> {
        let output = scratch.join(format!("output{}", self.extension));
        let map = scratch.join(format!("output{}.map", self.extension));

        let mut vars = FxHashMap::default();
        vars.insert("ASSETTER_INPUT".into(), input.display().to_string());
        vars.insert("ASSETTER_OUTPUT".into(), output.display().to_string());
        vars.insert("ASSETTER_MAP".into(), map.display().to_string());
        vars.insert("ASSETTER_MINIFY".into(), options.minified.to_string());
        vars.insert(
            "ASSETTER_BROWSERSLIST".into(),
            options.browserslist.clone().unwrap_or_default(),
        );
        vars
    }
}

#[async_trait]
impl Compiler for CommandCompiler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn compile(&self, input: &Path, options: &CompileOptions) -> Result<CompilerOutput> {
        if self.command.is_empty() {
            bail!("compiler for `{}` has an empty command", self.extension);
        }

        tokio::fs::create_dir_all(&options.tmpdir).await?;
        let scratch = tempfile::Builder::new()
            .prefix("assetter-")
            .tempdir_in(&options.tmpdir)
            .context("Failed to create scratch directory")?;

        let vars = self.vars(input, scratch.path(), options);
        let args = resolve_args(&self.command, &vars);

        let mut cmd = tokio::process::Command::new(&args[0]);
        cmd.args(&args[1..]).envs(&vars).kill_on_drop(true);
        if let Some(dir) = input.parent() {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to execute `{}`", self.name))?;
        if !output.status.success() {
            bail!(format_error(&self.name, &output));
        }

        let output_path = Path::new(&vars["ASSETTER_OUTPUT"]);
        let content = if output_path.exists() {
            read_file(output_path).await?
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };

        let map_path = Path::new(&vars["ASSETTER_MAP"]);
        let mapping = if map_path.exists() {
            let json = read_file(map_path).await?;
            serde_json::from_str(&json)
                .with_context(|| format!("`{}` wrote an invalid source map", self.name))?
        } else {
            let source = read_file(input).await.ok();
            RegularMap::empty(input.display().to_string(), source)
        };

        Ok(CompilerOutput { content, mapping })
    }
}

/// Resolve `$ASSETTER_*` variables in command arguments
///
/// Replaces occurrences of `$KEY` with actual values from the vars map
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for (key, value) in vars {
                let pattern = format!("${key}");
                result = result.replace(&pattern, value);
            }
            result
        })
        .collect()
}

/// Error message for a failed run: exit status plus trimmed stderr.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("`{name}` failed with {}", output.status)
    } else {
        format!("`{name}` failed with {}:\n{stderr}", output.status)
    }
}
