//! `[[compilers]]` section configuration.
//!
//! Each entry registers (or overrides) one alt extension. Unset fields are
//! inherited from `copy_from`, or from the extension's current entry.
//!
//! # Example
//!
//! ```toml
//! # .txt compiles like .scss, then gets rewritten
//! [[compilers]]
//! ext = ".txt"
//! copy_from = ".scss"
//! rewrite = [{ pattern = "body", replace = "BODY" }]
//!
//! # external tool
//! [[compilers]]
//! ext = ".styl"
//! extension = ".css"
//! command = ["stylus", "--out", "$ASSETTER_OUTPUT", "$ASSETTER_INPUT"]
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compiler::{
    CommandCompiler, CommentStyle, CompilerRegistry, DescriptorPatch, RewriteRule, normalize_ext,
    rewrite_post_process,
};
use crate::config::{ConfigDiagnostics, ConfigError, FieldPath};

const TABLE: &str = "compilers";

/// Package runners that may fetch the tool on first use.
const PACKAGE_RUNNERS: [&str; 5] = ["npx", "bunx", "pnpx", "yarn", "dlx"];

/// Map-reference comment shape as written in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    Block,
    Line,
}

impl From<CommentKind> for CommentStyle {
    fn from(kind: CommentKind) -> Self {
        match kind {
            CommentKind::Block => Self::Block,
            CommentKind::Line => Self::Line,
        }
    }
}

/// One regex rewrite applied after compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSection {
    pub pattern: String,
    #[serde(default)]
    pub replace: String,
}

/// One `[[compilers]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSection {
    /// Alt extension to register.
    pub ext: String,
    /// Registered extension to inherit unset fields from.
    pub copy_from: Option<String>,
    /// Canonical output extension.
    pub extension: Option<String>,
    pub comment: Option<CommentKind>,
    /// External tool argv.
    pub command: Option<Vec<String>>,
    pub rewrite: Vec<RewriteSection>,
}

impl CompilerSection {
    fn field(index: usize, name: &str) -> FieldPath {
        FieldPath::indexed(TABLE, index, name)
    }

    /// Entry the unset fields come from.
    fn base(&self) -> String {
        normalize_ext(self.copy_from.as_deref().unwrap_or(self.ext.as_str()))
    }

    /// Output extension: explicit, or inherited from the base entry.
    fn output_extension(&self, registry: &CompilerRegistry) -> Option<String> {
        self.extension
            .as_deref()
            .map(normalize_ext)
            .or_else(|| registry.get(&self.base()).map(|d| d.extension.clone()))
    }

    /// Check the entry against the registry as built so far.
    pub fn validate(&self, index: usize, registry: &CompilerRegistry, diag: &mut ConfigDiagnostics) {
        if self.ext.trim_start_matches('.').is_empty() {
            diag.error(Self::field(index, "ext"), "alt extension must not be empty");
            return;
        }

        if let Some(base) = &self.copy_from
            && registry.get(base).is_none()
        {
            diag.error_with_hint(
                Self::field(index, "copy_from"),
                format!("`{base}` is not registered"),
                "register it in an earlier [[compilers]] entry",
            );
        }

        let inherits = registry.get(&self.base()).is_some();
        if !inherits && self.command.is_none() {
            diag.error(
                Self::field(index, "command"),
                format!("`{}` is new and needs a command", self.ext),
            );
        }
        if self.output_extension(registry).is_none() {
            diag.error(
                Self::field(index, "extension"),
                format!("`{}` has no output extension to inherit", self.ext),
            );
        }

        if let Some(command) = &self.command {
            self.validate_command(index, command, diag);
        }

        for rule in &self.rewrite {
            if let Err(err) = regex::Regex::new(&rule.pattern) {
                diag.error(
                    Self::field(index, "rewrite"),
                    format!("invalid pattern `{}`: {err}", rule.pattern),
                );
            }
        }
    }

    fn validate_command(&self, index: usize, command: &[String], diag: &mut ConfigDiagnostics) {
        let field = Self::field(index, "command");
        let Some(cmd) = command.first() else {
            diag.error(field, "command is empty");
            return;
        };

        if which::which(cmd).is_ok() {
            return;
        }
        if PACKAGE_RUNNERS.contains(&cmd.as_str()) {
            if let Some(package) = command.get(1) {
                diag.hint(field, format!("`{package}` via `{cmd}`, ensure the package is installed"));
            }
        } else {
            diag.error_with_hint(
                field,
                format!("`{cmd}` not found"),
                format!("install the command or update {}", Self::field(index, "command")),
            );
        }
    }

    /// Register this entry into `registry`.
    pub fn apply(&self, registry: &mut CompilerRegistry) -> Result<(), ConfigError> {
        let mut patch = DescriptorPatch::new();
        if let Some(ext) = &self.extension {
            patch = patch.extension(ext);
        }
        if let Some(kind) = self.comment {
            patch = patch.comment(kind.into());
        }
        if let Some(command) = &self.command {
            let ext = self.output_extension(registry).unwrap_or_default();
            patch = patch.compiler(Arc::new(CommandCompiler::new(command.clone(), &ext)));
        }
        if !self.rewrite.is_empty() {
            let rules = self
                .rewrite
                .iter()
                .filter_map(|r| RewriteRule::new(&r.pattern, r.replace.as_str()).ok())
                .collect();
            patch = patch.post_process(rewrite_post_process(rules));
        }

        registry.register(&self.ext, patch, self.copy_from.as_deref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn validate(entries: &[CompilerSection]) -> ConfigDiagnostics {
        let mut registry = CompilerRegistry::with_defaults();
        let mut diag = ConfigDiagnostics::new();
        for (i, entry) in entries.iter().enumerate() {
            entry.validate(i, &registry, &mut diag);
            if !diag.has_errors() {
                entry.apply(&mut registry).unwrap();
            }
        }
        diag
    }

    #[test]
    fn test_parse_compilers() {
        let config = test_parse_config(
            r#"
[[compilers]]
ext = ".txt"
copy_from = ".scss"
comment = "line"
rewrite = [{ pattern = "body", replace = "BODY" }]
"#,
        );
        let entry = &config.compilers[0];
        assert_eq!(entry.ext, ".txt");
        assert_eq!(entry.copy_from.as_deref(), Some(".scss"));
        assert_eq!(entry.comment, Some(CommentKind::Line));
        assert_eq!(entry.rewrite[0].replace, "BODY");
    }

    #[test]
    fn test_apply_copy_with_override() {
        let mut registry = CompilerRegistry::with_defaults();
        let entry = CompilerSection {
            ext: "txt".into(),
            copy_from: Some(".scss".into()),
            rewrite: vec![RewriteSection {
                pattern: "a".into(),
                replace: "b".into(),
            }],
            ..Default::default()
        };
        entry.apply(&mut registry).unwrap();

        let txt = registry.get(".txt").unwrap();
        assert_eq!(txt.extension, ".css");
        assert_eq!(txt.compiler.name(), "style");
        assert!(txt.post_process.is_some());
    }

    #[test]
    fn test_apply_command_inherits_extension() {
        let mut registry = CompilerRegistry::with_defaults();
        let entry = CompilerSection {
            ext: ".es6".into(),
            command: Some(vec!["cat".into(), "$ASSETTER_INPUT".into()]),
            ..Default::default()
        };
        entry.apply(&mut registry).unwrap();

        let es6 = registry.get(".es6").unwrap();
        assert_eq!(es6.extension, ".js");
        assert_eq!(es6.compiler.name(), "cat");
    }

    #[test]
    fn test_validate_unknown_copy_from() {
        let diag = validate(&[CompilerSection {
            ext: ".txt".into(),
            copy_from: Some(".less".into()),
            ..Default::default()
        }]);
        assert!(diag.errors().any(|d| d.field.as_str() == "compilers[0].copy_from"));
    }

    #[test]
    fn test_validate_new_extension_needs_command_and_extension() {
        let diag = validate(&[CompilerSection {
            ext: ".styl".into(),
            ..Default::default()
        }]);
        let fields: Vec<_> = diag.errors().map(|d| d.field.as_str()).collect();
        assert!(fields.contains(&"compilers[0].command"));
        assert!(fields.contains(&"compilers[0].extension"));
    }

    #[test]
    fn test_validate_empty_and_missing_command() {
        let diag = validate(&[CompilerSection {
            ext: ".styl".into(),
            extension: Some(".css".into()),
            command: Some(vec![]),
            ..Default::default()
        }]);
        assert_eq!(diag.errors().next().unwrap().message, "command is empty");

        let diag = validate(&[CompilerSection {
            ext: ".styl".into(),
            extension: Some(".css".into()),
            command: Some(vec!["definitely-not-installed-assetter-tool".into()]),
            ..Default::default()
        }]);
        assert!(diag.errors().next().unwrap().hint.is_some());
    }

    #[test]
    fn test_validate_invalid_regex() {
        let diag = validate(&[CompilerSection {
            ext: ".txt".into(),
            copy_from: Some(".css".into()),
            rewrite: vec![RewriteSection {
                pattern: "(".into(),
                replace: String::new(),
            }],
            ..Default::default()
        }]);
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn test_validate_sees_earlier_entries() {
        let diag = validate(&[
            CompilerSection {
                ext: ".txt".into(),
                copy_from: Some(".scss".into()),
                ..Default::default()
            },
            CompilerSection {
                ext: ".text".into(),
                copy_from: Some(".txt".into()),
                ..Default::default()
            },
        ]);
        assert!(!diag.has_errors());
    }
}
