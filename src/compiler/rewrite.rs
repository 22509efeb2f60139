//! Regex rewrite rules applied to compiled content.

use std::sync::Arc;

use regex::Regex;

use super::{CompiledUnit, PostProcess};

/// Replace every match of `pattern` with `replace` (`$1` style groups allowed).
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub pattern: Regex,
    pub replace: String,
}

impl RewriteRule {
    pub fn new(pattern: &str, replace: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replace: replace.into(),
        })
    }

    fn apply(&self, content: &str) -> String {
        self.pattern
            .replace_all(content, self.replace.as_str())
            .into_owned()
    }
}

/// Post-process running `rules` in order over the unit's content.
///
/// Rules are expected to keep line structure intact; the source map is not
/// adjusted.
pub fn rewrite_post_process(rules: Vec<RewriteRule>) -> PostProcess {
    Arc::new(move |unit: &mut CompiledUnit| {
        for rule in &rules {
            unit.content = rule.apply(&unit.content);
        }
    })
}
