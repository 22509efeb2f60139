//! Alt-extension → compiler descriptor registry.
//!
//! The registry is filled during configuration and then shared read-only
//! (behind `Arc`) by every transpile call. Entries keep registration order,
//! which is also the order candidates are tried in when resolving requests.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = CompilerRegistry::with_defaults();
//! // `.txt` behaves like `.scss`, with an extra rewrite step
//! registry.register(".txt", DescriptorPatch::new().post_process(rules), Some(".scss"))?;
//! // shorthand: `.sass2` is a plain copy of `.sass`
//! registry.register(".sass2", ".sass", None)?;
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::{CompiledUnit, Compiler, ScriptCompiler, StyleCompiler};

/// In-place mutation applied to every freshly compiled unit.
pub type PostProcess = Arc<dyn Fn(&mut CompiledUnit) + Send + Sync>;

/// Registry misuse, reported at configuration time.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot register `{ext}`: `{base}` is not registered")]
    UnknownBase { ext: String, base: String },

    #[error("cannot register `{ext}`: no {field} given and nothing to inherit it from")]
    Incomplete { ext: String, field: &'static str },
}

// ============================================================================
// Descriptor
// ============================================================================

/// Shape of the comment that points an output at its source map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `/*# sourceMappingURL=... */` (stylesheets)
    Block,
    /// `//# sourceMappingURL=...` (scripts)
    Line,
}

impl CommentStyle {
    /// Build the comment, including its leading newline.
    pub fn render(self, url: &str) -> String {
        let url = url.replace('\\', "/");
        match self {
            Self::Block => format!("\n/*# sourceMappingURL={url} */"),
            Self::Line => format!("\n//# sourceMappingURL={url}"),
        }
    }

    /// Conventional style for an output extension.
    pub fn for_extension(ext: &str) -> Self {
        match ext {
            ".css" => Self::Block,
            _ => Self::Line,
        }
    }
}

/// Everything the pipeline knows about one alt extension.
#[derive(Clone)]
pub struct CompilerDescriptor {
    /// Canonical output extension, with leading dot (e.g. `.css`).
    pub extension: String,
    pub comment: CommentStyle,
    pub compiler: Arc<dyn Compiler>,
    pub post_process: Option<PostProcess>,
}

impl fmt::Debug for CompilerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerDescriptor")
            .field("extension", &self.extension)
            .field("comment", &self.comment)
            .field("compiler", &self.compiler.name())
            .field("post_process", &self.post_process.is_some())
            .finish()
    }
}

impl CompilerDescriptor {
    pub fn new(extension: &str, compiler: Arc<dyn Compiler>) -> Self {
        let extension = normalize_ext(extension);
        Self {
            comment: CommentStyle::for_extension(&extension),
            extension,
            compiler,
            post_process: None,
        }
    }

    /// Apply `patch` on top of a copy of this descriptor.
    fn merged(&self, patch: DescriptorPatch) -> Self {
        Self {
            extension: patch.extension.unwrap_or_else(|| self.extension.clone()),
            comment: patch.comment.unwrap_or(self.comment),
            compiler: patch.compiler.unwrap_or_else(|| Arc::clone(&self.compiler)),
            post_process: patch.post_process.or_else(|| self.post_process.clone()),
        }
    }
}

/// Partial descriptor: only the fields that are set override the base.
#[derive(Clone, Default)]
pub struct DescriptorPatch {
    pub extension: Option<String>,
    pub comment: Option<CommentStyle>,
    pub compiler: Option<Arc<dyn Compiler>>,
    pub post_process: Option<PostProcess>,
}

impl DescriptorPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extension(mut self, ext: &str) -> Self {
        self.extension = Some(normalize_ext(ext));
        self
    }

    pub fn comment(mut self, style: CommentStyle) -> Self {
        self.comment = Some(style);
        self
    }

    pub fn compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn post_process(mut self, callback: PostProcess) -> Self {
        self.post_process = Some(callback);
        self
    }

    /// Turn into a full descriptor when nothing is inherited.
    fn complete(self, ext: &str) -> Result<CompilerDescriptor, RegistryError> {
        let incomplete = |field| RegistryError::Incomplete {
            ext: ext.to_string(),
            field,
        };
        let extension = self.extension.ok_or_else(|| incomplete("extension"))?;
        let compiler = self.compiler.ok_or_else(|| incomplete("compiler"))?;
        Ok(CompilerDescriptor {
            comment: self
                .comment
                .unwrap_or_else(|| CommentStyle::for_extension(&extension)),
            extension,
            compiler,
            post_process: self.post_process,
        })
    }
}

/// What to register under an alt extension.
pub enum Registration {
    /// Copy every field from another registered extension.
    Alias(String),
    /// Override selected fields.
    Patch(DescriptorPatch),
    /// Replace the entry outright.
    Full(CompilerDescriptor),
}

impl From<&str> for Registration {
    fn from(base: &str) -> Self {
        Self::Alias(base.to_string())
    }
}

impl From<DescriptorPatch> for Registration {
    fn from(patch: DescriptorPatch) -> Self {
        Self::Patch(patch)
    }
}

impl From<CompilerDescriptor> for Registration {
    fn from(descriptor: CompilerDescriptor) -> Self {
        Self::Full(descriptor)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Ordered mapping from alt extension to descriptor.
#[derive(Debug, Clone, Default)]
pub struct CompilerRegistry {
    entries: Vec<(String, Arc<CompilerDescriptor>)>,
}

impl CompilerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in style and script compilers.
    pub fn with_defaults() -> Self {
        let style = Arc::new(CompilerDescriptor::new(".css", Arc::new(StyleCompiler)));
        let script = Arc::new(CompilerDescriptor::new(".js", Arc::new(ScriptCompiler)));

        let mut registry = Self::new();
        for ext in [".css", ".sass", ".scss"] {
            registry.insert(ext.to_string(), Arc::clone(&style));
        }
        for ext in [".js", ".es", ".es6"] {
            registry.insert(ext.to_string(), Arc::clone(&script));
        }
        registry
    }

    /// Register or override `alt_ext`.
    ///
    /// A [`Registration::Patch`] is merged over the entry of `copy_from`
    /// (default: `alt_ext` itself). With nothing to inherit from, the patch
    /// must carry at least an extension and a compiler.
    pub fn register(
        &mut self,
        alt_ext: &str,
        registration: impl Into<Registration>,
        copy_from: Option<&str>,
    ) -> Result<(), RegistryError> {
        let ext = normalize_ext(alt_ext);

        let descriptor = match registration.into() {
            Registration::Full(descriptor) => descriptor,
            Registration::Alias(base) => {
                let base = normalize_ext(&base);
                let found = self.get(&base).ok_or_else(|| RegistryError::UnknownBase {
                    ext: ext.clone(),
                    base: base.clone(),
                })?;
                CompilerDescriptor::clone(found)
            }
            Registration::Patch(patch) => {
                let base = copy_from.map_or_else(|| ext.clone(), normalize_ext);
                match self.get(&base) {
                    Some(found) => found.merged(patch),
                    None if copy_from.is_some() => {
                        return Err(RegistryError::UnknownBase { ext, base });
                    }
                    None => patch.complete(&ext)?,
                }
            }
        };

        self.insert(ext, Arc::new(descriptor));
        Ok(())
    }

    /// Descriptor for an alt extension (`.scss` or `scss`).
    pub fn get(&self, alt_ext: &str) -> Option<&Arc<CompilerDescriptor>> {
        let ext = normalize_ext(alt_ext);
        self.entries.iter().find(|(e, _)| *e == ext).map(|(_, d)| d)
    }

    /// Descriptor for the extension of `path`.
    pub fn for_path(&self, path: &Path) -> Option<&Arc<CompilerDescriptor>> {
        let ext = path.extension()?.to_str()?;
        self.get(ext)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<CompilerDescriptor>)> {
        self.entries.iter().map(|(e, d)| (e.as_str(), d))
    }

    /// Registered alt extensions, in registration order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(e, _)| e.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace in place (keeping position) or append.
    fn insert(&mut self, ext: String, descriptor: Arc<CompilerDescriptor>) {
        match self.entries.iter_mut().find(|(e, _)| *e == ext) {
            Some(slot) => slot.1 = descriptor,
            None => self.entries.push((ext, descriptor)),
        }
    }
}

/// Normalize an extension to `.ext` form.
pub fn normalize_ext(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}
