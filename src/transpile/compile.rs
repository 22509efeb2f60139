//! Single-input compilation with cache lookup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::asset::{is_minified_name, output_path};
use crate::cache::CacheStore;
use crate::compiler::{CompiledUnit, CompilerDescriptor, CompilerRegistry};
use crate::utils::path::{absolutize, join_url, relative_to, to_slash};

use super::{TranspileError, TranspileOptions};

/// A compiled unit with the descriptor that produced it.
pub(super) struct Compiled {
    pub unit: CompiledUnit,
    pub descriptor: Arc<CompilerDescriptor>,
}

/// Runs inputs through their compilers for one transpile call.
pub(super) struct CompileEngine<'a> {
    registry: &'a CompilerRegistry,
    options: &'a TranspileOptions,
    cache: CacheStore,
    rootdir: PathBuf,
    outfile: Option<PathBuf>,
    minified: bool,
}

impl<'a> CompileEngine<'a> {
    pub fn new(registry: &'a CompilerRegistry, options: &'a TranspileOptions, minified: bool) -> Self {
        Self {
            registry,
            options,
            cache: CacheStore::new(&options.tmpdir),
            rootdir: absolutize(&options.rootdir),
            outfile: options.outfile.as_deref().map(absolutize),
            minified,
        }
    }

    pub fn options(&self) -> &TranspileOptions {
        self.options
    }

    pub fn minified(&self) -> bool {
        self.minified
    }

    pub fn outfile(&self) -> Option<&Path> {
        self.outfile.as_deref()
    }

    pub fn rootdir(&self) -> &Path {
        &self.rootdir
    }

    /// Compile `input`, or fetch it from the cache.
    ///
    /// `Ok(None)` means the input was skipped; the reason is logged.
    pub async fn compile_one(&self, input: &Path) -> Result<Option<Compiled>, TranspileError> {
        let log = &self.options.logger;
        let input = absolutize(input);
        let shown = input.display();

        if !self.options.allows(&input) {
            log.info("skip", &format!("{shown} (no match)"));
            return Ok(None);
        }
        let Some(descriptor) = self.registry.for_path(&input) else {
            log.info("skip", &format!("{shown} (not supported)"));
            return Ok(None);
        };
        if self.minified && is_minified_name(&input) {
            log.info("skip", &format!("{shown} (already minified)"));
            return Ok(None);
        }
        let outfile = self
            .outfile
            .clone()
            .unwrap_or_else(|| output_path(&input, &descriptor.extension, self.minified));
        if outfile == input {
            log.info("skip", &format!("{shown} (same file)"));
            return Ok(None);
        }

        let started = Instant::now();
        let elapsed = || started.elapsed().as_millis();

        if !self.options.nocache {
            match self.cache.load(&input, self.minified).await {
                Ok(Some(mut unit)) => {
                    // entries are keyed by input only
                    unit.filename = outfile;
                    self.stamp(&mut unit, &input);
                    log.info("cache", &format!("{shown} ({}ms)", elapsed()));
                    return Ok(Some(Compiled {
                        unit,
                        descriptor: Arc::clone(descriptor),
                    }));
                }
                Ok(None) => {}
                Err(err) => log.warn("cache", &format!("{shown}: {err}, recompiling")),
            }
        }

        let compile_options = self.options.compile_options(self.minified);
        let output = match descriptor.compiler.compile(&input, &compile_options).await {
            Ok(output) => output,
            Err(source) => {
                log.error("fail", &format!("{shown} ({}ms)", elapsed()));
                return Err(TranspileError::Compile {
                    path: input.clone(),
                    source,
                });
            }
        };

        let mut unit = CompiledUnit::new(outfile, output);
        self.stamp(&mut unit, &input);
        if let Some(post_process) = &descriptor.post_process {
            post_process(&mut unit);
        }

        self.cache
            .store(&input, self.minified, &unit)
            .await
            .map_err(|err| TranspileError::io(self.cache.entry_path(&input, self.minified), err))?;

        log.info("done", &format!("{shown} ({}ms)", elapsed()));
        Ok(Some(Compiled {
            unit,
            descriptor: Arc::clone(descriptor),
        }))
    }

    /// Point the map at the mounted output and source paths.
    fn stamp(&self, unit: &mut CompiledUnit, input: &Path) {
        let localdir = self.options.localdir.as_str();

        let file = relative_to(&self.rootdir, &unit.filename);
        unit.mapping.file = Some(join_url(&[localdir, &to_slash(&file)]));

        let source = relative_to(&self.rootdir, input);
        let source = if source.starts_with("..") {
            input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            join_url(&[localdir, &to_slash(&source)])
        };
        unit.mapping.sources = vec![source];
    }
}
