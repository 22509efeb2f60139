//! The transpile pipeline.
//!
//! ```text
//! inputs ─┬─ compile_one ─┐ (cache check → compile → stamp → cache store)
//!         ├─ compile_one ─┤
//!         └─ compile_one ─┴─ combine ─ write_output ─ CombinedResult
//! ```
//!
//! Skipped inputs are logged and dropped; the first compile failure aborts
//! the whole call.

mod combine;
mod compile;
mod error;
mod options;
mod output;

pub use error::TranspileError;
pub use options::{MapAlias, MapPolicy, Minify, TranspileOptions};
pub use output::{CombinedResult, MapPath};

use std::path::Path;
use std::sync::Arc;

use crate::compiler::CompilerRegistry;

use compile::CompileEngine;

/// Entry point of the pipeline, sharing one immutable registry.
#[derive(Debug, Clone)]
pub struct Transpiler {
    registry: Arc<CompilerRegistry>,
}

impl Transpiler {
    pub fn new(registry: Arc<CompilerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CompilerRegistry> {
        &self.registry
    }

    /// Compile, combine and write `inputs`.
    ///
    /// Returns `Ok(None)` when every input was skipped.
    pub async fn transpile<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        options: &TranspileOptions,
    ) -> Result<Option<CombinedResult>, TranspileError> {
        let minified = options.minified.resolve(options.outfile.as_deref());
        let engine = CompileEngine::new(&self.registry, options, minified);

        let Some((mut result, first)) = combine::combine(&engine, inputs).await? else {
            return Ok(None);
        };

        let comment = self
            .registry
            .for_path(&result.filename)
            .map_or(first.comment, |desc| desc.comment);
        output::write_output(&mut result, comment, &engine).await?;
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{
        CompileOptions, Compiler, CompilerOutput, DescriptorPatch, MARKER, RewriteRule,
        rewrite_post_process,
    };
    use crate::logger::MemoryLog;
    use crate::sourcemap::{Offset, RegularMap, SourceMap};
    use async_trait::async_trait;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// Uppercases its input and counts invocations.
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Compiler for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn compile(
            &self,
            input: &Path,
            _options: &CompileOptions,
        ) -> anyhow::Result<CompilerOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let source = tokio::fs::read_to_string(input).await?;
            if source.contains("error") {
                anyhow::bail!("syntax error");
            }
            Ok(CompilerOutput {
                content: source.to_uppercase(),
                mapping: RegularMap::empty("in", None),
            })
        }
    }

    struct Fixture {
        dir: TempDir,
        compiler: Arc<Counting>,
        transpiler: Transpiler,
        log: Arc<MemoryLog>,
    }

    impl Fixture {
        /// `.up` → `.txt` through the counting compiler.
        fn new() -> Self {
            let compiler = Arc::new(Counting::default());
            let mut registry = CompilerRegistry::with_defaults();
            registry
                .register(
                    ".up",
                    DescriptorPatch::new()
                        .extension(".txt")
                        .compiler(Arc::clone(&compiler) as Arc<dyn Compiler>),
                    None,
                )
                .unwrap();
            Self {
                dir: TempDir::new().unwrap(),
                compiler,
                transpiler: Transpiler::new(Arc::new(registry)),
                log: Arc::new(MemoryLog::new()),
            }
        }

        fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }

        fn options(&self) -> TranspileOptions {
            TranspileOptions {
                rootdir: self.dir.path().to_path_buf(),
                localdir: "/assets".to_string(),
                tmpdir: self.dir.path().join("tmp"),
                logger: Arc::clone(&self.log) as _,
                ..TranspileOptions::default()
            }
        }

        fn calls(&self) -> usize {
            self.compiler.calls.load(Ordering::SeqCst)
        }
    }

    fn backdate(path: &Path) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(60))
            .unwrap();
    }

    #[tokio::test]
    async fn test_cache_idempotence() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "hello");
        backdate(&input);
        let options = TranspileOptions {
            nowrite: true,
            ..fx.options()
        };

        let first = fx.transpiler.transpile(&[&input], &options).await.unwrap();
        let second = fx.transpiler.transpile(&[&input], &options).await.unwrap();

        assert_eq!(fx.calls(), 1);
        assert_eq!(first, second);
        assert!(fx.log.contains("done"));
        assert!(fx.log.contains("cache"));
    }

    #[tokio::test]
    async fn test_cache_hit_follows_current_outfile() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "hello");
        backdate(&input);
        let build = fx.dir.path().join("build/a.txt");
        let dist = fx.dir.path().join("dist/a.txt");

        let first = TranspileOptions {
            outfile: Some(build.clone()),
            ..fx.options()
        };
        fx.transpiler.transpile(&[&input], &first).await.unwrap().unwrap();

        let second = TranspileOptions {
            outfile: Some(dist.clone()),
            ..fx.options()
        };
        let result = fx.transpiler.transpile(&[&input], &second).await.unwrap().unwrap();

        assert_eq!(fx.calls(), 1);
        assert_eq!(result.filename, dist);
        assert_eq!(
            result.mapping.as_regular().unwrap().file.as_deref(),
            Some("/assets/dist/a.txt")
        );
        assert!(fs::read_to_string(&dist).unwrap().starts_with("HELLO"));
        assert!(dist.with_file_name("a.txt.map").exists());
    }

    #[tokio::test]
    async fn test_cache_invalidated_by_newer_input() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "old");
        backdate(&input);
        let options = fx.options();

        fx.transpiler.transpile(&[&input], &options).await.unwrap();
        let cache = crate::cache::CacheStore::new(&options.tmpdir);
        let entry = cache.entry_path(&input, false);
        backdate(&entry);
        fs::write(&input, "new").unwrap();

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        assert_eq!(fx.calls(), 2);
        assert!(result.content.starts_with("NEW"));
    }

    #[tokio::test]
    async fn test_nocache_always_compiles() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        backdate(&input);
        let options = TranspileOptions {
            nocache: true,
            ..fx.options()
        };

        fx.transpiler.transpile(&[&input], &options).await.unwrap();
        fx.transpiler.transpile(&[&input], &options).await.unwrap();
        assert_eq!(fx.calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_a_miss() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        backdate(&input);
        let options = fx.options();
        let entry = crate::cache::CacheStore::new(&options.tmpdir).entry_path(&input, false);
        fs::create_dir_all(entry.parent().unwrap()).unwrap();
        fs::write(&entry, "not json").unwrap();

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap();
        assert!(result.is_some());
        assert_eq!(fx.calls(), 1);
        assert!(fx.log.lines().iter().any(|l| l.starts_with("cache") && l.contains("recompiling")));
        // entry was rewritten
        assert!(serde_json::from_str::<serde_json::Value>(&fs::read_to_string(&entry).unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_skip_reasons() {
        let fx = Fixture::new();
        let txt = fx.write("notes.md", "x");
        let same = fx.write("same.up", "x");
        let min = fx.write("lib.min.up", "x");

        let none = fx.transpiler.transpile(&[&txt], &fx.options()).await.unwrap();
        assert!(none.is_none());

        let options = TranspileOptions {
            outfile: Some(same.clone()),
            ..fx.options()
        };
        assert!(fx.transpiler.transpile(&[&same], &options).await.unwrap().is_none());

        let options = TranspileOptions {
            minified: Minify::On,
            ..fx.options()
        };
        assert!(fx.transpiler.transpile(&[&min], &options).await.unwrap().is_none());

        let options = TranspileOptions {
            patterns: vec![glob::Pattern::new("**/*.never").unwrap()],
            ..fx.options()
        };
        assert!(fx.transpiler.transpile(&[&same], &options).await.unwrap().is_none());

        assert_eq!(fx.calls(), 0);
        let lines = fx.log.lines();
        for reason in ["(not supported)", "(same file)", "(already minified)", "(no match)"] {
            assert!(lines.iter().any(|l| l.ends_with(reason)), "missing {reason}");
        }
    }

    #[tokio::test]
    async fn test_compile_failure_propagates() {
        let fx = Fixture::new();
        let good = fx.write("good.up", "fine");
        let bad = fx.write("bad.up", "error here");

        let err = fx
            .transpiler
            .transpile(&[&good, &bad], &fx.options())
            .await
            .unwrap_err();
        assert!(matches!(err, TranspileError::Compile { .. }));
        assert_eq!(err.path(), bad.as_path());
        assert!(fx.log.contains("fail"));
        assert!(!fx.dir.path().join("good,bad.txt").exists());
    }

    #[tokio::test]
    async fn test_stamps_mounted_paths() {
        let fx = Fixture::new();
        fs::create_dir(fx.dir.path().join("sub")).unwrap();
        let input = fx.write("sub/a.up", "x");

        let result = fx.transpiler.transpile(&[&input], &fx.options()).await.unwrap().unwrap();
        let map = result.mapping.as_regular().unwrap();
        assert_eq!(map.file.as_deref(), Some("/assets/sub/a.txt"));
        assert_eq!(map.sources, vec!["/assets/sub/a.up"]);
    }

    #[tokio::test]
    async fn test_source_outside_rootdir_uses_basename() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        let options = TranspileOptions {
            rootdir: fx.dir.path().join("public"),
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        assert_eq!(result.mapping.as_regular().unwrap().sources, vec!["a.up"]);
    }

    #[tokio::test]
    async fn test_combine_sections_and_offsets() {
        let fx = Fixture::new();
        let t1 = fx.write("t1.up", "one\ntwo");
        let t2 = fx.write("t2.up", "three");
        let t3 = fx.write("t3.up", "four");

        let result = fx
            .transpiler
            .transpile(&[&t1, &t2, &t3], &fx.options())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.filename, fx.dir.path().join("t1,t2,t3.txt"));
        assert!(result.content.starts_with("ONE\nTWO\nTHREE\nFOUR\n"));

        let sections = &result.mapping.as_sectioned().unwrap().sections;
        let offsets: Vec<Offset> = sections.iter().map(|s| s.offset).collect();
        assert_eq!(
            offsets,
            vec![
                Offset { line: 0, column: 0 },
                Offset { line: 2, column: 0 },
                Offset { line: 3, column: 0 },
            ]
        );
        assert_eq!(sections[1].map.sources, vec!["/assets/t2.up"]);
    }

    #[tokio::test]
    async fn test_combine_drops_skipped_inputs() {
        let fx = Fixture::new();
        let a = fx.write("a.up", "a");
        let skipped = fx.write("b.md", "b");

        let result = fx
            .transpiler
            .transpile(&[&a, &skipped], &fx.options())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.filename, fx.dir.path().join("a.txt"));
        assert!(result.mapping.as_regular().is_some());
    }

    #[tokio::test]
    async fn test_map_policy_inline() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        let options = TranspileOptions {
            maps: MapPolicy::Inline,
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        let Some(MapPath::Inline(uri)) = &result.mappath else {
            panic!("expected inline map, got {:?}", result.mappath);
        };
        assert_eq!(SourceMap::from_data_uri(uri).as_ref(), Some(&result.mapping));
        assert!(result.content.ends_with(&format!("\n//# sourceMappingURL={uri}")));
        assert_eq!(fs::read_to_string(&result.filename).unwrap(), result.content);
        assert!(!fx.dir.path().join("a.txt.map").exists());
    }

    #[tokio::test]
    async fn test_map_policy_suppressed() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        let options = TranspileOptions {
            maps: MapPolicy::Suppressed,
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        assert_eq!(result.content, "X");
        assert_eq!(result.mappath, None);
        assert_eq!(fs::read_to_string(&result.filename).unwrap(), "X");
    }

    #[tokio::test]
    async fn test_map_policy_sibling() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        let options = TranspileOptions {
            maps: MapPolicy::Sibling("maps".to_string()),
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        let mappath = fx.dir.path().join("maps/a.txt.map");
        assert_eq!(result.mappath, Some(MapPath::File(mappath.clone())));
        assert!(result.content.ends_with("\n//# sourceMappingURL=maps/a.txt.map"));

        let written: SourceMap = serde_json::from_str(&fs::read_to_string(&mappath).unwrap()).unwrap();
        assert_eq!(written, result.mapping);
        assert!(fs::read_to_string(&mappath).unwrap().contains("\n\t\""));
    }

    #[tokio::test]
    async fn test_map_policy_aliases() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        let first = fx.dir.path().join("first");
        let second = fx.dir.path().join("second");
        let options = TranspileOptions {
            maps: MapPolicy::Aliases(vec![
                MapAlias::new("/m1", &first),
                MapAlias::new("/m2", &second),
            ]),
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        assert!(result.content.contains("\n//# sourceMappingURL=/m1/assets/a.txt.map"));
        assert!(result.content.ends_with("\n//# sourceMappingURL=/m2/assets/a.txt.map"));
        assert!(first.join("assets/a.txt.map").exists());
        let last = second.join("assets/a.txt.map");
        assert!(last.exists());
        assert_eq!(result.mappath, Some(MapPath::File(last)));
    }

    #[tokio::test]
    async fn test_nowrite_keeps_cache() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        let options = TranspileOptions {
            nowrite: true,
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        assert!(!result.filename.exists());
        assert!(result.content.ends_with("sourceMappingURL=a.txt.map"));
        assert!(crate::cache::CacheStore::new(&options.tmpdir)
            .entry_path(&input, false)
            .exists());
        assert!(!fx.log.contains("write"));
    }

    #[tokio::test]
    async fn test_minified_map_is_compact() {
        let fx = Fixture::new();
        let input = fx.write("a.up", "x");
        let options = TranspileOptions {
            minified: Minify::Auto,
            outfile: Some(fx.dir.path().join("out.min.txt")),
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        assert_eq!(result.filename, fx.dir.path().join("out.min.txt"));
        let map = fs::read_to_string(fx.dir.path().join("out.min.txt.map")).unwrap();
        assert!(!map.contains('\n'));
    }

    #[tokio::test]
    async fn test_script_scenario() {
        let fx = Fixture::new();
        let input = fx.write("a.es", "() => 123");
        let options = TranspileOptions {
            nowrite: true,
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        assert_eq!(result.filename, fx.dir.path().join("a.js"));
        assert!(result.content.starts_with(&format!("{MARKER}\n")));
        assert!(result.content.ends_with("\n//# sourceMappingURL=a.js.map"));
        assert_eq!(result.mappath, Some(MapPath::File(fx.dir.path().join("a.js.map"))));
        assert_eq!(result.mapping.as_regular().unwrap().sources, vec!["/assets/a.es"]);
    }

    #[tokio::test]
    async fn test_script_combine_scenario() {
        let fx = Fixture::new();
        let t1 = fx.write("t1.es", "() => 123");
        let t2 = fx.write("t2.es", "() => 456");
        let options = TranspileOptions {
            nowrite: true,
            ..fx.options()
        };

        let result = fx.transpiler.transpile(&[&t1, &t2], &options).await.unwrap().unwrap();
        assert_eq!(result.filename, fx.dir.path().join("t1,t2.js"));
        assert!(result.content.ends_with("\n//# sourceMappingURL=t1,t2.js.map"));

        let sections = &result.mapping.as_sectioned().unwrap().sections;
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].offset, Offset { line: 0, column: 0 });
        // marker line plus the arrow function
        assert_eq!(sections[1].offset, Offset { line: 2, column: 0 });
    }

    #[tokio::test]
    async fn test_registered_rewrite_scenario() {
        let mut registry = CompilerRegistry::with_defaults();
        let rules = vec![RewriteRule::new("body", "BODY").unwrap()];
        registry
            .register(
                ".txt",
                DescriptorPatch::new().post_process(rewrite_post_process(rules)),
                Some(".scss"),
            )
            .unwrap();
        let transpiler = Transpiler::new(Arc::new(registry));

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("custom.txt");
        fs::write(&input, "html{body{color:red}}").unwrap();
        let options = TranspileOptions {
            rootdir: dir.path().to_path_buf(),
            localdir: "/assets".to_string(),
            tmpdir: dir.path().join("tmp"),
            nowrite: true,
            logger: Arc::new(MemoryLog::new()),
            ..TranspileOptions::default()
        };

        let result = transpiler.transpile(&[&input], &options).await.unwrap().unwrap();
        assert_eq!(result.filename, dir.path().join("custom.css"));
        assert!(result.content.starts_with("html BODY {"));
        assert!(result.content.ends_with("\n/*# sourceMappingURL=custom.css.map */"));
        assert_eq!(result.mapping.as_regular().unwrap().sources, vec!["/assets/custom.txt"]);
    }
}
