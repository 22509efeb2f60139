//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for verbose-only output
//! - [`LogSink`] trait, the pluggable sink the transpile pipeline reports to
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("done"; "{} ({}ms)", path.display(), elapsed);
//!
//! // Pipeline sink
//! let sink: Arc<dyn LogSink> = Arc::new(ConsoleLog);
//! sink.info("cache", "style.scss (0ms)");
//! ```

use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "done" | "write" => prefix.bright_green().bold().to_string(),
        "cache" | "skip" => prefix.bright_blue().bold().to_string(),
        "fail" | "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Log Sink
// ============================================================================

/// Severity of a pipeline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Destination for messages emitted by the transpile pipeline.
///
/// Messages are advisory only; a sink must never fail the pipeline.
pub trait LogSink: Send + Sync {
    fn write(&self, level: Level, module: &str, message: &str);

    fn info(&self, module: &str, message: &str) {
        self.write(Level::Info, module, message);
    }

    fn warn(&self, module: &str, message: &str) {
        self.write(Level::Warn, module, message);
    }

    fn error(&self, module: &str, message: &str) {
        self.write(Level::Error, module, message);
    }
}

/// Terminal sink backed by [`log`]. Info lines only appear in verbose mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLog;

impl LogSink for ConsoleLog {
    fn write(&self, level: Level, module: &str, message: &str) {
        match level {
            Level::Info if !is_verbose() => {}
            Level::Info => log(module, message),
            Level::Warn => log("warning", &format!("{module}: {message}")),
            Level::Error => log("error", &format!("{module}: {message}")),
        }
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentLog;

impl LogSink for SilentLog {
    fn write(&self, _level: Level, _module: &str, _message: &str) {}
}

/// Sink that keeps every line in memory, formatted as `module message`.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, l)| l.clone()).collect()
    }

    /// Whether any recorded line starts with `module`.
    pub fn contains(&self, module: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|(_, l)| l.split_once(' ').is_some_and(|(m, _)| m == module))
    }
}

impl LogSink for MemoryLog {
    fn write(&self, level: Level, module: &str, message: &str) {
        self.lines.lock().push((level, format!("{module} {message}")));
    }
}
