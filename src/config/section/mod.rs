//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assetter.toml`:
//!
//! | Module      | TOML Section    | Purpose                              |
//! |-------------|-----------------|--------------------------------------|
//! | `transpile` | `[transpile]`   | Default options of every transpile   |
//! | `compiler`  | `[[compilers]]` | Registry additions and overrides     |

mod compiler;
mod transpile;

pub use compiler::{CommentKind, CompilerSection, RewriteSection};
pub use transpile::{MapsSetting, MinifyKeyword, MinifySetting, TranspileSection};
