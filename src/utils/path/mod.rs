//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`absolutize`, `lexical_clean`, `relative_to`)
//! - [`route`]: Logical mount URLs (`join_url`, `to_slash`)

pub mod fs;
pub mod route;

// Re-export commonly used functions
pub use fs::{absolutize, lexical_clean, relative_to};
pub use route::{join_url, to_slash};
