//! Asset naming and source resolution.

mod name;
mod resolve;

// Naming conventions (pure functions)
pub use name::{
    MIN_MARKER, change_ext, combine_name, extension_of, is_minified_name, output_path,
    separate_name,
};

// Request → source resolution
pub use resolve::AltfileResolver;
