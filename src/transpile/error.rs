//! Pipeline errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranspileError {
    /// A compiler rejected its input.
    #[error("failed to compile {}", path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The result map could not be encoded.
    #[error("failed to encode source map for {}", path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TranspileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// File the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Compile { path, .. } | Self::Io { path, .. } | Self::Map { path, .. } => path,
        }
    }
}
