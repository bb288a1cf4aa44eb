//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting a fetched document.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// File system error (create directory, write, rename).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The filename stem would escape the output directory.
    #[error("unsafe filename stem '{stem}'")]
    UnsafeStem {
        /// The rejected stem.
        stem: String,
    },
}

impl DownloadError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an unsafe stem error.
    pub fn unsafe_stem(stem: impl Into<String>) -> Self {
        Self::UnsafeStem { stem: stem.into() }
    }
}
