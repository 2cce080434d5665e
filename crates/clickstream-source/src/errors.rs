use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source location {} does not exist", .path.display())]
    MissingLocation { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to list source files: {0}")]
    Listing(#[from] glob::GlobError),

    #[error("{format} read of {} failed: {source}", .path.display())]
    Polars {
        format: &'static str,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("bookmark {} is not valid JSON: {source}", .path.display())]
    Bookmark {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported source file {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
