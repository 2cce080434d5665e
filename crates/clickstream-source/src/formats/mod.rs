mod json_lines;
mod parquet;

use std::path::Path;

pub use json_lines::parse_json_lines;
pub use parquet::events_from_dataframe;

use crate::errors::SourceError;
use crate::model::RawEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    JsonLines,
    Parquet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" | "jsonl" | "ndjson" => Some(Self::JsonLines),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonLines => "json_lines",
            Self::Parquet => "parquet",
        }
    }
}

/// Reads every event in a single source file, dispatching on the file extension.
pub fn read_events(path: &Path) -> Result<Vec<RawEvent>, SourceError> {
    match SourceFormat::from_path(path) {
        Some(SourceFormat::JsonLines) => json_lines::read_file(path),
        Some(SourceFormat::Parquet) => parquet::read_file(path),
        None => Err(SourceError::UnsupportedFormat(path.to_path_buf())),
    }
}
