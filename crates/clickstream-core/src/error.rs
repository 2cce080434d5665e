use clickstream_source::SourceError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::sink::SinkError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source read failed: {0}")]
    Source(#[from] SourceError),

    #[error("Sink write failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
