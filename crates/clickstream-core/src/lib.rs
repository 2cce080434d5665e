pub mod aggregates;
pub mod config;
pub mod enricher;
pub mod error;
pub mod events;
pub mod frames;
pub mod job;
pub mod metrics;
pub mod quality_filter;
pub mod sink;
pub mod tables;
pub mod timestamps;

pub use clickstream_source::{RawEvent, SourceBatch};
