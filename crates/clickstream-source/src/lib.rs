//! Reading raw clickstream event files into typed [`RawEvent`] batches.

pub mod bookmark;
pub mod errors;
pub mod formats;
pub mod model;
mod local;
mod partitions;

pub use bookmark::{Bookmark, BookmarkStore};
pub use errors::SourceError;
pub use formats::SourceFormat;
pub use local::{EventSource, LocalEventSource, SourceBatch};
pub use model::RawEvent;
pub use partitions::HivePartitions;

#[cfg(test)]
mod tests;
