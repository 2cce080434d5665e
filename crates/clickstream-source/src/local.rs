use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::bookmark::BookmarkStore;
use crate::errors::SourceError;
use crate::formats::{read_events, SourceFormat};
use crate::model::RawEvent;
use crate::partitions::HivePartitions;

/// The rows that arrived since the last committed run, plus the files they came from.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub events: Vec<RawEvent>,
    pub files: Vec<String>,
}

impl SourceBatch {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Incremental reader: each committed batch is never returned again.
pub trait EventSource: Send {
    fn describe(&self) -> String;
    fn read_batch(&mut self) -> Result<SourceBatch, SourceError>;
    /// Marks `files` as consumed so later reads skip them.
    fn commit(&mut self, files: &[String]) -> Result<(), SourceError>;
}

/// Reads event files below `<database>/<table>` on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalEventSource {
    location: PathBuf,
    bookmarks: BookmarkStore,
}

impl LocalEventSource {
    pub fn new(database: impl AsRef<Path>, table: &str, bookmarks: BookmarkStore) -> Self {
        Self {
            location: database.as_ref().join(table),
            bookmarks,
        }
    }

    fn list_files(&self) -> Result<Vec<PathBuf>, SourceError> {
        if !self.location.is_dir() {
            return Err(SourceError::MissingLocation {
                path: self.location.clone(),
            });
        }

        let pattern = self.location.join("**").join("*");
        let pattern = pattern.to_string_lossy();

        let mut files = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry?;
            if !path.is_file() || SourceFormat::from_path(&path).is_none() {
                continue;
            }
            if self.is_hidden(&path) {
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }

    // Underscore and dot prefixed entries (bookmarks, _SUCCESS markers, temp files) are not data.
    fn is_hidden(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.location).unwrap_or(path);
        relative.components().any(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .map(|name| name.starts_with('_') || name.starts_with('.'))
                .unwrap_or(false),
            _ => false,
        })
    }

    fn bookmark_key(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.location).unwrap_or(path);
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl EventSource for LocalEventSource {
    fn describe(&self) -> String {
        self.location.display().to_string()
    }

    fn read_batch(&mut self) -> Result<SourceBatch, SourceError> {
        let bookmark = self.bookmarks.load()?;
        let mut batch = SourceBatch::default();

        for path in self.list_files()? {
            let key = self.bookmark_key(&path);
            if bookmark.contains(&key) {
                continue;
            }

            let partitions = HivePartitions::from_path(&path);
            let mut events = read_events(&path)?;
            if !partitions.is_empty() {
                for event in &mut events {
                    event.fill_missing_partitions(&partitions);
                }
            }

            debug!(file = %key, rows = events.len(), "read source file");
            batch.events.extend(events);
            batch.files.push(key);
        }

        info!(
            location = %self.location.display(),
            files = batch.files.len(),
            rows = batch.events.len(),
            "source batch loaded"
        );
        Ok(batch)
    }

    fn commit(&mut self, files: &[String]) -> Result<(), SourceError> {
        let mut bookmark = self.bookmarks.load()?;
        bookmark.processed_files.extend(files.iter().cloned());
        bookmark.last_committed_at = Some(Utc::now());
        self.bookmarks.save(&bookmark)?;

        info!(
            bookmark = %self.bookmarks.path().display(),
            committed_files = files.len(),
            "bookmark committed"
        );
        Ok(())
    }
}
