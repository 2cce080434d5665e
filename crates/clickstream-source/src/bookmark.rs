//! Persistent record of which source files a job has already consumed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SourceError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub processed_files: BTreeSet<String>,
    pub last_committed_at: Option<DateTime<Utc>>,
}

impl Bookmark {
    pub fn contains(&self, file: &str) -> bool {
        self.processed_files.contains(file)
    }
}

#[derive(Debug, Clone)]
pub struct BookmarkStore {
    path: PathBuf,
}

impl BookmarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the bookmark; a missing file means nothing has been processed yet.
    pub fn load(&self) -> Result<Bookmark, SourceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Bookmark::default())
            }
            Err(err) => return Err(SourceError::io(&self.path, err)),
        };

        serde_json::from_str(&content).map_err(|source| SourceError::Bookmark {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the stored bookmark via a sibling temp file renamed into place.
    pub fn save(&self, bookmark: &Bookmark) -> Result<(), SourceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| SourceError::io(parent, err))?;
        }

        let bytes = serde_json::to_vec_pretty(bookmark).map_err(|source| SourceError::Bookmark {
            path: self.path.clone(),
            source,
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, bytes).map_err(|err| SourceError::io(&temp_path, err))?;
        fs::rename(&temp_path, &self.path).map_err(|err| SourceError::io(&self.path, err))?;
        Ok(())
    }
}
