use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub job_name: String,
    /// Catalog location holding the source table.
    pub source_database: String,
    pub source_table: String,
    pub silver_path: String,
    /// Root under which each gold table gets its own sub-location.
    pub gold_path: String,
    #[serde(default)]
    pub bookmark_path: Option<String>,
}

impl JobConfig {
    pub fn bookmark_path(&self) -> PathBuf {
        match &self.bookmark_path {
            Some(path) => PathBuf::from(path),
            None => Path::new(self.silver_path.trim_start_matches("file://"))
                .join("_bookmarks")
                .join(format!("{}.json", self.job_name)),
        }
    }
}

/// Settings gathered from one layer (file, environment, flags) before they are combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartialJobConfig {
    pub job_name: Option<String>,
    pub source_database: Option<String>,
    pub source_table: Option<String>,
    pub silver_path: Option<String>,
    pub gold_path: Option<String>,
    pub bookmark_path: Option<String>,
}

impl PartialJobConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Values set in `overrides` replace the ones in `self`.
    pub fn merge(self, overrides: PartialJobConfig) -> Self {
        Self {
            job_name: overrides.job_name.or(self.job_name),
            source_database: overrides.source_database.or(self.source_database),
            source_table: overrides.source_table.or(self.source_table),
            silver_path: overrides.silver_path.or(self.silver_path),
            gold_path: overrides.gold_path.or(self.gold_path),
            bookmark_path: overrides.bookmark_path.or(self.bookmark_path),
        }
    }

    pub fn build(self) -> Result<JobConfig, ConfigError> {
        fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
            value
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        }

        Ok(JobConfig {
            job_name: required(self.job_name, "job_name")?,
            source_database: required(self.source_database, "source_database")?,
            source_table: required(self.source_table, "source_table")?,
            silver_path: required(self.silver_path, "silver_path")?,
            gold_path: required(self.gold_path, "gold_path")?,
            bookmark_path: self.bookmark_path.filter(|path| !path.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_layer_is_overridden_by_flags() {
        let file = PartialJobConfig::from_toml_str(
            r#"
                job_name = "nightly"
                source_database = "/data/catalog"
                source_table = "events"
                silver_path = "/data/silver"
                gold_path = "/data/gold"
            "#,
        )
        .unwrap();
        let flags = PartialJobConfig {
            gold_path: Some("/tmp/gold".into()),
            ..PartialJobConfig::default()
        };

        let config = file.merge(flags).build().unwrap();

        assert_eq!(config.job_name, "nightly");
        assert_eq!(config.gold_path, "/tmp/gold");
        assert_eq!(config.bookmark_path, None);
        assert_eq!(
            config.bookmark_path(),
            PathBuf::from("/data/silver/_bookmarks/nightly.json")
        );
    }

    #[test]
    fn missing_and_blank_values_are_rejected() {
        let partial = PartialJobConfig {
            job_name: Some("job".into()),
            source_database: Some("db".into()),
            source_table: Some("   ".into()),
            silver_path: Some("s".into()),
            gold_path: Some("g".into()),
            bookmark_path: None,
        };

        let err = partial.build().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("source_table")));
    }

    #[test]
    fn unknown_toml_types_fail() {
        assert!(PartialJobConfig::from_toml_str("job_name = 5").is_err());
    }
}
