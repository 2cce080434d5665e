//! Partitioned table writers. The pipeline hands each finished table to a [`TableSink`]; file
//! layout and compression live here, everything upstream deals only in rows.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::{DataFrame, PolarsError};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::frames::{partition_rows, FrameRow, Partition};
use crate::tables::TableDescriptor;

/// Directory name used for a null partition value.
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputFormat {
    Parquet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Compression {
    Snappy,
}

impl Compression {
    fn parquet(self) -> ParquetCompression {
        match self {
            Compression::Snappy => ParquetCompression::Snappy,
        }
    }

    fn file_suffix(self) -> &'static str {
        match self {
            Compression::Snappy => "snappy.parquet",
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("unsupported destination '{0}': only local paths are writable")]
    UnsupportedDestination(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {table}: {source}")]
    Encode {
        table: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// A finished table ready for writing.
#[derive(Debug, Clone)]
pub struct TableWrite {
    pub table: &'static str,
    pub destination: String,
    pub partition_keys: Vec<&'static str>,
    pub format: OutputFormat,
    pub compression: Compression,
    pub partitions: Vec<Partition>,
}

impl TableWrite {
    pub fn from_rows<R: FrameRow>(
        descriptor: &TableDescriptor,
        destination: String,
        rows: &[R],
    ) -> Result<Self, PolarsError> {
        Ok(Self {
            table: descriptor.name,
            destination,
            partition_keys: descriptor.partition_keys.to_vec(),
            format: OutputFormat::Parquet,
            compression: Compression::Snappy,
            partitions: partition_rows(rows, descriptor.partition_keys)?,
        })
    }

    pub fn row_count(&self) -> usize {
        self.partitions.iter().map(Partition::height).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReceipt {
    pub table: &'static str,
    pub rows: usize,
    pub files: Vec<String>,
}

#[async_trait]
pub trait TableSink: Send + Sync {
    async fn write_table(&self, table: TableWrite) -> Result<WriteReceipt, SinkError>;
}

/// Writes hive-style partition directories of snappy-compressed parquet files on local disk.
#[derive(Debug, Clone, Default)]
pub struct ParquetSink;

impl ParquetSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TableSink for ParquetSink {
    async fn write_table(&self, table: TableWrite) -> Result<WriteReceipt, SinkError> {
        let root = resolve_destination(&table.destination)?;
        let mut files = Vec::with_capacity(table.partitions.len());

        for (index, partition) in table.partitions.iter().enumerate() {
            if partition.height() == 0 {
                continue;
            }

            let dir = root.join(partition_dir(partition));
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| SinkError::Io {
                    path: dir.clone(),
                    source,
                })?;

            let bytes = create_parquet_bytes(&partition.frame, table.compression).map_err(
                |source| SinkError::Encode {
                    table: table.table,
                    source,
                },
            )?;

            let path = dir.join(format!(
                "part-{index:05}-{}.{}",
                Uuid::new_v4(),
                table.compression.file_suffix()
            ));
            tokio::fs::write(&path, bytes)
                .await
                .map_err(|source| SinkError::Io {
                    path: path.clone(),
                    source,
                })?;

            debug!(table = table.table, file = %path.display(), rows = partition.height(), "wrote partition");
            files.push(path.display().to_string());
        }

        Ok(WriteReceipt {
            table: table.table,
            rows: table.row_count(),
            files,
        })
    }
}

/// Keeps every write in memory. Used for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: Mutex<Vec<TableWrite>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn writes(&self) -> Vec<TableWrite> {
        self.writes.lock().await.clone()
    }

    pub async fn table(&self, name: &str) -> Option<TableWrite> {
        self.writes
            .lock()
            .await
            .iter()
            .find(|write| write.table == name)
            .cloned()
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn write_table(&self, table: TableWrite) -> Result<WriteReceipt, SinkError> {
        let receipt = WriteReceipt {
            table: table.table,
            rows: table.row_count(),
            files: Vec::new(),
        };
        self.writes.lock().await.push(table);
        Ok(receipt)
    }
}

fn resolve_destination(destination: &str) -> Result<PathBuf, SinkError> {
    let path = destination.strip_prefix("file://").unwrap_or(destination);
    if path.contains("://") {
        return Err(SinkError::UnsupportedDestination(destination.to_string()));
    }
    Ok(Path::new(path).to_path_buf())
}

fn partition_dir(partition: &Partition) -> PathBuf {
    partition
        .values
        .iter()
        .map(|(key, value)| match value {
            Some(value) => format!("{key}={value}"),
            None => format!("{key}={HIVE_DEFAULT_PARTITION}"),
        })
        .collect()
}

fn create_parquet_bytes(df: &DataFrame, compression: Compression) -> Result<Vec<u8>, PolarsError> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let mut clone = df.clone();
        ParquetWriter::new(&mut cursor)
            .with_compression(compression.parquet())
            .with_statistics(StatisticsOptions::default())
            .finish(&mut clone)?;
    }
    Ok(buffer)
}
