use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use clickstream_core::config::JobConfig;
use clickstream_core::events::EnrichedEvent;
use clickstream_core::job::{gold_writes, process_batch};
use clickstream_core::sink::{
    ParquetSink, SinkError, TableSink, TableWrite, HIVE_DEFAULT_PARTITION,
};
use clickstream_core::tables::{DAILY_USER_ACTIVITY, PRODUCT_FUNNEL, SILVER_EVENTS_TABLE};
use clickstream_core::RawEvent;

fn raw(hour: Option<i32>, timestamp: &str, event_type: &str) -> RawEvent {
    RawEvent {
        timestamp: Some(timestamp.into()),
        user_id: Some("u1".into()),
        session_id: Some("s1".into()),
        event_type: Some(event_type.into()),
        product_id: Some("p1".into()),
        category: Some("c1".into()),
        price: Some(12.5),
        quantity: Some(2),
        year: Some(2024),
        month: Some(3),
        day: Some(15),
        hour,
        ..RawEvent::default()
    }
}

fn parquet_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

fn read(path: &Path) -> DataFrame {
    ParquetReader::new(File::open(path).unwrap()).finish().unwrap()
}

#[tokio::test]
async fn silver_is_written_as_hive_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let output = process_batch(vec![
        raw(Some(10), "2024-03-15T10:00:00Z", "page_view"),
        raw(Some(10), "2024-03-15T10:30:00Z", "purchase"),
        raw(Some(11), "2024-03-15T11:00:00Z", "page_view"),
        raw(None, "2024-03-15T12:00:00Z", "page_view"),
    ])
    .unwrap();

    let root = dir.path().join("silver");
    let write = TableWrite::from_rows(
        &SILVER_EVENTS_TABLE,
        format!("file://{}", root.display()),
        &output.silver,
    )
    .unwrap();
    let receipt = ParquetSink::new().write_table(write).await.unwrap();

    assert_eq!(receipt.rows, 4);
    assert_eq!(receipt.files.len(), 3);

    let base = root.join("year=2024/month=3/day=15");
    let hour_ten = parquet_files(&base.join("hour=10"));
    assert_eq!(hour_ten.len(), 1);
    let name = hour_ten[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("part-"));
    assert!(name.ends_with(".snappy.parquet"));

    let df = read(&hour_ten[0]);
    assert_eq!(df.height(), 2);
    assert!(df.column("hour").is_err());
    let revenue = df.column("revenue").unwrap().f64().unwrap();
    assert_eq!(revenue.get(0), Some(0.0));
    assert_eq!(revenue.get(1), Some(25.0));
    let dates = df.column("event_date").unwrap().str().unwrap();
    assert_eq!(dates.get(0), Some("2024-03-15"));

    assert_eq!(parquet_files(&base.join("hour=11")).len(), 1);
    let unknown_hour = base.join(format!("hour={HIVE_DEFAULT_PARTITION}"));
    assert_eq!(parquet_files(&unknown_hour).len(), 1);
}

#[tokio::test]
async fn gold_tables_land_under_their_own_directories() {
    let dir = tempfile::tempdir().unwrap();
    let config = JobConfig {
        job_name: "job".into(),
        source_database: "catalog".into(),
        source_table: "events".into(),
        silver_path: dir.path().join("silver").display().to_string(),
        gold_path: dir.path().join("gold").display().to_string(),
        bookmark_path: None,
    };
    let output = process_batch(vec![
        raw(Some(10), "2024-03-15T10:00:00Z", "page_view"),
        raw(Some(10), "2024-03-15T10:30:00Z", "purchase"),
    ])
    .unwrap();

    let sink = ParquetSink::new();
    for write in gold_writes(&output.gold, &config).unwrap() {
        sink.write_table(write).await.unwrap();
    }

    let gold = dir.path().join("gold");
    let funnel_files = parquet_files(&gold.join(PRODUCT_FUNNEL));
    assert_eq!(funnel_files.len(), 1);
    let funnel = read(&funnel_files[0]);
    assert_eq!(funnel.height(), 1);
    let views = funnel.column("view_count").unwrap().i64().unwrap();
    assert_eq!(views.get(0), Some(1));

    let activity_dir = gold.join(DAILY_USER_ACTIVITY).join("year=2024/month=3/day=15");
    let activity_files = parquet_files(&activity_dir);
    assert_eq!(activity_files.len(), 1);
    let activity = read(&activity_files[0]);
    assert!(activity.column("year").is_err());
    let users = activity.column("unique_users").unwrap().i64().unwrap();
    assert_eq!(users.get(0), Some(1));
}

#[tokio::test]
async fn empty_table_writes_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("silver");
    let write = TableWrite::from_rows(
        &SILVER_EVENTS_TABLE,
        root.display().to_string(),
        &Vec::<EnrichedEvent>::new(),
    )
    .unwrap();

    let receipt = ParquetSink::new().write_table(write).await.unwrap();

    assert_eq!(receipt.rows, 0);
    assert!(receipt.files.is_empty());
    assert!(!root.exists());
}

#[tokio::test]
async fn remote_destinations_are_rejected() {
    let output = process_batch(vec![raw(Some(10), "2024-03-15T10:00:00Z", "page_view")]).unwrap();
    let write = TableWrite::from_rows(
        &SILVER_EVENTS_TABLE,
        "s3://bucket/silver".to_string(),
        &output.silver,
    )
    .unwrap();

    let err = ParquetSink::new().write_table(write).await.unwrap_err();
    assert!(matches!(err, SinkError::UnsupportedDestination(dest) if dest == "s3://bucket/silver"));
}
