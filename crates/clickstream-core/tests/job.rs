use async_trait::async_trait;

use clickstream_core::config::JobConfig;
use clickstream_core::job::{process_batch, EtlJob};
use clickstream_core::sink::{MemorySink, SinkError, TableSink, TableWrite, WriteReceipt};
use clickstream_core::tables::{self, all_gold_tables};
use clickstream_core::{RawEvent, SourceBatch};
use clickstream_source::{EventSource, SourceError};

/// Hands out one prepared batch and records what gets committed.
#[derive(Default)]
struct ScriptedSource {
    batch: SourceBatch,
    committed: Vec<String>,
    commits: usize,
}

impl ScriptedSource {
    fn with_events(events: Vec<RawEvent>) -> Self {
        Self {
            batch: SourceBatch {
                events,
                files: vec!["year=2024/month=3/day=15/hour=10/events.json".to_string()],
            },
            ..Self::default()
        }
    }
}

impl EventSource for ScriptedSource {
    fn describe(&self) -> String {
        "scripted".to_string()
    }

    fn read_batch(&mut self) -> Result<SourceBatch, SourceError> {
        Ok(self.batch.clone())
    }

    fn commit(&mut self, files: &[String]) -> Result<(), SourceError> {
        self.commits += 1;
        self.committed.extend_from_slice(files);
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl TableSink for FailingSink {
    async fn write_table(&self, table: TableWrite) -> Result<WriteReceipt, SinkError> {
        Err(SinkError::Unavailable(format!("cannot write {}", table.table)))
    }
}

fn config() -> JobConfig {
    JobConfig {
        job_name: "clickstream-test".into(),
        source_database: "catalog".into(),
        source_table: "events".into(),
        silver_path: "/lake/silver".into(),
        gold_path: "/lake/gold".into(),
        bookmark_path: None,
    }
}

fn raw(user: &str, event_type: &str, product: &str) -> RawEvent {
    RawEvent {
        timestamp: Some("2024-03-15T10:20:00Z".into()),
        user_id: Some(user.into()),
        session_id: Some(format!("{user}-session")),
        event_type: Some(event_type.into()),
        product_id: Some(product.into()),
        category: Some("shoes".into()),
        price: Some(50.0),
        quantity: Some(2),
        year: Some(2024),
        month: Some(3),
        day: Some(15),
        hour: Some(10),
        ..RawEvent::default()
    }
}

#[tokio::test]
async fn empty_batch_writes_nothing_and_succeeds() {
    let mut job = EtlJob::new(config(), ScriptedSource::default(), MemorySink::new());

    let summary = job.run().await.unwrap();

    assert_eq!(summary.source_rows, 0);
    assert_eq!(summary.silver_rows, 0);
    assert!(summary.filter.is_none());
    assert!(summary.gold_rows.is_empty());
    assert!(job.sink().writes().await.is_empty());
    assert_eq!(job.source().commits, 1);
    assert!(job.source().committed.is_empty());
}

#[tokio::test]
async fn run_writes_silver_and_every_gold_table_then_commits() {
    let events = vec![
        raw("u1", "page_view", "p1"),
        raw("u1", "add_to_cart", "p1"),
        raw("u1", "purchase", "p1"),
        RawEvent {
            session_id: None,
            ..raw("u2", "page_view", "p2")
        },
    ];
    let mut job = EtlJob::new(
        config(),
        ScriptedSource::with_events(events),
        MemorySink::new(),
    );

    let summary = job.run().await.unwrap();

    assert_eq!(summary.source_rows, 4);
    assert_eq!(summary.filter.map(|report| report.rows_removed), Some(1));
    assert_eq!(summary.silver_rows, 3);
    assert_eq!(summary.files_committed, 1);
    assert_eq!(summary.gold_rows.len(), 5);
    assert_eq!(summary.gold_rows[tables::PRODUCT_FUNNEL], 1);
    assert_eq!(summary.gold_rows[tables::HOURLY_REVENUE], 1);
    assert_eq!(summary.gold_rows[tables::PRODUCT_POPULARITY], 1);

    let silver = job.sink().table(tables::SILVER_EVENTS).await.unwrap();
    assert_eq!(silver.destination, "/lake/silver");
    assert_eq!(silver.partition_keys, vec!["year", "month", "day", "hour"]);
    assert_eq!(silver.partitions.len(), 1);
    let partition = &silver.partitions[0];
    assert_eq!(
        partition.values,
        vec![
            ("year".to_string(), Some(2024)),
            ("month".to_string(), Some(3)),
            ("day".to_string(), Some(15)),
            ("hour".to_string(), Some(10)),
        ]
    );
    assert!(partition.frame.column("year").is_err());
    let revenue = partition.frame.column("revenue").unwrap().f64().unwrap();
    assert_eq!(revenue.get(2), Some(100.0));

    for descriptor in all_gold_tables() {
        let write = job.sink().table(descriptor.name).await.unwrap();
        assert_eq!(write.destination, format!("/lake/gold/{}", descriptor.name));
        assert_eq!(write.partition_keys, descriptor.partition_keys.to_vec());
    }

    let funnel = job.sink().table(tables::PRODUCT_FUNNEL).await.unwrap();
    assert!(funnel.partition_keys.is_empty());
    assert_eq!(funnel.partitions.len(), 1);
    assert!(funnel.partitions[0].values.is_empty());

    assert_eq!(job.source().commits, 1);
    assert_eq!(
        job.source().committed,
        vec!["year=2024/month=3/day=15/hour=10/events.json".to_string()]
    );
}

#[tokio::test]
async fn failed_write_leaves_bookmark_untouched() {
    struct CommitGuard {
        inner: ScriptedSource,
    }

    impl EventSource for CommitGuard {
        fn describe(&self) -> String {
            self.inner.describe()
        }

        fn read_batch(&mut self) -> Result<SourceBatch, SourceError> {
            self.inner.read_batch()
        }

        fn commit(&mut self, _files: &[String]) -> Result<(), SourceError> {
            panic!("commit must not run when a write fails");
        }
    }

    let mut job = EtlJob::new(
        config(),
        CommitGuard {
            inner: ScriptedSource::with_events(vec![raw("u1", "purchase", "p1")]),
        },
        FailingSink,
    );

    let err = job.run().await.unwrap_err();
    assert!(err.to_string().contains("cannot write"));
}

#[tokio::test]
async fn run_writes_exactly_what_the_batch_pipeline_produces() {
    let events = vec![
        raw("u1", "page_view", "p1"),
        RawEvent {
            price: Some(1.005),
            quantity: Some(1),
            ..raw("u2", "purchase", "p1")
        },
        RawEvent {
            user_id: None,
            ..raw("u3", "page_view", "p1")
        },
    ];
    let expected = process_batch(events.clone()).unwrap();
    let mut job = EtlJob::new(
        config(),
        ScriptedSource::with_events(events),
        MemorySink::new(),
    );

    let summary = job.run().await.unwrap();

    assert_eq!(summary.filter, Some(expected.filter));
    assert_eq!(summary.enrichment, Some(expected.enrichment));
    assert_eq!(summary.silver_rows, expected.silver.len());
    assert_eq!(
        summary.gold_rows[tables::DAILY_USER_ACTIVITY],
        expected.gold.daily_user_activity.len()
    );
    assert_eq!(expected.gold.hourly_revenue[0].total_revenue, Some(1.01));

    let hourly = job.sink().table(tables::HOURLY_REVENUE).await.unwrap();
    let total = hourly.partitions[0]
        .frame
        .column("total_revenue")
        .unwrap()
        .f64()
        .unwrap();
    assert_eq!(total.get(0), Some(1.01));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["job_name"], "clickstream-test");
    assert_eq!(json["source_rows"], 3);
    assert_eq!(json["filter"]["rows_removed"], 1);
    assert_eq!(json["gold_rows"]["hourly_revenue"], 1);
}
