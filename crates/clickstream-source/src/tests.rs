use std::path::Path;

use polars::prelude::*;
use serde_json::json;

use crate::formats::{events_from_dataframe, parse_json_lines};
use crate::model::RawEvent;
use crate::partitions::HivePartitions;
use crate::SourceFormat;

#[test]
fn json_value_extracts_all_fields() {
    let value = json!({
        "timestamp": "2024-03-05T10:15:00Z",
        "user_id": "u1",
        "session_id": "s1",
        "event_type": "purchase",
        "product_id": "p1",
        "price": 10.5,
        "quantity": 3,
        "category": "books",
        "search_query": null,
        "year": 2024,
        "month": 3,
        "day": 5,
        "hour": 10
    });

    let event = RawEvent::from_json_value(&value);

    assert_eq!(event.timestamp.as_deref(), Some("2024-03-05T10:15:00Z"));
    assert_eq!(event.user_id.as_deref(), Some("u1"));
    assert_eq!(event.event_type.as_deref(), Some("purchase"));
    assert_eq!(event.price, Some(10.5));
    assert_eq!(event.quantity, Some(3));
    assert_eq!(event.search_query, None);
    assert_eq!(
        (event.year, event.month, event.day, event.hour),
        (Some(2024), Some(3), Some(5), Some(10))
    );
}

#[test]
fn json_value_accepts_numeric_strings_and_numeric_ids() {
    let value = json!({
        "user_id": 42,
        "price": " 19.99 ",
        "quantity": "2",
        "hour": 7.0
    });

    let event = RawEvent::from_json_value(&value);

    assert_eq!(event.user_id.as_deref(), Some("42"));
    assert_eq!(event.price, Some(19.99));
    assert_eq!(event.quantity, Some(2));
    assert_eq!(event.hour, Some(7));
}

#[test]
fn json_value_nulls_unusable_fields() {
    let value = json!({
        "price": "ten dollars",
        "quantity": 1.5,
        "category": {"nested": true},
        "month": 99999999999i64
    });

    let event = RawEvent::from_json_value(&value);

    assert_eq!(event.price, None);
    assert_eq!(event.quantity, None);
    assert_eq!(event.category, None);
    assert_eq!(event.month, None);
}

#[test]
fn json_lines_skip_blanks_and_keep_malformed_as_empty() {
    let content = concat!(
        "{\"user_id\":\"u1\",\"event_type\":\"page_view\"}\n",
        "\n",
        "   \n",
        "{not json}\n",
        "[1,2,3]\n",
    );

    let events = parse_json_lines(content);

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].user_id.as_deref(), Some("u1"));
    assert_eq!(events[1], RawEvent::default());
    assert_eq!(events[2], RawEvent::default());
}

#[test]
fn hive_partitions_read_from_path_segments() {
    let path = Path::new("/data/events/year=2024/month=03/day=5/hour=23/part-0.json");
    let partitions = HivePartitions::from_path(path);

    assert_eq!(
        partitions,
        HivePartitions {
            year: Some(2024),
            month: Some(3),
            day: Some(5),
            hour: Some(23),
        }
    );
}

#[test]
fn hive_partitions_ignore_unrelated_segments() {
    let path = Path::new("/data/region=eu/year=abc/events.json");
    assert!(HivePartitions::from_path(path).is_empty());
}

#[test]
fn fill_missing_partitions_keeps_record_values() {
    let mut event = RawEvent {
        year: Some(2023),
        ..RawEvent::default()
    };
    let partitions = HivePartitions {
        year: Some(2024),
        month: Some(1),
        day: Some(2),
        hour: Some(3),
    };

    event.fill_missing_partitions(&partitions);

    assert_eq!(event.year, Some(2023));
    assert_eq!(event.month, Some(1));
    assert_eq!(event.hour, Some(3));
}

#[test]
fn source_format_detects_extensions() {
    assert_eq!(
        SourceFormat::from_path(Path::new("a/b.JSONL")),
        Some(SourceFormat::JsonLines)
    );
    assert_eq!(
        SourceFormat::from_path(Path::new("a/b.parquet")),
        Some(SourceFormat::Parquet)
    );
    assert_eq!(SourceFormat::from_path(Path::new("a/_SUCCESS")), None);
}

#[test]
fn dataframe_conversion_handles_missing_columns_and_casts() -> PolarsResult<()> {
    let df = df!(
        "timestamp" => &[Some("2024-01-01T00:00:00Z"), None],
        "user_id" => &[Some("u1"), Some("u2")],
        "event_type" => &["page_view", "purchase"],
        "price" => &[Some("12.50"), None],
        "quantity" => &[Some(1i32), Some(4i32)],
        "year" => &[2024i64, 2024i64],
    )?;

    let events = events_from_dataframe(&df)?;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].price, Some(12.5));
    assert_eq!(events[1].quantity, Some(4));
    assert_eq!(events[1].timestamp, None);
    assert_eq!(events[0].session_id, None);
    assert_eq!(events[0].search_query, None);
    assert_eq!(events[1].year, Some(2024));
    assert_eq!(events[1].month, None);
    Ok(())
}
