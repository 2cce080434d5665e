//! Conversion of typed rows into polars frames, split by partition key values.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::*;

use crate::events::{format_event_date, EnrichedEvent};

/// A row type that can be materialised as a columnar frame.
pub trait FrameRow: Sized {
    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame>;

    /// Value of a partition column for this row. Only integer partition keys are used.
    fn partition_value(&self, _key: &str) -> Option<i32> {
        None
    }
}

/// One output directory worth of rows. Partition columns are removed from `frame`.
#[derive(Debug, Clone)]
pub struct Partition {
    pub values: Vec<(String, Option<i32>)>,
    pub frame: DataFrame,
}

impl Partition {
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Groups rows by their partition key values (ascending) and builds one frame per group.
/// Row order inside a group follows the input order. No rows means no partitions.
pub fn partition_rows<R: FrameRow>(rows: &[R], keys: &[&str]) -> PolarsResult<Vec<Partition>> {
    let mut groups: BTreeMap<Vec<Option<i32>>, Vec<&R>> = BTreeMap::new();
    for row in rows {
        let key = keys.iter().map(|name| row.partition_value(name)).collect();
        groups.entry(key).or_default().push(row);
    }

    let mut partitions = Vec::with_capacity(groups.len());
    for (values, members) in groups {
        let mut frame = R::to_frame(&members)?;
        for key in keys {
            frame = frame.drop(key)?;
        }
        partitions.push(Partition {
            values: keys.iter().map(|key| key.to_string()).zip(values).collect(),
            frame,
        });
    }
    Ok(partitions)
}

pub(crate) fn date_strings(dates: impl Iterator<Item = Option<NaiveDate>>) -> Vec<Option<String>> {
    dates.map(|date| date.map(format_event_date)).collect()
}

pub(crate) fn counts(values: impl Iterator<Item = u64>) -> Vec<i64> {
    values.map(|value| value as i64).collect()
}

pub(crate) fn date_partition_value(
    key: &str,
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
    hour: Option<i32>,
) -> Option<i32> {
    match key {
        "year" => year,
        "month" => month,
        "day" => day,
        "hour" => hour,
        _ => None,
    }
}

impl FrameRow for EnrichedEvent {
    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        let timestamp = Series::new(
            "timestamp".into(),
            rows.iter()
                .map(|row| row.timestamp.map(|ts| ts.timestamp_micros()))
                .collect::<Vec<_>>(),
        )
        .cast(&DataType::Datetime(
            TimeUnit::Microseconds,
            Some(polars::prelude::TimeZone::UTC),
        ))?;

        DataFrame::new(vec![
            timestamp.into(),
            Series::new(
                "event_date".into(),
                date_strings(rows.iter().map(|row| row.event_date)),
            )
            .into(),
            Series::new(
                "event_hour".into(),
                rows.iter()
                    .map(|row| row.event_hour.map(|hour| hour as i32))
                    .collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "user_id".into(),
                rows.iter().map(|row| row.user_id.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "session_id".into(),
                rows.iter().map(|row| row.session_id.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "event_type".into(),
                rows.iter().map(|row| row.event_type.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "product_id".into(),
                rows.iter().map(|row| row.product_id.as_deref()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "quantity".into(),
                rows.iter().map(|row| row.quantity).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "price".into(),
                rows.iter().map(|row| row.price).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "revenue".into(),
                rows.iter().map(|row| row.revenue).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "category".into(),
                rows.iter().map(|row| row.category.as_deref()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "search_query".into(),
                rows.iter().map(|row| row.search_query.as_deref()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new("year".into(), rows.iter().map(|row| row.year).collect::<Vec<_>>()).into(),
            Series::new("month".into(), rows.iter().map(|row| row.month).collect::<Vec<_>>()).into(),
            Series::new("day".into(), rows.iter().map(|row| row.day).collect::<Vec<_>>()).into(),
            Series::new("hour".into(), rows.iter().map(|row| row.hour).collect::<Vec<_>>()).into(),
        ])
    }

    fn partition_value(&self, key: &str) -> Option<i32> {
        date_partition_value(key, self.year, self.month, self.day, self.hour)
    }
}
