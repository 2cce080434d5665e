use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::*;

use crate::events::EnrichedEvent;
use crate::frames::{counts, date_partition_value, date_strings, FrameRow};
use crate::metrics::{round2, NullableSum};

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRevenueRow {
    pub event_date: Option<NaiveDate>,
    pub event_hour: Option<u32>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub hour: Option<i32>,
    pub total_revenue: Option<f64>,
    pub purchase_count: u64,
    pub total_items_sold: Option<i64>,
    pub avg_order_value: Option<f64>,
}

type HourKey = (
    Option<NaiveDate>,
    Option<u32>,
    Option<i32>,
    Option<i32>,
    Option<i32>,
    Option<i32>,
);

#[derive(Debug, Default)]
struct HourTotals {
    revenue: NullableSum<f64>,
    purchases: u64,
    items: NullableSum<i64>,
}

/// Revenue per hour, built from purchase events only. Every group therefore holds at least one
/// purchase, which is what keeps `avg_order_value` well defined without a guard.
pub fn hourly_revenue(events: &[EnrichedEvent]) -> Vec<HourlyRevenueRow> {
    let mut groups: BTreeMap<HourKey, HourTotals> = BTreeMap::new();

    for event in events.iter().filter(|event| event.event_type.is_purchase()) {
        let key = (
            event.event_date,
            event.event_hour,
            event.year,
            event.month,
            event.day,
            event.hour,
        );
        let totals = groups.entry(key).or_default();
        totals.revenue.add(event.revenue);
        totals.purchases += 1;
        totals.items.add(event.quantity);
    }

    groups
        .into_iter()
        .map(|((event_date, event_hour, year, month, day, hour), totals)| {
            let total_revenue = totals.revenue.value();
            HourlyRevenueRow {
                event_date,
                event_hour,
                year,
                month,
                day,
                hour,
                avg_order_value: total_revenue
                    .map(|total| round2(total / totals.purchases as f64)),
                total_revenue: total_revenue.map(round2),
                purchase_count: totals.purchases,
                total_items_sold: totals.items.value(),
            }
        })
        .collect()
}

impl FrameRow for HourlyRevenueRow {
    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        df!(
            "event_date" => date_strings(rows.iter().map(|r| r.event_date)),
            "event_hour" => rows.iter().map(|r| r.event_hour.map(|h| h as i32)).collect::<Vec<_>>(),
            "year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            "month" => rows.iter().map(|r| r.month).collect::<Vec<_>>(),
            "day" => rows.iter().map(|r| r.day).collect::<Vec<_>>(),
            "hour" => rows.iter().map(|r| r.hour).collect::<Vec<_>>(),
            "total_revenue" => rows.iter().map(|r| r.total_revenue).collect::<Vec<_>>(),
            "purchase_count" => counts(rows.iter().map(|r| r.purchase_count)),
            "total_items_sold" => rows.iter().map(|r| r.total_items_sold).collect::<Vec<_>>(),
            "avg_order_value" => rows.iter().map(|r| r.avg_order_value).collect::<Vec<_>>(),
        )
    }

    fn partition_value(&self, key: &str) -> Option<i32> {
        date_partition_value(key, self.year, self.month, self.day, self.hour)
    }
}
