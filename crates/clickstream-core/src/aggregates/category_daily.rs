use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::*;

use crate::events::EnrichedEvent;
use crate::frames::{counts, date_partition_value, date_strings, FrameRow};
use crate::metrics::{round2, NullableSum};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDailyRow {
    pub event_date: Option<NaiveDate>,
    pub category: String,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub total_events: u64,
    pub page_views: u64,
    pub add_to_carts: u64,
    pub purchases: u64,
    pub total_revenue: Option<f64>,
}

type CategoryDayKey<'a> = (
    Option<NaiveDate>,
    &'a str,
    Option<i32>,
    Option<i32>,
    Option<i32>,
);

#[derive(Debug, Default)]
struct CategoryTotals {
    events: u64,
    page_views: u64,
    add_to_carts: u64,
    purchases: u64,
    revenue: NullableSum<f64>,
}

pub fn category_daily_performance(events: &[EnrichedEvent]) -> Vec<CategoryDailyRow> {
    let mut groups: BTreeMap<CategoryDayKey<'_>, CategoryTotals> = BTreeMap::new();

    for event in events {
        let Some(category) = event.category.as_deref() else {
            continue;
        };
        let totals = groups
            .entry((event.event_date, category, event.year, event.month, event.day))
            .or_default();
        totals.events += 1;
        totals.page_views += u64::from(event.event_type.is_page_view());
        totals.add_to_carts += u64::from(event.event_type.is_add_to_cart());
        totals.purchases += u64::from(event.event_type.is_purchase());
        totals.revenue.add(event.revenue);
    }

    groups
        .into_iter()
        .map(
            |((event_date, category, year, month, day), totals)| CategoryDailyRow {
                event_date,
                category: category.to_string(),
                year,
                month,
                day,
                total_events: totals.events,
                page_views: totals.page_views,
                add_to_carts: totals.add_to_carts,
                purchases: totals.purchases,
                total_revenue: totals.revenue.value().map(round2),
            },
        )
        .collect()
}

impl FrameRow for CategoryDailyRow {
    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        df!(
            "event_date" => date_strings(rows.iter().map(|r| r.event_date)),
            "category" => rows.iter().map(|r| r.category.as_str()).collect::<Vec<_>>(),
            "year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            "month" => rows.iter().map(|r| r.month).collect::<Vec<_>>(),
            "day" => rows.iter().map(|r| r.day).collect::<Vec<_>>(),
            "total_events" => counts(rows.iter().map(|r| r.total_events)),
            "page_views" => counts(rows.iter().map(|r| r.page_views)),
            "add_to_carts" => counts(rows.iter().map(|r| r.add_to_carts)),
            "purchases" => counts(rows.iter().map(|r| r.purchases)),
            "total_revenue" => rows.iter().map(|r| r.total_revenue).collect::<Vec<_>>(),
        )
    }

    fn partition_value(&self, key: &str) -> Option<i32> {
        date_partition_value(key, self.year, self.month, self.day, None)
    }
}
