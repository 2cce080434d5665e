use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;

use crate::events::EnrichedEvent;
use crate::frames::{counts, FrameRow};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductPopularityRow {
    pub product_id: String,
    pub category: Option<String>,
    pub view_count: u64,
    pub unique_viewers: u64,
}

#[derive(Debug, Default)]
struct ViewTotals<'a> {
    views: u64,
    viewers: HashSet<&'a str>,
}

/// Page views and exact distinct viewers per product, most viewed first.
/// Products with equal view counts keep ascending `(product_id, category)` order.
pub fn product_popularity(events: &[EnrichedEvent]) -> Vec<ProductPopularityRow> {
    let mut groups: BTreeMap<(&str, Option<&str>), ViewTotals<'_>> = BTreeMap::new();

    for event in events.iter().filter(|event| event.event_type.is_page_view()) {
        let Some(product_id) = event.product_id.as_deref() else {
            continue;
        };
        let totals = groups
            .entry((product_id, event.category.as_deref()))
            .or_default();
        totals.views += 1;
        totals.viewers.insert(event.user_id.as_str());
    }

    let mut rows: Vec<ProductPopularityRow> = groups
        .into_iter()
        .map(|((product_id, category), totals)| ProductPopularityRow {
            product_id: product_id.to_string(),
            category: category.map(str::to_string),
            view_count: totals.views,
            unique_viewers: totals.viewers.len() as u64,
        })
        .collect();

    rows.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    rows
}

impl FrameRow for ProductPopularityRow {
    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        df!(
            "product_id" => rows.iter().map(|r| r.product_id.as_str()).collect::<Vec<_>>(),
            "category" => rows.iter().map(|r| r.category.as_deref()).collect::<Vec<_>>(),
            "view_count" => counts(rows.iter().map(|r| r.view_count)),
            "unique_viewers" => counts(rows.iter().map(|r| r.unique_viewers)),
        )
    }
}
