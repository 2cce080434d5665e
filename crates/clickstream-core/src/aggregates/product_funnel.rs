use std::collections::BTreeMap;

use polars::prelude::*;

use crate::events::{EnrichedEvent, EventType};
use crate::frames::{counts, FrameRow};
use crate::metrics::percent_or_zero;

/// View → cart → purchase conversion per product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFunnelRow {
    pub product_id: String,
    pub category: Option<String>,
    pub view_count: u64,
    pub add_to_cart_count: u64,
    pub purchase_count: u64,
    pub view_to_cart_rate: f64,
    pub cart_to_purchase_rate: f64,
    pub view_to_purchase_rate: f64,
}

#[derive(Debug, Default)]
struct FunnelCounts {
    views: u64,
    carts: u64,
    purchases: u64,
}

impl FunnelCounts {
    fn record(&mut self, event_type: &EventType) {
        self.views += u64::from(event_type.is_page_view());
        self.carts += u64::from(event_type.is_add_to_cart());
        self.purchases += u64::from(event_type.is_purchase());
    }
}

pub fn product_funnel(events: &[EnrichedEvent]) -> Vec<ProductFunnelRow> {
    let mut groups: BTreeMap<(&str, Option<&str>), FunnelCounts> = BTreeMap::new();

    for event in events {
        let Some(product_id) = event.product_id.as_deref() else {
            continue;
        };
        groups
            .entry((product_id, event.category.as_deref()))
            .or_default()
            .record(&event.event_type);
    }

    groups
        .into_iter()
        .map(|((product_id, category), counts)| ProductFunnelRow {
            product_id: product_id.to_string(),
            category: category.map(str::to_string),
            view_count: counts.views,
            add_to_cart_count: counts.carts,
            purchase_count: counts.purchases,
            view_to_cart_rate: percent_or_zero(counts.carts, counts.views),
            cart_to_purchase_rate: percent_or_zero(counts.purchases, counts.carts),
            view_to_purchase_rate: percent_or_zero(counts.purchases, counts.views),
        })
        .collect()
}

impl FrameRow for ProductFunnelRow {
    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        df!(
            "product_id" => rows.iter().map(|r| r.product_id.as_str()).collect::<Vec<_>>(),
            "category" => rows.iter().map(|r| r.category.as_deref()).collect::<Vec<_>>(),
            "view_count" => counts(rows.iter().map(|r| r.view_count)),
            "add_to_cart_count" => counts(rows.iter().map(|r| r.add_to_cart_count)),
            "purchase_count" => counts(rows.iter().map(|r| r.purchase_count)),
            "view_to_cart_rate" => rows.iter().map(|r| r.view_to_cart_rate).collect::<Vec<_>>(),
            "cart_to_purchase_rate" => rows.iter().map(|r| r.cart_to_purchase_rate).collect::<Vec<_>>(),
            "view_to_purchase_rate" => rows.iter().map(|r| r.view_to_purchase_rate).collect::<Vec<_>>(),
        )
    }
}
