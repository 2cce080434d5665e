use chrono::{Datelike, Timelike};
use serde::Serialize;
use tracing::{info, warn};

use crate::events::{EnrichedEvent, EventType, ValidEvent};
use crate::metrics::round2;
use crate::timestamps::parse_event_timestamp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichReport {
    pub rows: usize,
    pub unparsed_timestamps: usize,
    pub undefined_revenue: usize,
    pub partition_mismatches: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EnrichedBatch {
    pub events: Vec<EnrichedEvent>,
    pub report: EnrichReport,
}

/// `round(price * quantity, 2)` for purchases, `0.0` for everything else.
/// A purchase missing either operand has no defined revenue and yields `None`.
pub fn compute_revenue(
    event_type: &EventType,
    price: Option<f64>,
    quantity: Option<i64>,
) -> Option<f64> {
    if !event_type.is_purchase() {
        return Some(0.0);
    }
    match (price, quantity) {
        (Some(price), Some(quantity)) => Some(round2(price * quantity as f64)),
        _ => None,
    }
}

pub fn enrich_event(event: ValidEvent) -> EnrichedEvent {
    let timestamp = parse_event_timestamp(&event.timestamp);
    let revenue = compute_revenue(&event.event_type, event.price, event.quantity);

    EnrichedEvent {
        timestamp,
        event_date: timestamp.map(|ts| ts.date_naive()),
        event_hour: timestamp.map(|ts| ts.hour()),
        user_id: event.user_id,
        session_id: event.session_id,
        event_type: event.event_type,
        product_id: event.product_id,
        quantity: event.quantity,
        price: event.price,
        revenue,
        category: event.category,
        search_query: event.search_query,
        year: event.year,
        month: event.month,
        day: event.day,
        hour: event.hour,
    }
}

/// True when the upstream partition fields agree with the parsed timestamp, or when there is no
/// parsed timestamp to compare against.
pub fn partitions_match_timestamp(event: &EnrichedEvent) -> bool {
    let Some(ts) = event.timestamp else {
        return true;
    };
    let expected = (
        Some(ts.year()),
        Some(ts.month() as i32),
        Some(ts.day() as i32),
        Some(ts.hour() as i32),
    );
    (event.year, event.month, event.day, event.hour) == expected
}

pub fn enrich_events(events: Vec<ValidEvent>) -> EnrichedBatch {
    let mut report = EnrichReport {
        rows: events.len(),
        ..EnrichReport::default()
    };

    let enriched: Vec<EnrichedEvent> = events
        .into_iter()
        .map(|event| {
            let enriched = enrich_event(event);
            report.unparsed_timestamps += usize::from(enriched.timestamp.is_none());
            report.undefined_revenue += usize::from(enriched.revenue.is_none());
            report.partition_mismatches += usize::from(!partitions_match_timestamp(&enriched));
            enriched
        })
        .collect();

    if report.unparsed_timestamps > 0 {
        warn!(
            rows = report.unparsed_timestamps,
            "timestamps failed ISO-8601 parsing; event_date/event_hour left null"
        );
    }
    if report.undefined_revenue > 0 {
        warn!(
            rows = report.undefined_revenue,
            "purchase events without price or quantity; revenue left null"
        );
    }
    if report.partition_mismatches > 0 {
        warn!(
            rows = report.partition_mismatches,
            "partition fields disagree with parsed timestamp"
        );
    }
    info!(rows = report.rows, "Silver layer records: {}", report.rows);

    EnrichedBatch {
        events: enriched,
        report,
    }
}
