use clickstream_source::RawEvent;
use serde::Serialize;
use tracing::info;

use crate::events::{EventType, ValidEvent};

/// Row counts around the quality gate. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub rows_removed: usize,
    pub missing_timestamp: usize,
    pub missing_user_id: usize,
    pub missing_session_id: usize,
    pub missing_event_type: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FilteredBatch {
    pub events: Vec<ValidEvent>,
    pub report: FilterReport,
}

impl ValidEvent {
    /// Accepts the row when `timestamp`, `user_id`, `session_id` and `event_type` are all present.
    /// Nothing else is checked: malformed timestamps, negative amounts and unknown event types pass.
    pub fn from_raw(raw: RawEvent) -> Option<Self> {
        let RawEvent {
            timestamp: Some(timestamp),
            user_id: Some(user_id),
            session_id: Some(session_id),
            event_type: Some(event_type),
            product_id,
            price,
            quantity,
            category,
            search_query,
            year,
            month,
            day,
            hour,
        } = raw
        else {
            return None;
        };

        Some(Self {
            timestamp,
            user_id,
            session_id,
            event_type: EventType::from(event_type),
            product_id,
            price,
            quantity,
            category,
            search_query,
            year,
            month,
            day,
            hour,
        })
    }
}

/// Drops every row missing one of the identifying fields.
pub fn apply_quality_filter(events: Vec<RawEvent>) -> FilteredBatch {
    let mut report = FilterReport {
        rows_in: events.len(),
        ..FilterReport::default()
    };
    let mut kept = Vec::with_capacity(events.len());

    for raw in events {
        report.missing_timestamp += usize::from(raw.timestamp.is_none());
        report.missing_user_id += usize::from(raw.user_id.is_none());
        report.missing_session_id += usize::from(raw.session_id.is_none());
        report.missing_event_type += usize::from(raw.event_type.is_none());

        if let Some(valid) = ValidEvent::from_raw(raw) {
            kept.push(valid);
        }
    }

    report.rows_out = kept.len();
    report.rows_removed = report.rows_in - report.rows_out;

    info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        rows_removed = report.rows_removed,
        "Data quality check: {} invalid records removed",
        report.rows_removed
    );

    FilteredBatch {
        events: kept,
        report,
    }
}
