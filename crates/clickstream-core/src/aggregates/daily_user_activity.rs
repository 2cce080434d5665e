use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use polars::prelude::*;

use crate::events::EnrichedEvent;
use crate::frames::{counts, date_partition_value, date_strings, FrameRow};
use crate::metrics::ratio_or_zero;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyUserActivityRow {
    pub event_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub unique_users: u64,
    pub unique_sessions: u64,
    pub total_events: u64,
    pub events_per_user: f64,
    pub sessions_per_user: f64,
}

type DayKey = (Option<NaiveDate>, Option<i32>, Option<i32>, Option<i32>);

#[derive(Debug, Default)]
struct DayTotals<'a> {
    users: HashSet<&'a str>,
    sessions: HashSet<&'a str>,
    events: u64,
}

/// Distinct users and sessions per day across every event type.
pub fn daily_user_activity(events: &[EnrichedEvent]) -> Vec<DailyUserActivityRow> {
    let mut groups: BTreeMap<DayKey, DayTotals<'_>> = BTreeMap::new();

    for event in events {
        let totals = groups
            .entry((event.event_date, event.year, event.month, event.day))
            .or_default();
        totals.users.insert(event.user_id.as_str());
        totals.sessions.insert(event.session_id.as_str());
        totals.events += 1;
    }

    groups
        .into_iter()
        .map(|((event_date, year, month, day), totals)| {
            let unique_users = totals.users.len() as u64;
            let unique_sessions = totals.sessions.len() as u64;
            // A group always has at least one user; the guarded division only matters if a
            // pre-filter is ever introduced here.
            DailyUserActivityRow {
                event_date,
                year,
                month,
                day,
                unique_users,
                unique_sessions,
                total_events: totals.events,
                events_per_user: ratio_or_zero(totals.events, unique_users),
                sessions_per_user: ratio_or_zero(unique_sessions, unique_users),
            }
        })
        .collect()
}

impl FrameRow for DailyUserActivityRow {
    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        df!(
            "event_date" => date_strings(rows.iter().map(|r| r.event_date)),
            "year" => rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            "month" => rows.iter().map(|r| r.month).collect::<Vec<_>>(),
            "day" => rows.iter().map(|r| r.day).collect::<Vec<_>>(),
            "unique_users" => counts(rows.iter().map(|r| r.unique_users)),
            "unique_sessions" => counts(rows.iter().map(|r| r.unique_sessions)),
            "total_events" => counts(rows.iter().map(|r| r.total_events)),
            "events_per_user" => rows.iter().map(|r| r.events_per_user).collect::<Vec<_>>(),
            "sessions_per_user" => rows.iter().map(|r| r.sessions_per_user).collect::<Vec<_>>(),
        )
    }

    fn partition_value(&self, key: &str) -> Option<i32> {
        date_partition_value(key, self.year, self.month, self.day, None)
    }
}
