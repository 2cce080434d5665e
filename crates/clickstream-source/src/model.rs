use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::partitions::HivePartitions;

/// One activity record exactly as it arrived from the source. Every field is nullable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub timestamp: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub event_type: Option<String>,
    pub product_id: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub category: Option<String>,
    pub search_query: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub hour: Option<i32>,
}

impl RawEvent {
    /// Builds an event from a decoded JSON value.
    ///
    /// Extraction is permissive: numbers may arrive as numeric strings and scalar ids may arrive
    /// as numbers. A field of an unusable type becomes null instead of failing the record, and a
    /// non-object value yields an all-null event.
    pub fn from_json_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        Self {
            timestamp: string_field(map, "timestamp"),
            user_id: string_field(map, "user_id"),
            session_id: string_field(map, "session_id"),
            event_type: string_field(map, "event_type"),
            product_id: string_field(map, "product_id"),
            price: f64_field(map, "price"),
            quantity: i64_field(map, "quantity"),
            category: string_field(map, "category"),
            search_query: string_field(map, "search_query"),
            year: i32_field(map, "year"),
            month: i32_field(map, "month"),
            day: i32_field(map, "day"),
            hour: i32_field(map, "hour"),
        }
    }

    /// Fills partition fields the record itself does not carry. Values already present win.
    pub fn fill_missing_partitions(&mut self, partitions: &HivePartitions) {
        self.year = self.year.or(partitions.year);
        self.month = self.month.or(partitions.month);
        self.day = self.day.or(partitions.day);
        self.hour = self.hour.or(partitions.hour);
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn f64_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_optional_f64(text),
        _ => None,
    }
}

fn i64_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.fract() == 0.0)
                .map(|value| value as i64)
        }),
        Value::String(text) => parse_optional_i64(text),
        _ => None,
    }
}

fn i32_field(map: &Map<String, Value>, key: &str) -> Option<i32> {
    i64_field(map, key).and_then(|value| i32::try_from(value).ok())
}

pub(crate) fn parse_optional_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

pub(crate) fn parse_optional_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}
