use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

pub const PAGE_VIEW: &str = "page_view";
pub const ADD_TO_CART: &str = "add_to_cart";
pub const PURCHASE: &str = "purchase";

/// Activity kind. Values outside the funnel are kept verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    PageView,
    AddToCart,
    Purchase,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::PageView => PAGE_VIEW,
            EventType::AddToCart => ADD_TO_CART,
            EventType::Purchase => PURCHASE,
            EventType::Other(value) => value,
        }
    }

    pub fn is_page_view(&self) -> bool {
        matches!(self, EventType::PageView)
    }

    pub fn is_add_to_cart(&self) -> bool {
        matches!(self, EventType::AddToCart)
    }

    pub fn is_purchase(&self) -> bool {
        matches!(self, EventType::Purchase)
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            PAGE_VIEW => EventType::PageView,
            ADD_TO_CART => EventType::AddToCart,
            PURCHASE => EventType::Purchase,
            _ => EventType::Other(value),
        }
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        EventType::from(value.to_string())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw event that carries all four identifying fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEvent {
    pub timestamp: String,
    pub user_id: String,
    pub session_id: String,
    pub event_type: EventType,
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

/// Silver-layer row: a valid event with its timestamp parsed and derived fields attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEvent {
    pub timestamp: Option<DateTime<Utc>>,
    pub event_date: Option<NaiveDate>,
    pub event_hour: Option<u32>,
    pub user_id: String,
    pub session_id: String,
    pub event_type: EventType,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    /// `None` only for a purchase whose price or quantity is missing.
    pub revenue: Option<f64>,
    pub category: Option<String>,
    pub search_query: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub hour: Option<i32>,
}

pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
