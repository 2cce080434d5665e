pub const SILVER_EVENTS: &str = "enriched_events";
pub const PRODUCT_FUNNEL: &str = "product_funnel";
pub const HOURLY_REVENUE: &str = "hourly_revenue";
pub const PRODUCT_POPULARITY: &str = "product_popularity";
pub const CATEGORY_DAILY_PERFORMANCE: &str = "category_daily_performance";
pub const DAILY_USER_ACTIVITY: &str = "daily_user_activity";

const DATE_KEYS: &[&str] = &["year", "month", "day"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Silver,
    Gold,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Silver => "silver",
            Layer::Gold => "gold",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub name: &'static str,
    pub layer: Layer,
    pub partition_keys: &'static [&'static str],
    pub description: &'static str,
}

impl TableDescriptor {
    /// Silver tables write straight to their root; gold tables write to `<root>/<name>`.
    pub fn destination(&self, root: &str) -> String {
        match self.layer {
            Layer::Silver => root.to_string(),
            Layer::Gold => format!("{}/{}", root.trim_end_matches('/'), self.name),
        }
    }
}

pub static SILVER_EVENTS_TABLE: TableDescriptor = TableDescriptor {
    name: SILVER_EVENTS,
    layer: Layer::Silver,
    partition_keys: &["year", "month", "day", "hour"],
    description: "Valid events with parsed timestamp, event_date, event_hour and revenue",
};

pub static PRODUCT_FUNNEL_TABLE: TableDescriptor = TableDescriptor {
    name: PRODUCT_FUNNEL,
    layer: Layer::Gold,
    partition_keys: &[],
    description: "View, add-to-cart and purchase counts with conversion rates per product",
};

pub static HOURLY_REVENUE_TABLE: TableDescriptor = TableDescriptor {
    name: HOURLY_REVENUE,
    layer: Layer::Gold,
    partition_keys: DATE_KEYS,
    description: "Revenue, purchases, items sold and average order value per hour",
};

pub static PRODUCT_POPULARITY_TABLE: TableDescriptor = TableDescriptor {
    name: PRODUCT_POPULARITY,
    layer: Layer::Gold,
    partition_keys: &[],
    description: "Page views and unique viewers per product, most viewed first",
};

pub static CATEGORY_DAILY_PERFORMANCE_TABLE: TableDescriptor = TableDescriptor {
    name: CATEGORY_DAILY_PERFORMANCE,
    layer: Layer::Gold,
    partition_keys: DATE_KEYS,
    description: "Event counts by type and revenue per category per day",
};

pub static DAILY_USER_ACTIVITY_TABLE: TableDescriptor = TableDescriptor {
    name: DAILY_USER_ACTIVITY,
    layer: Layer::Gold,
    partition_keys: DATE_KEYS,
    description: "Unique users and sessions per day with per-user ratios",
};

static GOLD_TABLES: [&TableDescriptor; 5] = [
    &PRODUCT_FUNNEL_TABLE,
    &HOURLY_REVENUE_TABLE,
    &PRODUCT_POPULARITY_TABLE,
    &CATEGORY_DAILY_PERFORMANCE_TABLE,
    &DAILY_USER_ACTIVITY_TABLE,
];

pub fn all_gold_tables() -> &'static [&'static TableDescriptor] {
    &GOLD_TABLES
}
