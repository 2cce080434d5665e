//! Gold-layer aggregations. Each is a pure function of the enriched batch and none depends on
//! another, so they may be evaluated in any order.

mod category_daily;
mod daily_user_activity;
mod hourly_revenue;
mod product_funnel;
mod product_popularity;

pub use category_daily::{category_daily_performance, CategoryDailyRow};
pub use daily_user_activity::{daily_user_activity, DailyUserActivityRow};
pub use hourly_revenue::{hourly_revenue, HourlyRevenueRow};
pub use product_funnel::{product_funnel, ProductFunnelRow};
pub use product_popularity::{product_popularity, ProductPopularityRow};

use crate::events::EnrichedEvent;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldTables {
    pub product_funnel: Vec<ProductFunnelRow>,
    pub hourly_revenue: Vec<HourlyRevenueRow>,
    pub product_popularity: Vec<ProductPopularityRow>,
    pub category_daily_performance: Vec<CategoryDailyRow>,
    pub daily_user_activity: Vec<DailyUserActivityRow>,
}

pub fn aggregate_all(events: &[EnrichedEvent]) -> GoldTables {
    GoldTables {
        product_funnel: product_funnel(events),
        hourly_revenue: hourly_revenue(events),
        product_popularity: product_popularity(events),
        category_daily_performance: category_daily_performance(events),
        daily_user_activity: daily_user_activity(events),
    }
}
