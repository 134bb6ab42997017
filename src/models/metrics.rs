use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Funnel counters for one calendar day, upserted by the nightly worker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyMetric {
    pub metric_date: NaiveDate,
    pub total_inquiries: i64,
    pub qualified_leads: i64,
    pub tours_scheduled: i64,
    pub tours_completed: i64,
}

/// Rolled-up totals across a range of daily rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricTotals {
    pub total_inquiries: i64,
    pub qualified_leads: i64,
    pub tours_scheduled: i64,
    pub tours_completed: i64,
}

impl MetricTotals {
    pub fn from_days(days: &[DailyMetric]) -> Self {
        let mut totals = Self::default();
        for day in days {
            totals.total_inquiries += day.total_inquiries;
            totals.qualified_leads += day.qualified_leads;
            totals.tours_scheduled += day.tours_scheduled;
            totals.tours_completed += day.tours_completed;
        }
        totals
    }
}
