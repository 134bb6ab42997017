//! Funnel metrics readout: the last seven daily rows plus totals.

use crate::error::Result;
use crate::models::metrics::MetricTotals;
use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::{Days, Utc};

const WINDOW_DAYS: u64 = 7;

pub async fn metrics_summary(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let timezone = state.config.timezone();
    let today = Utc::now().with_timezone(&timezone).date_naive();
    let start = today
        .checked_sub_days(Days::new(WINDOW_DAYS - 1))
        .unwrap_or(today);

    let daily_metrics = state.store.daily_metrics_between(start, today).await?;
    let totals = MetricTotals::from_days(&daily_metrics);

    Ok(Json(serde_json::json!({
        "daily_metrics": daily_metrics,
        "totals_last_7_days": totals,
        "timestamp": Utc::now(),
    })))
}
