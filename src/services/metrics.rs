//! Daily funnel metrics: computed from aggregate counts once a day.

use crate::error::Result;
use crate::models::appointments::AppointmentStatus;
use crate::models::leads::LeadStage;
use crate::models::metrics::DailyMetric;
use crate::store::ConversationStore;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The UTC bounds of one business-local calendar day.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = tz
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// Computes the funnel counters for one day. Individual count failures do
/// not exist here by design: a store error aborts the computation and the
/// caller logs it, next tick tries again.
pub async fn compute_daily_metrics(
    store: &dyn ConversationStore,
    date: NaiveDate,
    tz: Tz,
) -> Result<DailyMetric> {
    let (start, end) = day_bounds(date, tz);

    let total_inquiries = store.count_leads_created_between(start, end, None).await?;
    let qualified_leads = store
        .count_leads_created_between(start, end, Some(LeadStage::Qualified))
        .await?;
    let tours_scheduled = store
        .count_appointments_created_between(start, end, Some(AppointmentStatus::Scheduled))
        .await?;
    let tours_completed = store
        .count_appointments_completed_between(start, end)
        .await?;

    Ok(DailyMetric {
        metric_date: date,
        total_inquiries,
        qualified_leads,
        tours_scheduled,
        tours_completed,
    })
}
