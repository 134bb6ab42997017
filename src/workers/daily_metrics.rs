use crate::services::metrics::compute_daily_metrics;
use crate::store::ConversationStore;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{error, info};

/// Local wall-clock time the daily rollup runs at.
const RUN_AT: NaiveTime = NaiveTime::from_hms_opt(23, 55, 0).unwrap();

/// Background worker that upserts the daily metrics row
///
/// Sleeps until 23:55 business-local time, rolls up the counters for the
/// current local date, then sleeps until the next day.
pub async fn daily_metrics_worker(
    store: Arc<dyn ConversationStore>,
    timezone: Tz,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    info!("Daily metrics worker started (runs daily at 23:55 local)");

    loop {
        let now = Utc::now();
        let next_run = next_run_after(now, timezone);
        let sleep_for = (next_run - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(60));

        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Daily metrics worker shutting down");
                break;
            }
            _ = tokio::time::sleep(sleep_for) => {
                let today = Utc::now().with_timezone(&timezone).date_naive();
                match compute_daily_metrics(store.as_ref(), today, timezone).await {
                    Ok(metric) => {
                        if let Err(e) = store.upsert_daily_metric(&metric).await {
                            error!("Failed to save daily metrics: {}", e);
                        } else {
                            info!(
                                "Daily metrics saved for {}: {} inquiries, {} qualified, {} scheduled, {} completed",
                                metric.metric_date,
                                metric.total_inquiries,
                                metric.qualified_leads,
                                metric.tours_scheduled,
                                metric.tours_completed,
                            );
                        }
                    }
                    Err(e) => error!("Failed to compute daily metrics: {}", e),
                }
            }
        }
    }

    info!("Daily metrics worker stopped");
}

/// The next 23:55 local strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local_now = now.with_timezone(&tz);
    let today_run = tz
        .from_local_datetime(&local_now.date_naive().and_time(RUN_AT))
        .earliest();

    match today_run {
        Some(run) if run.with_timezone(&Utc) > now => run.with_timezone(&Utc),
        _ => {
            let tomorrow = local_now.date_naive() + chrono::Days::new(1);
            tz.from_local_datetime(&tomorrow.and_time(RUN_AT))
                .earliest()
                .map(|run| run.with_timezone(&Utc))
                .unwrap_or(now + chrono::Duration::days(1))
        }
    }
}
