use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::metrics::DailyMetric,
};
use chrono::NaiveDate;

/// Inserts or replaces the counters for one day.
pub async fn upsert_daily_metric(conn: &mut DbConn, metric: &DailyMetric) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_metrics
            (metric_date, total_inquiries, qualified_leads, tours_scheduled, tours_completed)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (metric_date) DO UPDATE SET
            total_inquiries = EXCLUDED.total_inquiries,
            qualified_leads = EXCLUDED.qualified_leads,
            tours_scheduled = EXCLUDED.tours_scheduled,
            tours_completed = EXCLUDED.tours_completed
        "#,
    )
    .bind(metric.metric_date)
    .bind(metric.total_inquiries)
    .bind(metric.qualified_leads)
    .bind(metric.tours_scheduled)
    .bind(metric.tours_completed)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(())
}

/// Daily rows in the inclusive range, newest first.
pub async fn get_between(
    conn: &mut DbConn,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyMetric>> {
    let metrics = sqlx::query_as::<_, DailyMetric>(
        r#"
        SELECT metric_date, total_inquiries, qualified_leads, tours_scheduled, tours_completed
        FROM daily_metrics
        WHERE metric_date >= $1 AND metric_date <= $2
        ORDER BY metric_date DESC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(metrics)
}
