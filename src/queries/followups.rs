use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::followups::{Followup, NewFollowup},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const FOLLOWUP_COLUMNS: &str = "id, lead_id, kind, content, send_at, status, created_at, sent_at";

pub async fn create_followup(conn: &mut DbConn, new_followup: NewFollowup) -> Result<Followup> {
    let followup = sqlx::query_as::<_, Followup>(&format!(
        r#"
        INSERT INTO followups (lead_id, kind, content, send_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {FOLLOWUP_COLUMNS}
        "#
    ))
    .bind(new_followup.lead_id)
    .bind(new_followup.kind)
    .bind(&new_followup.content)
    .bind(new_followup.send_at)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(followup)
}

/// Pending followups whose send time has arrived.
pub async fn get_due_followups(conn: &mut DbConn, now: DateTime<Utc>) -> Result<Vec<Followup>> {
    let followups = sqlx::query_as::<_, Followup>(&format!(
        r#"
        SELECT {FOLLOWUP_COLUMNS}
        FROM followups
        WHERE status = 'pending' AND send_at <= $1
        ORDER BY send_at ASC
        "#
    ))
    .bind(now)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(followups)
}

pub async fn mark_sent(conn: &mut DbConn, id: Uuid) -> Result<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE followups
        SET status = 'sent', sent_at = now()
        WHERE id = $1 AND status = 'pending'
        "#,
    )
    .bind(id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    if rows_affected == 0 {
        return Err(Error::NotFound(format!(
            "Pending followup with ID {} not found",
            id
        )));
    }

    Ok(())
}

/// Cancels every pending followup for a lead; returns how many were hit.
pub async fn cancel_pending_for_lead(conn: &mut DbConn, lead_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE followups
        SET status = 'canceled'
        WHERE lead_id = $1 AND status = 'pending'
        "#,
    )
    .bind(lead_id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
