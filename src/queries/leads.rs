use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::leads::{Lead, LeadStage, LeadUpdate, NewLead},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const LEAD_COLUMNS: &str = "id, phone_number, name, email, stage, preferred_area, rooms, budget, \
     has_parking, has_payslips, can_pay_deposit, move_in_date, last_interaction, created_at";

/// Creates a new lead in stage `new`.
pub async fn create_lead(conn: &mut DbConn, new_lead: NewLead) -> Result<Lead> {
    let lead = sqlx::query_as::<_, Lead>(&format!(
        r#"
        INSERT INTO leads (phone_number, name)
        VALUES ($1, $2)
        RETURNING {LEAD_COLUMNS}
        "#
    ))
    .bind(&new_lead.phone_number)
    .bind(&new_lead.name)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(lead)
}

/// Gets a lead by phone number. The lead may not exist.
pub async fn get_lead_by_phone(conn: &mut DbConn, phone_number: &str) -> Result<Option<Lead>> {
    let lead = sqlx::query_as::<_, Lead>(&format!(
        r#"
        SELECT {LEAD_COLUMNS}
        FROM leads
        WHERE phone_number = $1
        "#
    ))
    .bind(phone_number)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(lead)
}

/// Gets a lead by id. The lead may not exist.
pub async fn get_lead_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Lead>> {
    let lead = sqlx::query_as::<_, Lead>(&format!(
        r#"
        SELECT {LEAD_COLUMNS}
        FROM leads
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(lead)
}

/// Gets the most recently active lead carrying the given email.
pub async fn get_lead_by_email(conn: &mut DbConn, email: &str) -> Result<Option<Lead>> {
    let lead = sqlx::query_as::<_, Lead>(&format!(
        r#"
        SELECT {LEAD_COLUMNS}
        FROM leads
        WHERE email = $1
        ORDER BY last_interaction DESC
        LIMIT 1
        "#
    ))
    .bind(email)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(lead)
}

/// Applies a partial update. Absent fields keep their stored value;
/// `last_interaction` is always refreshed.
pub async fn update_lead(conn: &mut DbConn, id: Uuid, update: &LeadUpdate) -> Result<Lead> {
    let lead = sqlx::query_as::<_, Lead>(&format!(
        r#"
        UPDATE leads SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            stage = COALESCE($4, stage),
            preferred_area = COALESCE($5, preferred_area),
            rooms = COALESCE($6, rooms),
            budget = COALESCE($7, budget),
            has_parking = COALESCE($8, has_parking),
            has_payslips = COALESCE($9, has_payslips),
            can_pay_deposit = COALESCE($10, can_pay_deposit),
            move_in_date = COALESCE($11, move_in_date),
            last_interaction = now()
        WHERE id = $1
        RETURNING {LEAD_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&update.name)
    .bind(&update.email)
    .bind(update.stage)
    .bind(&update.preferred_area)
    .bind(update.rooms)
    .bind(update.budget)
    .bind(update.has_parking)
    .bind(update.has_payslips)
    .bind(update.can_pay_deposit)
    .bind(update.move_in_date)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?
    .ok_or_else(|| Error::NotFound(format!("Lead with ID {} not found", id)))?;

    Ok(lead)
}

/// Refreshes `last_interaction` without touching any profile field.
pub async fn touch_lead(conn: &mut DbConn, id: Uuid) -> Result<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE leads
        SET last_interaction = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    if rows_affected == 0 {
        return Err(Error::NotFound(format!("Lead with ID {} not found", id)));
    }

    Ok(())
}

/// Leads sitting in `stage` with no interaction since `cutoff`.
pub async fn get_stale_leads(
    conn: &mut DbConn,
    stage: LeadStage,
    cutoff: DateTime<Utc>,
) -> Result<Vec<Lead>> {
    let leads = sqlx::query_as::<_, Lead>(&format!(
        r#"
        SELECT {LEAD_COLUMNS}
        FROM leads
        WHERE stage = $1 AND last_interaction < $2
        ORDER BY last_interaction ASC
        "#
    ))
    .bind(stage)
    .bind(cutoff)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(leads)
}

/// Leads in `stage` active since `since`, most recent first.
pub async fn get_recent_leads_by_stage(
    conn: &mut DbConn,
    stage: LeadStage,
    since: DateTime<Utc>,
) -> Result<Vec<Lead>> {
    let leads = sqlx::query_as::<_, Lead>(&format!(
        r#"
        SELECT {LEAD_COLUMNS}
        FROM leads
        WHERE stage = $1 AND last_interaction >= $2
        ORDER BY last_interaction DESC
        "#
    ))
    .bind(stage)
    .bind(since)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(leads)
}

/// Counts leads created in the range, optionally restricted to their
/// current stage.
pub async fn count_leads_created_between(
    conn: &mut DbConn,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    stage: Option<LeadStage>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM leads
        WHERE created_at >= $1 AND created_at <= $2
          AND ($3::lead_stage IS NULL OR stage = $3)
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(stage)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count)
}
