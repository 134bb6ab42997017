use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::appointments::{Appointment, AppointmentStatus, NewAppointment},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, lead_id, unit_id, external_event_id, scheduled_at, \
     attendee_email, attendee_name, location, duration_minutes, status, created_at, updated_at";

pub async fn create_appointment(
    conn: &mut DbConn,
    new_appointment: NewAppointment,
) -> Result<Appointment> {
    let appointment = sqlx::query_as::<_, Appointment>(&format!(
        r#"
        INSERT INTO appointments
            (lead_id, unit_id, external_event_id, scheduled_at,
             attendee_email, attendee_name, location, duration_minutes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(new_appointment.lead_id)
    .bind(new_appointment.unit_id)
    .bind(&new_appointment.external_event_id)
    .bind(new_appointment.scheduled_at)
    .bind(&new_appointment.attendee_email)
    .bind(&new_appointment.attendee_name)
    .bind(&new_appointment.location)
    .bind(new_appointment.duration_minutes)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(appointment)
}

/// Looks an appointment up by the calendar provider's event id.
pub async fn get_by_external_event_id(
    conn: &mut DbConn,
    external_event_id: &str,
) -> Result<Option<Appointment>> {
    let appointment = sqlx::query_as::<_, Appointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE external_event_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#
    ))
    .bind(external_event_id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(appointment)
}

pub async fn update_status(
    conn: &mut DbConn,
    id: Uuid,
    status: AppointmentStatus,
) -> Result<Appointment> {
    let appointment = sqlx::query_as::<_, Appointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $2, updated_at = now()
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?
    .ok_or_else(|| Error::NotFound(format!("Appointment with ID {} not found", id)))?;

    Ok(appointment)
}

/// Counts appointments created in the range, optionally by current status.
pub async fn count_created_between(
    conn: &mut DbConn,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: Option<AppointmentStatus>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM appointments
        WHERE created_at >= $1 AND created_at <= $2
          AND ($3::appointment_status IS NULL OR status = $3)
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(status)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count)
}

/// Counts completed appointments whose tour fell inside the range.
pub async fn count_completed_between(
    conn: &mut DbConn,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM appointments
        WHERE status = 'completed'
          AND scheduled_at >= $1 AND scheduled_at <= $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(count)
}
