use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Canceled,
    Completed,
}

/// A booked viewing tour, created from a calendar-provider webhook.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub unit_id: Option<Uuid>,
    /// Event id assigned by the calendar provider; cancellation webhooks
    /// reference the appointment through it.
    pub external_event_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub attendee_email: Option<String>,
    pub attendee_name: Option<String>,
    pub location: Option<String>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub lead_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub external_event_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub attendee_email: Option<String>,
    pub attendee_name: Option<String>,
    pub location: Option<String>,
    pub duration_minutes: i32,
}
