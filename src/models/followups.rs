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
#[sqlx(type_name = "followup_status", rename_all = "snake_case")]
pub enum FollowupStatus {
    Pending,
    Sent,
    Canceled,
}

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
#[sqlx(type_name = "followup_kind", rename_all = "snake_case")]
pub enum FollowupKind {
    EveningBefore,
    MorningOf,
    ThreeHoursBefore,
    Nudge,
}

/// A message scheduled for later delivery by the dispatch worker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Followup {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub kind: FollowupKind,
    pub content: String,
    pub send_at: DateTime<Utc>,
    pub status: FollowupStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFollowup {
    pub lead_id: Uuid,
    pub kind: FollowupKind,
    pub content: String,
    pub send_at: DateTime<Utc>,
}
