use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// The closed set of stages a lead moves through.
///
/// `GateFailed`, `NoFit` and `FutureFit` belong to the stricter gate-question
/// variant of the qualification flow; they stay representable so stored rows
/// from that variant remain readable, and a new message from a lead parked in
/// one of them re-enters profile collection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "lead_stage", rename_all = "snake_case")]
pub enum LeadStage {
    New,
    CollectingProfile,
    Qualified,
    SchedulingInProgress,
    TourScheduled,
    GateFailed,
    NoFit,
    FutureFit,
}

impl LeadStage {
    /// Stages that normally end a conversation. Transitions out remain legal
    /// when new information arrives (a canceled tour regresses the lead).
    pub fn is_settled(self) -> bool {
        matches!(self, Self::TourScheduled | Self::NoFit | Self::FutureFit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub phone_number: String,
    pub name: Option<String>,
    /// Identity key for matching calendar bookings back to the lead.
    pub email: Option<String>,
    pub stage: LeadStage,
    pub preferred_area: Option<String>,
    pub rooms: Option<i32>,
    pub budget: Option<i64>,
    pub has_parking: Option<bool>,
    pub has_payslips: Option<bool>,
    pub can_pay_deposit: Option<bool>,
    pub move_in_date: Option<NaiveDate>,
    pub last_interaction: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Whether a usable display name has been collected. WhatsApp profile
    /// names arrive as placeholders often enough that they are not trusted.
    pub fn has_name(&self) -> bool {
        match self.name.as_deref() {
            None => false,
            Some(name) => {
                let trimmed = name.trim();
                !trimmed.is_empty() && trimmed != "Unknown" && trimmed != "..."
            }
        }
    }

    pub fn profile_complete(&self) -> bool {
        self.has_name() && self.preferred_area.is_some() && self.rooms.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub phone_number: String,
    pub name: Option<String>,
}

/// A partial update; `None` fields are left untouched in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub stage: Option<LeadStage>,
    pub preferred_area: Option<String>,
    pub rooms: Option<i32>,
    pub budget: Option<i64>,
    pub has_parking: Option<bool>,
    pub has_payslips: Option<bool>,
    pub can_pay_deposit: Option<bool>,
    pub move_in_date: Option<NaiveDate>,
}

impl LeadUpdate {
    pub fn stage(stage: LeadStage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.stage.is_none()
            && self.preferred_area.is_none()
            && self.rooms.is_none()
            && self.budget.is_none()
            && self.has_parking.is_none()
            && self.has_payslips.is_none()
            && self.can_pay_deposit.is_none()
            && self.move_in_date.is_none()
    }
}
