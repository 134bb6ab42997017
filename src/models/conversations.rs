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
#[sqlx(type_name = "message_direction", rename_all = "snake_case")]
pub enum MessageDirection {
    User,
    Bot,
}

/// One turn of a lead's conversation. Append-only; the recent slice doubles
/// as generator context and as the duplicate-detection window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub direction: MessageDirection,
    pub content: String,
    pub external_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConversationMessage {
    pub lead_id: Uuid,
    pub direction: MessageDirection,
    pub content: String,
    pub external_id: Option<String>,
}

/// The most recent user-authored message in a history slice, if any.
pub fn last_user_message(history: &[ConversationMessage]) -> Option<&ConversationMessage> {
    history
        .iter()
        .rev()
        .find(|m| m.direction == MessageDirection::User)
}
