//! Wire types for the two inbound webhook providers.
//!
//! The WhatsApp Business API wraps every event in an entry/changes envelope;
//! only text messages addressed to our phone number are processed. The
//! Calendly envelope carries an event name plus invitee/event details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WhatsApp
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppWebhook {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WhatsAppEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppEntry {
    #[serde(default)]
    pub changes: Vec<WhatsAppChange>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppChange {
    pub value: WhatsAppChangeValue,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WhatsAppChangeValue {
    #[serde(default)]
    pub metadata: Option<WhatsAppMetadata>,
    #[serde(default)]
    pub contacts: Vec<WhatsAppContact>,
    #[serde(default)]
    pub messages: Vec<WhatsAppMessage>,
    /// Delivery/read receipts. Present means "acknowledge and ignore".
    #[serde(default)]
    pub statuses: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppMetadata {
    #[serde(default)]
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppContact {
    pub wa_id: String,
    pub profile: WhatsAppProfile,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppProfile {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<WhatsAppText>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhatsAppText {
    pub body: String,
}

/// The distilled inbound message the flow consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundText {
    pub wa_id: String,
    pub profile_name: String,
    pub body: String,
    pub message_id: Option<String>,
}

impl WhatsAppWebhook {
    /// True when the payload carries only delivery-status receipts.
    pub fn is_status_update(&self) -> bool {
        self.entry
            .first()
            .and_then(|e| e.changes.first())
            .map(|c| c.value.statuses.is_some())
            .unwrap_or(false)
    }

    /// Extracts the first text message if the payload is a well-formed
    /// message event intended for `expected_phone_id`. Events for another
    /// phone number, and non-text events, yield `None`.
    pub fn extract_text(&self, expected_phone_id: &str) -> Option<InboundText> {
        if self.object.is_none() {
            return None;
        }
        let value = &self.entry.first()?.changes.first()?.value;

        if let Some(webhook_phone_id) = value
            .metadata
            .as_ref()
            .and_then(|m| m.phone_number_id.as_deref())
            && !expected_phone_id.is_empty()
            && webhook_phone_id != expected_phone_id
        {
            tracing::info!(
                configured = expected_phone_id,
                received = webhook_phone_id,
                "ignoring message for different phone number"
            );
            return None;
        }

        let contact = value.contacts.first()?;
        let message = value.messages.first()?;
        let body = message.text.as_ref()?.body.clone();
        if contact.wa_id.is_empty() || contact.profile.name.is_empty() {
            return None;
        }

        Some(InboundText {
            wa_id: contact.wa_id.clone(),
            profile_name: contact.profile.name.clone(),
            body,
            message_id: message.id.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Calendly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendlyWebhook {
    pub event: String,
    #[serde(default)]
    pub payload: CalendlyPayload,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CalendlyPayload {
    #[serde(default)]
    pub event: Option<CalendlyEvent>,
    #[serde(default)]
    pub invitee: Option<CalendlyInvitee>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendlyEvent {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_type: Option<CalendlyEventType>,
    #[serde(default)]
    pub location: Option<CalendlyLocation>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendlyEventType {
    #[serde(default)]
    pub duration: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendlyLocation {
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendlyInvitee {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CalendlyEvent {
    /// The provider references events by URI; the trailing segment is the
    /// stable id cancellations carry.
    pub fn event_id(&self) -> Option<String> {
        let uri = self.uri.as_deref()?;
        let id = uri.rsplit('/').next()?;
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}
