//! Calendar (Calendly-shaped) integration: booking links going out,
//! booking events coming back in.
//!
//! Webhook processing is deliberately forgiving: an event we cannot tie to
//! a lead or appointment is logged and acknowledged, never errored, so the
//! provider does not retry forever.

use crate::config::CalendlyConfig;
use crate::error::{Error, Result};
use crate::gateway::MessageSender;
use crate::models::appointments::{Appointment, AppointmentStatus, NewAppointment};
use crate::models::conversations::{MessageDirection, NewConversationMessage};
use crate::models::followups::NewFollowup;
use crate::models::leads::{Lead, LeadStage, LeadUpdate};
use crate::models::webhooks::{CalendlyPayload, CalendlyWebhook};
use crate::services::reminders;
use crate::store::ConversationStore;
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// How far back the recent-scheduler fallback looks for a lead.
const FALLBACK_RESOLUTION_WINDOW_HOURS: i64 = 2;
const DEFAULT_DURATION_MINUTES: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePreference {
    Morning,
    Afternoon,
    Evening,
}

const MORNING_PATTERNS: &[&str] = &["בוקר", "morning", "בקר", "בוקרים", "בבוקר"];
const AFTERNOON_PATTERNS: &[&str] = &[
    "אחר הצהריים",
    "אחרי הצהריים",
    "צהריים",
    "afternoon",
    "אחה\"צ",
];
const EVENING_PATTERNS: &[&str] = &["ערב", "בערב", "ערבים", "evening", "לילה"];

/// Reads a time-of-day preference out of free text, if one is there.
pub fn detect_time_preference(message: &str) -> Option<TimePreference> {
    let message = message.to_lowercase();

    if MORNING_PATTERNS.iter().any(|p| message.contains(p)) {
        return Some(TimePreference::Morning);
    }
    if AFTERNOON_PATTERNS.iter().any(|p| message.contains(p)) {
        return Some(TimePreference::Afternoon);
    }
    if EVENING_PATTERNS.iter().any(|p| message.contains(p)) {
        return Some(TimePreference::Evening);
    }
    None
}

/// Picks the booking link for a message: the category link when a time
/// preference is detected and configured, otherwise the default link.
/// `None` means no link is configured at all.
pub fn select_booking_link(config: &CalendlyConfig, message: &str) -> Option<String> {
    let preferred = detect_time_preference(message).map(|pref| match pref {
        TimePreference::Morning => &config.morning_link,
        TimePreference::Afternoon => &config.afternoon_link,
        TimePreference::Evening => &config.evening_link,
    });

    let link = match preferred {
        Some(link) if !link.is_empty() => link,
        _ => &config.booking_link,
    };

    (!link.is_empty()).then(|| link.clone())
}

pub struct SchedulingService {
    store: Arc<dyn ConversationStore>,
    sender: Arc<dyn MessageSender>,
    timezone: Tz,
}

impl SchedulingService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        sender: Arc<dyn MessageSender>,
        timezone: Tz,
    ) -> Self {
        Self {
            store,
            sender,
            timezone,
        }
    }

    /// Dispatches a provider webhook. Unknown event types are acknowledged
    /// untouched.
    pub async fn process_webhook(&self, webhook: CalendlyWebhook) -> Result<()> {
        tracing::info!(event = %webhook.event, "calendar webhook received");

        match webhook.event.as_str() {
            "invitee.created" => self.handle_created(webhook.payload).await,
            "invitee.canceled" => self.handle_canceled(webhook.payload).await,
            other => {
                tracing::info!(event = other, "unhandled calendar event type");
                Ok(())
            }
        }
    }

    async fn handle_created(&self, payload: CalendlyPayload) -> Result<()> {
        let event = payload
            .event
            .ok_or_else(|| Error::InvalidPayload("missing event details".to_string()))?;
        let event_id = event
            .event_id()
            .ok_or_else(|| Error::InvalidPayload("missing event id".to_string()))?;
        let scheduled_at = event
            .start_time
            .ok_or_else(|| Error::InvalidPayload("missing start time".to_string()))?;

        let invitee = payload.invitee.unwrap_or_else(|| {
            crate::models::webhooks::CalendlyInvitee {
                email: None,
                name: None,
            }
        });

        let Some(lead) = self.resolve_lead(invitee.email.as_deref()).await? else {
            tracing::warn!(
                email = invitee.email.as_deref().unwrap_or("<none>"),
                "no lead found for booking, acknowledging anyway"
            );
            return Ok(());
        };

        let appointment = self
            .store
            .create_appointment(NewAppointment {
                lead_id: lead.id,
                unit_id: None,
                external_event_id: event_id,
                scheduled_at,
                attendee_email: invitee.email.clone(),
                attendee_name: invitee.name.clone(),
                location: event.location.and_then(|l| l.location),
                duration_minutes: event
                    .event_type
                    .and_then(|t| t.duration)
                    .unwrap_or(DEFAULT_DURATION_MINUTES),
            })
            .await?;

        // Persist the email so the next booking resolves by identity
        // instead of by the recency heuristic.
        self.store
            .update_lead(
                lead.id,
                &LeadUpdate {
                    email: invitee.email,
                    stage: Some(LeadStage::TourScheduled),
                    ..LeadUpdate::default()
                },
            )
            .await?;

        self.schedule_reminders(&appointment).await;
        self.notify(&lead, confirmation_message(&appointment, self.timezone))
            .await;

        tracing::info!(lead = %lead.id, appointment = %appointment.id, "appointment created");
        Ok(())
    }

    async fn handle_canceled(&self, payload: CalendlyPayload) -> Result<()> {
        let event_id = payload
            .event
            .as_ref()
            .and_then(|e| e.event_id())
            .ok_or_else(|| Error::InvalidPayload("missing event id".to_string()))?;

        let Some(appointment) = self.store.appointment_by_event_id(&event_id).await? else {
            tracing::warn!(event_id = %event_id, "no appointment for canceled event");
            return Ok(());
        };

        self.store
            .update_appointment_status(appointment.id, AppointmentStatus::Canceled)
            .await?;
        self.store
            .update_lead(
                appointment.lead_id,
                &LeadUpdate::stage(LeadStage::Qualified),
            )
            .await?;

        let canceled = self
            .store
            .cancel_pending_followups(appointment.lead_id)
            .await?;
        tracing::info!(
            lead = %appointment.lead_id,
            followups = canceled,
            "appointment canceled, lead regressed to qualified"
        );

        if let Some(lead) = self.store.lead_by_id(appointment.lead_id).await? {
            self.notify(&lead, cancellation_message()).await;
        }

        Ok(())
    }

    /// Email first; failing that, the most recently active lead that was
    /// mid-scheduling. The fallback is a heuristic and says so in the log.
    async fn resolve_lead(&self, email: Option<&str>) -> Result<Option<Lead>> {
        if let Some(email) = email.filter(|e| !e.is_empty())
            && let Some(lead) = self.store.lead_by_email(email).await?
        {
            return Ok(Some(lead));
        }

        let since = Utc::now() - Duration::hours(FALLBACK_RESOLUTION_WINDOW_HOURS);
        let recent = self
            .store
            .recent_leads_by_stage(LeadStage::SchedulingInProgress, since)
            .await?;

        if let Some(lead) = recent.into_iter().next() {
            tracing::warn!(
                lead = %lead.id,
                "resolved booking by recency heuristic, not identity"
            );
            return Ok(Some(lead));
        }

        Ok(None)
    }

    async fn schedule_reminders(&self, appointment: &Appointment) {
        let planned =
            reminders::plan_appointment_reminders(appointment.scheduled_at, Utc::now(), self.timezone);

        for reminder in planned {
            let result = self
                .store
                .create_followup(NewFollowup {
                    lead_id: appointment.lead_id,
                    kind: reminder.kind,
                    content: reminder.content,
                    send_at: reminder.send_at,
                })
                .await;

            match result {
                Ok(followup) => {
                    tracing::info!(kind = %followup.kind, send_at = %followup.send_at, "reminder scheduled")
                }
                Err(e) => tracing::error!(error = %e, "failed to schedule reminder"),
            }
        }
    }

    /// Best-effort outbound notice, logged to the conversation when it
    /// goes through.
    async fn notify(&self, lead: &Lead, content: String) {
        if self.sender.send_text(&lead.phone_number, &content).await {
            let logged = self
                .store
                .log_message(NewConversationMessage {
                    lead_id: lead.id,
                    direction: MessageDirection::Bot,
                    content,
                    external_id: None,
                })
                .await;
            if let Err(e) = logged {
                tracing::error!(error = %e, "failed to log calendar notice");
            }
        } else {
            tracing::error!(lead = %lead.id, "failed to send calendar notice");
        }
    }
}

fn confirmation_message(appointment: &Appointment, tz: Tz) -> String {
    let local = appointment.scheduled_at.with_timezone(&tz);
    let formatted = local.format("%d/%m/%Y בשעה %H:%M");
    let location = appointment.location.as_deref().unwrap_or("יישלח בהמשך");

    format!(
        "🎉 מעולה! הפגישה נקבעה בהצלחה!\n\n\
         📅 תאריך ושעה: {formatted}\n\
         📍 מיקום: {location}\n\
         ⏱️ משך: {} דקות\n\n\
         אני אשלח לך תזכורות לפני הפגישה.\n\n\
         יש לך שאלות נוספות? אני כאן לעזור! 😊",
        appointment.duration_minutes
    )
}

fn cancellation_message() -> String {
    "😔 הפגישה שלנו בוטלה.\n\n\
     אם אתה עדיין מעוניין לראות דירות, אני יכול לעזור לך לתאם פגישה חדשה.\n\n\
     פשוט כתוב לי ואני אסדר הכל! 😊"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> CalendlyConfig {
        CalendlyConfig {
            booking_link: "https://calendly.com/office/tour".to_string(),
            morning_link: "https://calendly.com/office/morning".to_string(),
            afternoon_link: "https://calendly.com/office/afternoon".to_string(),
            evening_link: "https://calendly.com/office/evening".to_string(),
        }
    }

    #[test]
    fn detects_hebrew_and_english_time_preferences() {
        assert_eq!(detect_time_preference("בבוקר נוח לי"), Some(TimePreference::Morning));
        assert_eq!(
            detect_time_preference("אחרי הצהריים בבקשה"),
            Some(TimePreference::Afternoon)
        );
        assert_eq!(detect_time_preference("maybe evening?"), Some(TimePreference::Evening));
        assert_eq!(detect_time_preference("כן רוצה לתאם"), None);
    }

    #[test]
    fn preference_selects_category_link() {
        assert_eq!(
            select_booking_link(&links(), "בבוקר").unwrap(),
            "https://calendly.com/office/morning"
        );
        assert_eq!(
            select_booking_link(&links(), "כן רוצה לתאם").unwrap(),
            "https://calendly.com/office/tour"
        );
    }

    #[test]
    fn unconfigured_category_falls_back_to_default() {
        let mut config = links();
        config.evening_link = String::new();
        assert_eq!(
            select_booking_link(&config, "בערב").unwrap(),
            "https://calendly.com/office/tour"
        );
    }

    #[test]
    fn no_links_configured_means_none() {
        assert!(select_booking_link(&CalendlyConfig::default(), "כן").is_none());
    }
}
