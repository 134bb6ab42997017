//! The lead conversation state machine.
//!
//! Every inbound WhatsApp message funnels through [`FlowService`]: it loads
//! the lead, suppresses duplicates, extracts whatever profile fields the
//! message carries, decides the stage transition and produces the reply.
//! Collaborators are injected handles; the flow owns no connections of its
//! own and holds no per-lead state between messages.
//!
//! The governing error policy: nothing that goes wrong while handling a
//! message may leave it unanswered. Store failures bubble to one catch in
//! [`FlowService::process_message`]; generator failures are replaced with
//! fixed wording at each call site via [`FlowService::generate_or`].

pub mod extract;
pub mod intent;
pub mod matching;
pub mod media;
pub mod prompts;

use crate::cache::PropertyCache;
use crate::config::CalendlyConfig;
use crate::error::Result;
use crate::gateway::MessageSender;
use crate::models::conversations::{
    ConversationMessage, MessageDirection, NewConversationMessage, last_user_message,
};
use crate::models::leads::{Lead, LeadStage, LeadUpdate, NewLead};
use crate::models::properties::{Property, UnitFilters};
use crate::providers::TextGenerator;
use crate::services::scheduling::select_booking_link;
use crate::store::ConversationStore;
use self::extract::ProfileField;
use self::prompts::PromptStage;
use std::sync::Arc;

/// Stock reply when anything inside message handling breaks.
pub const FALLBACK_REPLY: &str = "מצטער, יש בעיה טכנית. נסה שוב.";
/// Static acknowledgement for a byte-identical repeat of the last message.
pub const DUPLICATE_ACK: &str = "קיבלתי את ההודעה.";
pub const EMPTY_MESSAGE_REPLY: &str = "אני לא הבנתי. תוכל לחזור על זה?";
pub const MANUAL_SCHEDULING_REPLY: &str = "אתאם איתך ידנית. איזה יום ושעה נוחים לך?";

const ASK_NAME_REPLY: &str = "מה השם שלך?";
const ASK_ROOMS_REPLY: &str = "כמה חדרים אתה מחפש?";
const GUARANTEES_FALLBACK: &str =
    "לפני הביקור נדרשים תלושי שכר מ-2 חודשים אחרונים וערבות של 2 חודשי שכירות מראש.";

/// How much history is read per message, for duplicate detection and
/// generator context alike.
const HISTORY_LIMIT: i64 = 10;

pub struct FlowService {
    store: Arc<dyn ConversationStore>,
    generator: Arc<dyn TextGenerator>,
    sender: Arc<dyn MessageSender>,
    properties: PropertyCache,
    calendly: CalendlyConfig,
    max_recommendations: usize,
}

impl FlowService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        generator: Arc<dyn TextGenerator>,
        sender: Arc<dyn MessageSender>,
        calendly: CalendlyConfig,
        max_recommendations: usize,
    ) -> Self {
        Self {
            store,
            generator,
            sender,
            properties: PropertyCache::default(),
            calendly,
            max_recommendations,
        }
    }

    /// Entry point for one inbound message. Always produces a reply string;
    /// internal failures degrade to [`FALLBACK_REPLY`].
    pub async fn process_message(
        &self,
        phone_number: &str,
        body: &str,
        external_id: Option<String>,
    ) -> String {
        match self.handle(phone_number, body, external_id).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(phone = phone_number, error = %e, "message handling failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn handle(
        &self,
        phone_number: &str,
        body: &str,
        external_id: Option<String>,
    ) -> Result<String> {
        let lead = match self.store.lead_by_phone(phone_number).await? {
            Some(lead) => lead,
            None => {
                let lead = self
                    .store
                    .create_lead(NewLead {
                        phone_number: phone_number.to_string(),
                        name: None,
                    })
                    .await?;
                tracing::info!(lead = %lead.id, phone = phone_number, "new lead created");
                lead
            }
        };

        let history = self.store.history(lead.id, HISTORY_LIMIT).await?;

        // An identical resend (a provider retry, an impatient double-tap)
        // is acknowledged without replaying the transition or the generator.
        if let Some(last) = last_user_message(&history)
            && last.content.trim() == body.trim()
        {
            tracing::info!(lead = %lead.id, "duplicate message detected, skipping");
            return Ok(DUPLICATE_ACK.to_string());
        }

        self.store
            .log_message(NewConversationMessage {
                lead_id: lead.id,
                direction: MessageDirection::User,
                content: body.to_string(),
                external_id,
            })
            .await?;

        let reply = self.dispatch(&lead, body, &history).await?;

        self.store
            .log_message(NewConversationMessage {
                lead_id: lead.id,
                direction: MessageDirection::Bot,
                content: reply.clone(),
                external_id: None,
            })
            .await?;
        self.store.touch_lead(lead.id).await?;

        Ok(reply)
    }

    /// Stage dispatch. Exhaustive on purpose: a new stage cannot be added
    /// without deciding what the conversation does there.
    async fn dispatch(
        &self,
        lead: &Lead,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        tracing::info!(lead = %lead.id, stage = %lead.stage, "processing message");

        match lead.stage {
            LeadStage::New => self.handle_new(lead, message, history).await,
            LeadStage::CollectingProfile
            | LeadStage::GateFailed
            | LeadStage::NoFit
            | LeadStage::FutureFit => self.handle_collecting_profile(lead, message, history).await,
            LeadStage::Qualified => self.handle_qualified(lead, message, history).await,
            LeadStage::SchedulingInProgress => self.handle_scheduling(lead, message, history).await,
            LeadStage::TourScheduled => self.handle_tour_scheduled(lead, message, history).await,
        }
    }

    /// First contact: greet and ask for a name.
    async fn handle_new(
        &self,
        lead: &Lead,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        let lead = self
            .store
            .update_lead(lead.id, &LeadUpdate::stage(LeadStage::CollectingProfile))
            .await?;

        Ok(self
            .generate_or(
                prompts::conversation_prompt(PromptStage::New, &lead, history, message, &[]),
                ASK_NAME_REPLY,
            )
            .await)
    }

    /// Collects name → project → rooms, then runs the property search.
    /// The replies here are fixed questions rather than generated prose so
    /// the asking order is exact.
    async fn handle_collecting_profile(
        &self,
        lead: &Lead,
        message: &str,
        _history: &[ConversationMessage],
    ) -> Result<String> {
        if message.trim().is_empty() {
            return Ok(EMPTY_MESSAGE_REPLY.to_string());
        }

        let properties = self.known_properties().await?;
        let property_names: Vec<String> = properties.iter().map(|p| p.name.clone()).collect();

        let updates = self
            .extract_profile_updates(lead, message, &property_names)
            .await;
        let lead = if updates.is_empty() {
            lead.clone()
        } else {
            tracing::info!(lead = %lead.id, ?updates, "applying extracted profile fields");
            self.store.update_lead(lead.id, &updates).await?
        };

        let missing = extract::missing_profile_fields(&lead);
        let Some(next_field) = missing.first() else {
            return self.search_and_present(&lead).await;
        };

        Ok(match next_field {
            ProfileField::Name => ASK_NAME_REPLY.to_string(),
            ProfileField::Project => match property_names.as_slice() {
                [] => "באיזה פרויקט אתה מתעניין?".to_string(),
                [only] => format!("האם אתה מתעניין בפרויקט {only}?"),
                names => format!("באיזה פרויקט אתה מתעניין? {}", names.join(", ")),
            },
            ProfileField::Rooms => ASK_ROOMS_REPLY.to_string(),
        })
    }

    /// One message, one partial update. Fields that fail to extract stay
    /// untouched; a later message may overwrite the room count but never
    /// unset anything.
    async fn extract_profile_updates(
        &self,
        lead: &Lead,
        message: &str,
        property_names: &[String],
    ) -> LeadUpdate {
        let mut updates = LeadUpdate::default();

        if !lead.has_name() && extract::looks_like_name(message) {
            updates.name = Some(message.trim().to_string());
        }

        if property_names.len() == 1 && intent::is_affirmative(message) {
            // "כן" answers the single-project yes/no question directly.
            updates.preferred_area = Some(property_names[0].clone());
        } else if let Some(matched) =
            matching::match_property(message, property_names, self.generator.as_ref()).await
        {
            if let Some(previous) = &lead.preferred_area
                && *previous != matched
            {
                tracing::info!(lead = %lead.id, from = %previous, to = %matched, "project changed");
            }
            updates.preferred_area = Some(matched);
        }

        if let Some(rooms) = extract::extract_rooms(message) {
            if let Some(previous) = lead.rooms
                && previous != rooms
            {
                tracing::info!(lead = %lead.id, from = previous, to = rooms, "room count changed");
            }
            updates.rooms = Some(rooms);
        }

        updates
    }

    /// Profile is complete: search inventory, qualify or regress.
    async fn search_and_present(&self, lead: &Lead) -> Result<String> {
        let filters = match lead.rooms {
            Some(rooms) => UnitFilters::exact_rooms(rooms),
            None => UnitFilters::default(),
        };
        let units = self.store.available_units(&filters).await?;
        let units = matching::filter_by_area(units, lead.preferred_area.as_deref());

        tracing::info!(lead = %lead.id, count = units.len(), "property search finished");

        if units.is_empty() {
            // Regress so the lead can relax criteria.
            let lead = self
                .store
                .update_lead(lead.id, &LeadUpdate::stage(LeadStage::CollectingProfile))
                .await?;
            return Ok(self
                .generate_or(
                    prompts::no_properties_prompt(&lead),
                    "לא מצאתי בדיוק מה שחיפשת. גמיש בפרויקט או במספר חדרים?",
                )
                .await);
        }

        let lead = self
            .store
            .update_lead(lead.id, &LeadUpdate::stage(LeadStage::Qualified))
            .await?;

        let shown = &units[..units.len().min(self.max_recommendations)];
        let reply = self
            .generate_or(
                prompts::property_found_prompt(&lead, shown),
                &format!("מצאתי {} דירות מתאימות. שולח תמונות...", shown.len()),
            )
            .await;

        // Best-effort side-action; the text reply stands either way.
        media::send_property_media(
            self.sender.as_ref(),
            &lead.phone_number,
            shown,
            self.max_recommendations,
        )
        .await;

        Ok(reply)
    }

    /// Qualified leads are nudged toward booking a visit.
    async fn handle_qualified(
        &self,
        lead: &Lead,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        if intent::is_scheduling_request(message) {
            return self.start_scheduling(lead, message, history).await;
        }

        if intent::mentions_guarantees(message) {
            return self.explain_guarantees(lead, message, history).await;
        }

        Ok(self
            .generate_or(
                prompts::conversation_prompt(PromptStage::Qualified, lead, history, message, &[]),
                FALLBACK_REPLY,
            )
            .await)
    }

    async fn start_scheduling(
        &self,
        lead: &Lead,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        let guarantee_msg = self
            .generate_or(
                prompts::conversation_prompt(
                    PromptStage::AskingGuarantees,
                    lead,
                    history,
                    "",
                    &[],
                ),
                GUARANTEES_FALLBACK,
            )
            .await;

        match select_booking_link(&self.calendly, message) {
            Some(link) => {
                self.store
                    .update_lead(lead.id, &LeadUpdate::stage(LeadStage::SchedulingInProgress))
                    .await?;
                Ok(format!(
                    "{guarantee_msg}\n\n📅 קישור לתיאום:\n{link}\n\nאחרי שתקבע, תאשר לי כאן."
                ))
            }
            None => {
                tracing::info!(lead = %lead.id, "no booking link configured, manual scheduling");
                Ok(MANUAL_SCHEDULING_REPLY.to_string())
            }
        }
    }

    async fn explain_guarantees(
        &self,
        lead: &Lead,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        let mut reply = self
            .generate_or(
                prompts::conversation_prompt(
                    PromptStage::AskingGuarantees,
                    lead,
                    history,
                    message,
                    &[],
                ),
                GUARANTEES_FALLBACK,
            )
            .await;

        if let Some(link) = select_booking_link(&self.calendly, message) {
            reply.push_str(&format!("\n\n📅 קישור לתיאום ביקור:\n{link}"));
            self.store
                .update_lead(lead.id, &LeadUpdate::stage(LeadStage::SchedulingInProgress))
                .await?;
        }

        Ok(reply)
    }

    /// Waiting for the lead to confirm they picked a slot.
    async fn handle_scheduling(
        &self,
        lead: &Lead,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        if intent::is_booking_confirmation(message) {
            let lead = self
                .store
                .update_lead(lead.id, &LeadUpdate::stage(LeadStage::TourScheduled))
                .await?;
            return Ok(self
                .generate_or(
                    prompts::conversation_prompt(
                        PromptStage::TourScheduled,
                        &lead,
                        history,
                        message,
                        &[],
                    ),
                    "מעולה, הפגישה נרשמה! אשלח תזכורות לפני.",
                )
                .await);
        }

        Ok(self
            .generate_or(
                prompts::conversation_prompt(
                    PromptStage::SchedulingInProgress,
                    lead,
                    history,
                    message,
                    &[],
                ),
                FALLBACK_REPLY,
            )
            .await)
    }

    async fn handle_tour_scheduled(
        &self,
        lead: &Lead,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        Ok(self
            .generate_or(
                prompts::conversation_prompt(
                    PromptStage::TourScheduled,
                    lead,
                    history,
                    message,
                    &[],
                ),
                FALLBACK_REPLY,
            )
            .await)
    }

    /// The live property list, through the 5-minute cache.
    async fn known_properties(&self) -> Result<Vec<Property>> {
        if let Some(cached) = self.properties.get().await {
            return Ok(cached);
        }
        let fresh = self.store.list_properties().await?;
        self.properties.put(fresh.clone()).await;
        Ok(fresh)
    }

    /// Central generator fallback: the flow decides the replacement text,
    /// never the provider.
    async fn generate_or(&self, prompt: String, fallback: &str) -> String {
        match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "text generation failed, using fixed fallback");
                fallback.to_string()
            }
        }
    }
}
