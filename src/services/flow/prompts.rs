//! Instruction payloads for the text generator.
//!
//! The flow never writes conversational prose itself; it picks one of these
//! templates and injects the structured facts it already holds. Replies are
//! requested in short Hebrew because that is the business's channel voice.

use crate::models::conversations::{ConversationMessage, MessageDirection};
use crate::models::leads::Lead;
use crate::models::properties::UnitListing;

/// How many recent turns are quoted back to the generator.
const HISTORY_TURNS: usize = 5;

/// Which instruction template to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStage {
    New,
    CollectingProfile,
    Qualified,
    SchedulingInProgress,
    TourScheduled,
    AskingGuarantees,
}

/// The standard conversational prompt: persona, recent turns, known facts,
/// the current message, and a stage-specific task line.
pub fn conversation_prompt(
    stage: PromptStage,
    lead: &Lead,
    history: &[ConversationMessage],
    user_message: &str,
    property_names: &[String],
) -> String {
    let mut prompt = String::from("אתה סוכן נדל\"ן. ענה בעברית קצר (1-2 משפטים).\n\n");

    let recent: Vec<&ConversationMessage> = history
        .iter()
        .rev()
        .take(HISTORY_TURNS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if !recent.is_empty() {
        prompt.push_str("השיחה עד עכשיו:\n");
        for message in recent {
            let sender = match message.direction {
                MessageDirection::Bot => "בוט",
                MessageDirection::User => "לקוח",
            };
            prompt.push_str(&format!("{sender}: {}\n", message.content));
        }
        prompt.push('\n');
    }

    let facts = known_facts(lead);
    if !facts.is_empty() {
        prompt.push_str("מה שאתה יודע:\n");
        prompt.push_str(&facts.join("\n"));
        prompt.push_str("\n\n");
    }

    if !user_message.is_empty() {
        prompt.push_str(&format!("הלקוח אמר: {user_message}\n\n"));
    }

    prompt.push_str(&task_line(stage, lead, property_names));
    prompt
}

fn known_facts(lead: &Lead) -> Vec<String> {
    let mut facts = Vec::new();
    if let Some(name) = lead.name.as_deref().filter(|_| lead.has_name()) {
        facts.push(format!("שם: {name}"));
    }
    if let Some(area) = &lead.preferred_area {
        facts.push(format!("פרויקט: {area}"));
    }
    if let Some(rooms) = lead.rooms {
        facts.push(format!("חדרים: {rooms}"));
    }
    if let Some(budget) = lead.budget {
        facts.push(format!("תקציב: {budget}"));
    }
    facts
}

fn task_line(stage: PromptStage, lead: &Lead, property_names: &[String]) -> String {
    match stage {
        PromptStage::New => "שאל: מה השם שלך? (אל תשתמש בשם בתשובה)".to_string(),
        PromptStage::CollectingProfile => {
            if !lead.has_name() {
                "שאל: מה השם שלך?".to_string()
            } else if lead.preferred_area.is_none() {
                if property_names.is_empty() {
                    "שאל: באיזה פרויקט אתה מתעניין? (אל תשתמש בשם)".to_string()
                } else {
                    format!(
                        "שאל: באיזה פרויקט אתה מתעניין? (אל תשתמש בשם)\n\n\
                         חשוב: הזכר רק את השמות האלה בדיוק כמו שהם: {}\n\
                         אל תמציא שמות אחרים!",
                        property_names.join(", ")
                    )
                }
            } else if lead.rooms.is_none() {
                "שאל: כמה חדרים? (אל תשתמש בשם)".to_string()
            } else {
                "אמור: מחפש דירות (אל תשתמש בשם)".to_string()
            }
        }
        PromptStage::Qualified => "שאל: רוצה לתאם ביקור? (אל תשתמש בשם)".to_string(),
        PromptStage::SchedulingInProgress => {
            "שלחת קישור לתיאום - עזור בקצרה וחכה לאישור שקבע".to_string()
        }
        PromptStage::TourScheduled => {
            "הפגישה קבועה - ענה רק על שאלות שקשורות לפגישה".to_string()
        }
        PromptStage::AskingGuarantees => "הסבר על דרישות הערבויות בקצרה:\n\
             - תלושי שכר מ-2 חודשים אחרונים\n\
             - ערבות של 2 חודשי שכירות מראש\n\
             אם מסכים - שלח קישור לתיאום."
            .to_string(),
    }
}

/// Announces matched units. The generator gets only the cheapest hit; the
/// media side-action carries the rest of the detail.
pub fn property_found_prompt(lead: &Lead, units: &[UnitListing]) -> String {
    let area = lead.preferred_area.as_deref().unwrap_or("");
    let first = &units[0];
    format!(
        "סוכן נדל\"ן. ענה בעברית קצר.\n\n\
         מצאתי: {} חדרים ב-{} - {}₪/חודש\n\n\
         אמור: יש דירות. שולח תמונות. רוצה פרטים או לתאם ביקור?",
        first.rooms, area, first.price
    )
}

/// Asks the lead to relax criteria after an empty search.
pub fn no_properties_prompt(lead: &Lead) -> String {
    format!(
        "סוכן נדל\"ן. ענה בעברית קצר.\n\n\
         חיפשתי: {} חדרים ב-{}\n\n\
         אמור: לא מצאתי. גמיש בפרויקט או בחדרים?",
        lead.rooms.map(|r| r.to_string()).unwrap_or_default(),
        lead.preferred_area.as_deref().unwrap_or("")
    )
}
