//! Deterministic field extraction from a single inbound message.
//!
//! Extraction is a heuristic, not a validator: a message that merely looks
//! like a name is taken as one, and anything ambiguous simply leaves the
//! field unset so the flow asks again.

use crate::models::leads::Lead;
use regex::Regex;
use std::sync::LazyLock;

/// Profile fields collected before a lead can be qualified, in the fixed
/// order they are asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Project,
    Rooms,
}

const NAME_STOPWORDS: &[&str] = &["yes", "no", "כן", "לא", "ok", "okay"];

/// Spelled-out room counts. Ordered so longer forms shadow their prefixes.
const NUMBER_WORDS: &[(&str, i32)] = &[
    ("אחד", 1),
    ("אחת", 1),
    ("שניים", 2),
    ("שתיים", 2),
    ("שני", 2),
    ("שלושה", 3),
    ("שלוש", 3),
    ("ארבעה", 4),
    ("ארבע", 4),
    ("חמישה", 5),
    ("חמש", 5),
    ("שישה", 6),
    ("שש", 6),
    ("שבעה", 7),
    ("שבע", 7),
    ("שמונה", 8),
    ("תשע", 9),
    ("עשר", 10),
];

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digits regex"));

/// Whether the message plausibly is the sender's name. Applied only while
/// the lead's name is still unset.
pub fn looks_like_name(message: &str) -> bool {
    let trimmed = message.trim();
    if trimmed.chars().count() <= 1 {
        return false;
    }
    let words: Vec<&str> = trimmed.split_whitespace().collect();

    (1..=3).contains(&words.len())
        && !trimmed.chars().any(|c| c.is_ascii_digit())
        && !trimmed.contains('?')
        && !words
            .iter()
            .any(|w| NAME_STOPWORDS.contains(&w.to_lowercase().as_str()))
}

/// Extracts a room count: spelled-out Hebrew numbers first, then the first
/// run of digits. Values outside 1..=10 are rejected.
pub fn extract_rooms(message: &str) -> Option<i32> {
    let lowered = message.to_lowercase();

    let number = NUMBER_WORDS
        .iter()
        .find(|(word, _)| lowered.contains(word))
        .map(|(_, n)| *n)
        .or_else(|| {
            DIGITS
                .find(&lowered)
                .and_then(|m| m.as_str().parse::<i32>().ok())
        })?;

    (1..=10).contains(&number).then_some(number)
}

/// The profile fields still missing, in asking order.
pub fn missing_profile_fields(lead: &Lead) -> Vec<ProfileField> {
    let mut missing = Vec::new();
    if !lead.has_name() {
        missing.push(ProfileField::Name);
    }
    if lead.preferred_area.is_none() {
        missing.push(ProfileField::Project);
    }
    if lead.rooms.is_none() {
        missing.push(ProfileField::Rooms);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::leads::LeadStage;
    use chrono::Utc;
    use uuid::Uuid;

    fn lead(name: Option<&str>, area: Option<&str>, rooms: Option<i32>) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            phone_number: "+15550001".to_string(),
            name: name.map(str::to_string),
            email: None,
            stage: LeadStage::CollectingProfile,
            preferred_area: area.map(str::to_string),
            rooms,
            budget: None,
            has_parking: None,
            has_payslips: None,
            can_pay_deposit: None,
            move_in_date: None,
            last_interaction: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn plain_names_are_accepted() {
        assert!(looks_like_name("דנה"));
        assert!(looks_like_name("דנה כהן"));
        assert!(looks_like_name("John Smith Jr"));
    }

    #[test]
    fn questions_digits_and_confirmations_are_not_names() {
        assert!(!looks_like_name("מה?"));
        assert!(!looks_like_name("דירה עם 3 חדרים"));
        assert!(!looks_like_name("כן"));
        assert!(!looks_like_name("ok"));
        assert!(!looks_like_name("א"));
        assert!(!looks_like_name("אחת שתיים שלוש ארבע"));
    }

    #[test]
    fn rooms_from_digits_and_hebrew_words() {
        assert_eq!(extract_rooms("3"), Some(3));
        assert_eq!(extract_rooms("שלוש"), Some(3));
        assert_eq!(extract_rooms("3 חדרים"), Some(3));
        assert_eq!(extract_rooms("אני מחפש ארבעה חדרים"), Some(4));
        assert_eq!(extract_rooms("שתיים"), Some(2));
    }

    #[test]
    fn out_of_range_rooms_are_rejected() {
        assert_eq!(extract_rooms("15"), None);
        assert_eq!(extract_rooms("0"), None);
        assert_eq!(extract_rooms("אין לי מושג"), None);
    }

    #[test]
    fn huge_digit_runs_do_not_panic() {
        assert_eq!(extract_rooms("99999999999999999999"), None);
    }

    #[test]
    fn missing_fields_follow_asking_order() {
        assert_eq!(
            missing_profile_fields(&lead(None, None, None)),
            vec![ProfileField::Name, ProfileField::Project, ProfileField::Rooms]
        );
        assert_eq!(
            missing_profile_fields(&lead(Some("דנה"), None, None)),
            vec![ProfileField::Project, ProfileField::Rooms]
        );
        assert_eq!(
            missing_profile_fields(&lead(Some("דנה"), Some("Neve Sharet"), None)),
            vec![ProfileField::Rooms]
        );
        assert!(missing_profile_fields(&lead(Some("דנה"), Some("Neve Sharet"), Some(3))).is_empty());
    }

    #[test]
    fn placeholder_name_counts_as_missing() {
        assert_eq!(
            missing_profile_fields(&lead(Some("Unknown"), None, None))[0],
            ProfileField::Name
        );
    }
}
