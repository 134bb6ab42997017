//! Project/area matching between free text and the live property list.
//!
//! Matching runs in three tiers: direct case-insensitive containment,
//! containment of consonant skeletons (so Hebrew spellings line up with
//! transliterated Latin names without a model round-trip), and finally a
//! single generator call that must answer with an exact name from the list
//! or `NONE`.

use crate::models::properties::UnitListing;
use crate::providers::TextGenerator;

/// Lowercases and strips separators for area comparisons.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '-' && *c != '_')
        .collect()
}

/// Reduces text to a language-neutral consonant skeleton: Hebrew letters
/// are transliterated, Latin vowels and semi-vowels are dropped. Hebrew
/// matres lectionis (א ה ו י) and gutturals without a stable Latin
/// counterpart are dropped for the same reason.
fn consonant_skeleton(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            'a'..='z' | 'A'..='Z' => {
                let lower = c.to_ascii_lowercase();
                if matches!(lower, 'a' | 'e' | 'i' | 'o' | 'u' | 'h' | 'v' | 'w' | 'y') {
                    None
                } else {
                    Some(lower)
                }
            }
            '0'..='9' => Some(c),
            'ב' => Some('b'),
            'ג' => Some('g'),
            'ד' => Some('d'),
            'ז' | 'צ' | 'ץ' => Some('z'),
            'ט' | 'ת' => Some('t'),
            'כ' | 'ך' | 'ק' => Some('k'),
            'ל' => Some('l'),
            'מ' | 'ם' => Some('m'),
            'נ' | 'ן' => Some('n'),
            'ס' | 'ש' => Some('s'),
            'פ' | 'ף' => Some('p'),
            'ר' => Some('r'),
            _ => None,
        })
        .collect()
}

/// Direct containment between a message and one known property name,
/// in either direction and in either script.
fn contains_match(message: &str, name: &str) -> bool {
    let message_lower = message.trim().to_lowercase();
    let name_lower = name.to_lowercase();
    if message_lower.is_empty() {
        return false;
    }
    if name_lower.contains(&message_lower) || message_lower.contains(&name_lower) {
        return true;
    }

    let message_skeleton = consonant_skeleton(&message_lower);
    let name_skeleton = consonant_skeleton(&name_lower);
    // Short skeletons match everything; require a little substance.
    if message_skeleton.chars().count() < 3 || name_skeleton.chars().count() < 3 {
        return false;
    }
    name_skeleton.contains(&message_skeleton) || message_skeleton.contains(&name_skeleton)
}

/// Picks the known property name the message refers to, if any.
/// The generator tier is only consulted when containment finds nothing,
/// and its answer is validated against the list before being trusted.
pub async fn match_property(
    message: &str,
    property_names: &[String],
    generator: &dyn TextGenerator,
) -> Option<String> {
    if property_names.is_empty() {
        return None;
    }

    for name in property_names {
        if contains_match(message, name) {
            tracing::info!(property = %name, "matched project by containment");
            return Some(name.clone());
        }
    }

    let answer = match generator.generate(&match_prompt(message, property_names)).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(error = %e, "project matching generator call failed");
            return None;
        }
    };

    let candidate = answer.trim().trim_matches(['"', '\'']).to_string();
    if property_names.contains(&candidate) {
        tracing::info!(property = %candidate, "matched project via generator");
        return Some(candidate);
    }

    if !candidate.eq_ignore_ascii_case("none") {
        // The model paraphrased; salvage with a containment pass.
        let candidate_lower = candidate.to_lowercase();
        for name in property_names {
            let name_lower = name.to_lowercase();
            if candidate_lower.contains(&name_lower) || name_lower.contains(&candidate_lower) {
                tracing::info!(property = %name, "fuzzy-matched generator answer");
                return Some(name.clone());
            }
        }
        tracing::warn!(answer = %candidate, "generator proposed an unknown property");
    }

    None
}

/// The instruction payload for the generator tier.
pub fn match_prompt(message: &str, property_names: &[String]) -> String {
    let listing = property_names
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a property matching assistant. Match the user's message to one \
         of the available property names.\n\n\
         User message: \"{message}\"\n\n\
         Available properties:\n{listing}\n\n\
         Instructions:\n\
         - Look for semantic matches, partial matches and Hebrew/English variations\n\
         - Reply with ONLY the exact property name from the list above\n\
         - If no match, reply with \"NONE\""
    )
}

/// Keeps units whose property name or address contains the normalized
/// preferred area. An unset preference keeps everything.
pub fn filter_by_area(units: Vec<UnitListing>, preferred_area: Option<&str>) -> Vec<UnitListing> {
    let Some(preferred) = preferred_area else {
        return units;
    };
    let preferred = normalize(preferred);

    units
        .into_iter()
        .filter(|unit| {
            normalize(&unit.property_name).contains(&preferred)
                || normalize(&unit.property_address).contains(&preferred)
        })
        .collect()
}
