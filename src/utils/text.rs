//! Outbound text normalization for WhatsApp.

use regex::Regex;
use std::sync::LazyLock;

/// WhatsApp rejects messages over this many characters.
const MAX_MESSAGE_CHARS: usize = 4096;

static BRACKET_ARTIFACTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【.*?】").expect("bracket artifact regex"));

static DOUBLE_ASTERISK_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex"));

/// Prepares generated text for delivery: strips model citation artifacts,
/// converts markdown bold to WhatsApp bold, and truncates to the platform
/// limit.
pub fn format_for_whatsapp(text: &str) -> String {
    let stripped = BRACKET_ARTIFACTS.replace_all(text, "");
    let bolded = DOUBLE_ASTERISK_BOLD.replace_all(stripped.trim(), "*$1*");

    truncate_chars(&bolded, MAX_MESSAGE_CHARS)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    tracing::warn!("message truncated due to length limit");
    let mut truncated: String = text.chars().take(limit - 3).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_markdown_bold() {
        assert_eq!(format_for_whatsapp("**חשוב** מאוד"), "*חשוב* מאוד");
        assert_eq!(
            format_for_whatsapp("**one** and **two**"),
            "*one* and *two*"
        );
    }

    #[test]
    fn strips_citation_artifacts() {
        assert_eq!(format_for_whatsapp("דירה זמינה【4:2†source】 כאן"), "דירה זמינה כאן");
    }

    #[test]
    fn truncates_long_messages_on_char_boundaries() {
        let long = "א".repeat(5000);
        let formatted = format_for_whatsapp(&long);
        assert_eq!(formatted.chars().count(), MAX_MESSAGE_CHARS);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn short_messages_pass_through() {
        assert_eq!(format_for_whatsapp("היי"), "היי");
    }
}
