//! Keyword classifiers for the free-text signals the flow reacts to.
//!
//! These are deliberately simple containment checks over a mixed
//! Hebrew/English vocabulary. They never fail, which is the property the
//! message path depends on.

const SCHEDULING_WORDS: &[&str] = &[
    "yes", "כן", "רוצה", "want", "schedule", "visit", "tour", "ביקור", "סיור", "לתאם", "לקבוע",
];

const CONFIRMATION_WORDS: &[&str] = &[
    "קבעתי",
    "הזמנתי",
    "תיאמתי",
    "booked",
    "scheduled",
    "confirmed",
    "done",
    "קיבלתי אישור",
    "סידרתי",
];

const GUARANTEE_WORDS: &[&str] = &["ערבות", "guarantee", "דרישות", "תלוש", "payslip"];

const AFFIRMATIVE_WORDS: &[&str] = &["yes", "כן", "ok", "okay", "yeah"];

/// Whether the message expresses a desire to book a visit.
pub fn is_scheduling_request(message: &str) -> bool {
    let message = message.to_lowercase();
    let message = message.trim();

    SCHEDULING_WORDS
        .iter()
        .any(|word| message == *word || message.contains(word))
}

/// Whether the message reports that a booking was completed.
pub fn is_booking_confirmation(message: &str) -> bool {
    let message = message.to_lowercase();
    CONFIRMATION_WORDS.iter().any(|word| message.contains(word))
}

/// Whether the message asks about guarantee/payslip requirements.
pub fn mentions_guarantees(message: &str) -> bool {
    let message = message.to_lowercase();
    GUARANTEE_WORDS.iter().any(|word| message.contains(word))
}

/// Whether the whole message is a bare "yes".
pub fn is_affirmative(message: &str) -> bool {
    let message = message.to_lowercase();
    AFFIRMATIVE_WORDS.contains(&message.trim())
}
