//! Reminder planning and nudge content.
//!
//! Reminder hours are business-local rules (19:00 the evening before,
//! 09:00 the morning of), so planning happens in the office timezone and
//! converts back to UTC for storage. `now` is a parameter: a reminder whose
//! send time already passed is simply not planned.

use crate::models::followups::FollowupKind;
use crate::models::leads::Lead;
use chrono::{DateTime, Days, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

const EVENING_BEFORE: NaiveTime = NaiveTime::from_hms_opt(19, 0, 0).unwrap();
const MORNING_OF: NaiveTime = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
const HOURS_BEFORE: i64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedReminder {
    pub kind: FollowupKind,
    pub send_at: DateTime<Utc>,
    pub content: String,
}

/// Plans up to three reminders for an appointment. Each is included only
/// when its send time is still ahead of `now`.
pub fn plan_appointment_reminders(
    scheduled_at: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: Tz,
) -> Vec<PlannedReminder> {
    let local = scheduled_at.with_timezone(&tz);
    let appointment_hhmm = local.format("%H:%M").to_string();
    let mut planned = Vec::new();

    let evening_before = local
        .date_naive()
        .checked_sub_days(Days::new(1))
        .map(|d| d.and_time(EVENING_BEFORE))
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc));
    if let Some(send_at) = evening_before
        && send_at > now
    {
        planned.push(PlannedReminder {
            kind: FollowupKind::EveningBefore,
            send_at,
            content: evening_before_content(&appointment_hhmm),
        });
    }

    let morning_of = tz
        .from_local_datetime(&local.date_naive().and_time(MORNING_OF))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc));
    if let Some(send_at) = morning_of
        && send_at > now
        && send_at < scheduled_at
    {
        planned.push(PlannedReminder {
            kind: FollowupKind::MorningOf,
            send_at,
            content: morning_of_content(&appointment_hhmm),
        });
    }

    let three_hours_before = scheduled_at - Duration::hours(HOURS_BEFORE);
    if three_hours_before > now {
        planned.push(PlannedReminder {
            kind: FollowupKind::ThreeHoursBefore,
            send_at: three_hours_before,
            content: three_hours_content(&appointment_hhmm),
        });
    }

    planned
}

fn evening_before_content(appointment_hhmm: &str) -> String {
    format!(
        "היי! 👋\n\n\
         רק להזכיר שמחר בשעה {appointment_hhmm} יש לנו פגישת צפייה בדירות! 🏠\n\n\
         אני מצפה לפגוש אותך ולהציג לך כמה דירות מעולות.\n\n\
         יש שאלות לפני מחר? אני כאן! 😊"
    )
}

fn morning_of_content(appointment_hhmm: &str) -> String {
    format!(
        "בוקר טוב! ☀️\n\n\
         רק להזכיר שהיום בשעה {appointment_hhmm} יש לנו פגישת צפייה בדירות!\n\n\
         נתראה בקרוב! 😊"
    )
}

fn three_hours_content(appointment_hhmm: &str) -> String {
    format!(
        "היי! ⏰\n\n\
         עוד 3 שעות יש לנו פגישה בשעה {appointment_hhmm}!\n\n\
         רק כדי להיות בטוח שאתה זוכר 😊\n\n\
         מחכה לפגוש אותך! 🏠"
    )
}

/// Re-engagement message for qualified leads that went quiet. Mentions
/// what was already collected when there is something to mention.
pub fn nudge_message(lead: &Lead) -> String {
    let name = lead.name.as_deref().unwrap_or("שם");

    match (lead.budget, lead.rooms) {
        (Some(budget), Some(rooms)) => format!(
            "היי {name}! 👋\n\n\
             ראיתי שהתחלנו לחפש עבורך דירה של {rooms} חדרים בתקציב של {budget} ש\"ח, \
             אבל עדיין לא סיימנו את התהליך.\n\n\
             יש לי כמה דירות חדשות שהגיעו שעשויות לעניין אותך! 🏠\n\n\
             אשמח לשמוע איך אפשר להמשיך לעזור לך 😊"
        ),
        _ => format!(
            "היי {name}! 👋\n\n\
             ראיתי שהתחלנו לחפש עבורך דירה, אבל עדיין לא סיימנו את התהליך.\n\n\
             יש לי כמה דירות נהדרות שהגיעו שעשויות לעניין אותך! 🏠\n\n\
             אשמח לשמוע איך אפשר להמשיך לעזור לך 😊"
        ),
    }
}
