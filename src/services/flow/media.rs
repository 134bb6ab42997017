//! Property media side-action: photos, captions and floorplans.
//!
//! Runs after the listing reply has been produced; every send is
//! best-effort and a failure only costs the lead a picture.

use crate::gateway::MessageSender;
use crate::models::properties::UnitListing;

/// Seeded demo data carries these; they are not real images.
const PLACEHOLDER_URL_PREFIX: &str = "https://example.com";

/// Caption shown under a unit photo, `index` is 1-based.
pub fn unit_caption(index: usize, unit: &UnitListing) -> String {
    let address = if unit.property_address.is_empty() {
        "כתובת לא זמינה"
    } else {
        &unit.property_address
    };
    let parking = if unit.has_parking { "כן" } else { "לא" };
    let sqm = unit
        .area_sqm
        .map(|a| a.to_string())
        .unwrap_or_else(|| "לא צוין".to_string());

    format!(
        "🏠 דירה {index}: {rooms} חדרים\n📍 {address}\n💰 {price} ש\"ח/חודש\n🚗 חניה: {parking}\n📏 {sqm} מ\"ר",
        rooms = unit.rooms,
        price = format_price(unit.price),
    )
}

/// Thousands-separated shekel amount.
pub fn format_price(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn is_sendable_url(url: Option<&str>) -> Option<&str> {
    url.filter(|u| !u.is_empty() && !u.starts_with(PLACEHOLDER_URL_PREFIX))
}

/// Sends up to `max_units` photo/caption pairs plus floorplans to the lead.
/// Returns how many media messages went through.
pub async fn send_property_media(
    sender: &dyn MessageSender,
    phone_number: &str,
    units: &[UnitListing],
    max_units: usize,
) -> usize {
    let mut sent = 0;

    for (i, unit) in units.iter().take(max_units).enumerate() {
        let caption = unit_caption(i + 1, unit);

        match is_sendable_url(unit.image_url.as_deref()) {
            Some(image_url) => {
                if sender.send_image(phone_number, image_url, Some(&caption)).await {
                    sent += 1;
                } else if sender.send_image(phone_number, image_url, None).await {
                    // Caption-less retry: some hosts reject long captions.
                    sent += 1;
                } else {
                    tracing::warn!(unit = %unit.unit_id, "failed to send unit image");
                }
            }
            None => {
                // No usable photo; the caption still carries the details.
                if sender.send_text(phone_number, &caption).await {
                    sent += 1;
                }
            }
        }

        if let Some(floorplan_url) = is_sendable_url(unit.floorplan_url.as_deref())
            && sender.send_image(phone_number, floorplan_url, None).await
        {
            sent += 1;
        }
    }

    tracing::info!(count = sent, to = phone_number, "property media dispatched");
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn unit(image: Option<&str>, floorplan: Option<&str>) -> UnitListing {
        UnitListing {
            unit_id: Uuid::new_v4(),
            rooms: 3,
            price: 5500,
            has_parking: true,
            area_sqm: Some(78),
            image_url: image.map(str::to_string),
            floorplan_url: floorplan.map(str::to_string),
            property_name: "Neve Sharet".to_string(),
            property_address: "HaTavas 12, Tel Aviv".to_string(),
        }
    }

    #[test]
    fn caption_lists_unit_details() {
        let caption = unit_caption(1, &unit(None, None));
        assert!(caption.contains("דירה 1: 3 חדרים"));
        assert!(caption.contains("HaTavas 12, Tel Aviv"));
        assert!(caption.contains("5,500 ש\"ח/חודש"));
        assert!(caption.contains("חניה: כן"));
        assert!(caption.contains("78 מ\"ר"));
    }

    #[test]
    fn caption_handles_missing_fields() {
        let mut bare = unit(None, None);
        bare.property_address = String::new();
        bare.area_sqm = None;
        bare.has_parking = false;
        let caption = unit_caption(2, &bare);
        assert!(caption.contains("כתובת לא זמינה"));
        assert!(caption.contains("לא צוין"));
        assert!(caption.contains("חניה: לא"));
    }

    #[test]
    fn price_grouping() {
        assert_eq!(format_price(500), "500");
        assert_eq!(format_price(5500), "5,500");
        assert_eq!(format_price(12500), "12,500");
        assert_eq!(format_price(1250000), "1,250,000");
    }

    #[test]
    fn placeholder_urls_are_not_sendable() {
        assert!(is_sendable_url(Some("https://example.com/apt.jpg")).is_none());
        assert!(is_sendable_url(Some("")).is_none());
        assert!(is_sendable_url(None).is_none());
        assert_eq!(
            is_sendable_url(Some("https://cdn.realhost.io/apt.jpg")),
            Some("https://cdn.realhost.io/apt.jpg")
        );
    }
}
