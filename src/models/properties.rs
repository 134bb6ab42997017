use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "unit_status", rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    Hold,
    Rented,
}

/// A building/project leads can ask about by name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

/// An apartment joined with its owning property, as consumed by the
/// matching and messaging paths.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UnitListing {
    pub unit_id: Uuid,
    pub rooms: i32,
    /// Monthly rent in whole shekels.
    pub price: i64,
    pub has_parking: bool,
    pub area_sqm: Option<i32>,
    pub image_url: Option<String>,
    pub floorplan_url: Option<String>,
    pub property_name: String,
    pub property_address: String,
}

/// Search filters for available units. Room bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct UnitFilters {
    pub min_rooms: Option<i32>,
    pub max_rooms: Option<i32>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub parking: Option<bool>,
}

impl UnitFilters {
    pub fn exact_rooms(rooms: i32) -> Self {
        Self {
            min_rooms: Some(rooms),
            max_rooms: Some(rooms),
            ..Self::default()
        }
    }
}
