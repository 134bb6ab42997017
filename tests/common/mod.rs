pub mod mocks;
pub mod store;
pub mod test_app;

#[allow(unused_imports)]
pub use mocks::{MockGenerator, MockSender, SentMessage};
#[allow(unused_imports)]
pub use store::InMemoryStore;
#[allow(unused_imports)]
pub use test_app::{TestApp, test_config};

use leasebot::models::leads::{Lead, LeadStage};
use chrono::Utc;
use uuid::Uuid;

/// A lead row ready to be inserted into the in-memory store.
#[allow(dead_code)]
pub fn lead_fixture(phone_number: &str, stage: LeadStage) -> Lead {
    Lead {
        id: Uuid::new_v4(),
        phone_number: phone_number.to_string(),
        name: Some("דנה".to_string()),
        email: None,
        stage,
        preferred_area: Some("Neve Sharet".to_string()),
        rooms: Some(3),
        budget: None,
        has_parking: None,
        has_payslips: None,
        can_pay_deposit: None,
        move_in_date: None,
        last_interaction: Utc::now(),
        created_at: Utc::now(),
    }
}
