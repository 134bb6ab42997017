pub mod appointments;
pub mod conversations;
pub mod followups;
pub mod leads;
pub mod metrics;
pub mod properties;
pub mod webhooks;
