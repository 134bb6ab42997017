//! The outbound-messaging seam.
//!
//! Sends are single-attempt and never raise: every method resolves to a
//! success flag after logging, so callers degrade instead of aborting the
//! message-handling path.

pub mod whatsapp;

pub use whatsapp::WhatsAppClient;

use async_trait::async_trait;

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> bool;
    async fn send_image(&self, to: &str, url: &str, caption: Option<&str>) -> bool;
    async fn send_document(&self, to: &str, url: &str, filename: &str) -> bool;
}
