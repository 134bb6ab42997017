//! WhatsApp Business (Graph API) client.

use super::MessageSender;
use crate::config::WhatsAppConfig;
use crate::error::{Error, Result};
use crate::utils::text::format_for_whatsapp;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;

pub struct WhatsAppClient {
    http: reqwest::Client,
    messages_url: String,
    access_token: SecretString,
}

impl WhatsAppClient {
    pub fn new(config: &WhatsAppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            messages_url: format!(
                "{}/{}/{}/messages",
                config.graph_base_url, config.api_version, config.phone_number_id
            ),
            access_token: config.access_token.clone(),
        })
    }

    async fn post_message(&self, payload: Value) -> bool {
        let response = self
            .http
            .post(&self.messages_url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(status = %response.status(), "WhatsApp message sent");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, %body, "WhatsApp API rejected the message");
                false
            }
            Err(e) if e.is_timeout() => {
                tracing::error!("timeout occurred while sending WhatsApp message");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to send WhatsApp message");
                false
            }
        }
    }
}

#[async_trait]
impl MessageSender for WhatsAppClient {
    async fn send_text(&self, to: &str, body: &str) -> bool {
        let formatted = format_for_whatsapp(body);
        self.post_message(text_payload(to, &formatted)).await
    }

    async fn send_image(&self, to: &str, url: &str, caption: Option<&str>) -> bool {
        self.post_message(image_payload(to, url, caption)).await
    }

    async fn send_document(&self, to: &str, url: &str, filename: &str) -> bool {
        self.post_message(document_payload(to, url, filename)).await
    }
}

pub fn text_payload(to: &str, body: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": "text",
        "text": {"preview_url": false, "body": body},
    })
}

pub fn image_payload(to: &str, link: &str, caption: Option<&str>) -> Value {
    let mut image = json!({"link": link});
    if let Some(caption) = caption {
        image["caption"] = json!(caption);
    }
    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": "image",
        "image": image,
    })
}

pub fn document_payload(to: &str, link: &str, filename: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": "document",
        "document": {"link": link, "filename": filename},
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_shape() {
        let payload = text_payload("+15550001", "שלום");
        assert_eq!(payload["messaging_product"], "whatsapp");
        assert_eq!(payload["to"], "+15550001");
        assert_eq!(payload["type"], "text");
        assert_eq!(payload["text"]["body"], "שלום");
        assert_eq!(payload["text"]["preview_url"], false);
    }

    #[test]
    fn image_payload_caption_is_optional() {
        let without = image_payload("+15550001", "https://cdn.example/pic.jpg", None);
        assert!(without["image"].get("caption").is_none());

        let with = image_payload("+15550001", "https://cdn.example/pic.jpg", Some("דירה 1"));
        assert_eq!(with["image"]["caption"], "דירה 1");
        assert_eq!(with["image"]["link"], "https://cdn.example/pic.jpg");
    }

    #[test]
    fn document_payload_shape() {
        let payload = document_payload("+15550001", "https://cdn.example/contract.pdf", "contract.pdf");
        assert_eq!(payload["type"], "document");
        assert_eq!(payload["document"]["filename"], "contract.pdf");
    }
}
