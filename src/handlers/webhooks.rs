//! WhatsApp webhook handlers: the verification handshake and inbound
//! message processing.

use crate::models::webhooks::WhatsAppWebhook;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

/// Meta's webhook verification handshake: echo the challenge when the
/// verify token matches, 403 when it does not, 400 when parameters are
/// missing.
///
/// # Example
/// ```bash
/// curl "http://localhost:8000/api/v1/webhook?hub.mode=subscribe&hub.verify_token=...&hub.challenge=42"
/// # Returns: 42
/// ```
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mode = params.get("hub.mode");
    let token = params.get("hub.verify_token");
    let challenge = params.get("hub.challenge");

    match (mode, token) {
        (Some(mode), Some(token)) => {
            if mode == "subscribe" && *token == state.config.whatsapp.verify_token {
                tracing::info!("webhook verified");
                (StatusCode::OK, challenge.cloned().unwrap_or_default()).into_response()
            } else {
                tracing::info!("webhook verification failed");
                (
                    StatusCode::FORBIDDEN,
                    Json(serde_json::json!({"status": "error", "message": "Verification failed"})),
                )
                    .into_response()
            }
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"status": "error", "message": "Missing parameters"})),
        )
            .into_response(),
    }
}

/// Inbound WhatsApp events. Status receipts are acknowledged untouched;
/// text messages run through the conversation flow and the reply goes back
/// out through the gateway. The signature middleware has already
/// authenticated the payload by the time this runs.
pub async fn receive_whatsapp(
    State(state): State<AppState>,
    Json(webhook): Json<WhatsAppWebhook>,
) -> Response {
    if webhook.is_status_update() {
        tracing::debug!("whatsapp status update acknowledged");
        return ok_ack();
    }

    let Some(inbound) = webhook.extract_text(&state.config.whatsapp.phone_number_id) else {
        tracing::warn!("received invalid WhatsApp webhook payload");
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"status": "error", "message": "Not a WhatsApp API event"})),
        )
            .into_response();
    };

    tracing::info!(
        from = %inbound.profile_name,
        wa_id = %inbound.wa_id,
        "processing WhatsApp message"
    );

    let reply = state
        .flow
        .process_message(&inbound.wa_id, &inbound.body, inbound.message_id)
        .await;

    if !state.sender.send_text(&inbound.wa_id, &reply).await {
        tracing::error!(wa_id = %inbound.wa_id, "failed to send reply");
    }

    ok_ack()
}

fn ok_ack() -> Response {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response()
}
