//! Calendar provider webhook handler.

use crate::error::Result;
use crate::models::webhooks::CalendlyWebhook;
use crate::state::AppState;
use axum::{Json, extract::State};

/// Booking lifecycle events. Resolution misses are acknowledged inside the
/// scheduling service so the provider stops retrying; only malformed
/// payloads and store failures surface as errors here.
pub async fn calendly_webhook(
    State(state): State<AppState>,
    Json(webhook): Json<CalendlyWebhook>,
) -> Result<Json<serde_json::Value>> {
    state.scheduling.process_webhook(webhook).await?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}
