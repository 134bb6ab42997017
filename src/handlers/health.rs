//! Health check handler
//!
//! Reports store reachability and whether the background workers were
//! started. Read-only; used by load balancers and deploy probes.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::sync::atomic::Ordering;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub scheduler: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::error!(error = %e, "database health check failed");
            format!("error: {e}")
        }
    };

    let scheduler = if state.workers_running.load(Ordering::Relaxed) {
        "running"
    } else {
        "stopped"
    };

    let healthy = database == "ok";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            database,
            scheduler: scheduler.to_string(),
            timestamp: chrono::Utc::now(),
        }),
    )
}
