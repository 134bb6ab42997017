use crate::handlers::{
    calendly_webhook, health_check, metrics_summary, receive_whatsapp, verify_webhook,
};
use crate::middleware::verify_signature;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Builds the application router. Only the WhatsApp message POST sits
/// behind the signature middleware; the verification handshake GET and the
/// calendar webhook use their own provider auth semantics.
pub fn app_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/webhook", get(verify_webhook))
        .route(
            "/webhook",
            post(receive_whatsapp).route_layer(middleware::from_fn_with_state(
                state.clone(),
                verify_signature,
            )),
        )
        .route("/webhook/calendly", post(calendly_webhook))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_summary));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
