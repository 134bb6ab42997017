use leasebot::config::Config;
use leasebot::gateway::{MessageSender, WhatsAppClient};
use leasebot::providers::{GeminiGenerator, TextGenerator};
use leasebot::routes::app_router;
use leasebot::services::flow::FlowService;
use leasebot::services::scheduling::SchedulingService;
use leasebot::state::AppState;
use leasebot::store::{ConversationStore, PgStore};
use leasebot::workers::{abandoned_lead_worker, daily_metrics_worker, followup_dispatch_worker};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Configuration problems must stop the process here, before anything
    // is served.
    let config = Config::load()?;
    config.validate()?;
    let config = Arc::new(config);
    info!("configuration loaded");

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(config.database.connection_string().expose_secret())
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database connected and migrated");

    // Every external client is constructed eagerly; a bad key fails startup.
    let store: Arc<dyn ConversationStore> = Arc::new(PgStore::new(pool));
    let generator: Arc<dyn TextGenerator> =
        Arc::new(GeminiGenerator::new(&config.ai.api_key, &config.ai.model)?);
    let sender: Arc<dyn MessageSender> = Arc::new(WhatsAppClient::new(&config.whatsapp)?);

    let flow = Arc::new(FlowService::new(
        store.clone(),
        generator,
        sender.clone(),
        config.calendly.clone(),
        config.business.max_property_recommendations,
    ));
    let scheduling = Arc::new(SchedulingService::new(
        store.clone(),
        sender.clone(),
        config.timezone(),
    ));

    let state = AppState::new(store.clone(), flow, scheduling, sender.clone(), config.clone());

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    tokio::spawn(followup_dispatch_worker(
        store.clone(),
        sender.clone(),
        shutdown_tx.subscribe(),
    ));
    tokio::spawn(abandoned_lead_worker(
        store.clone(),
        sender.clone(),
        config.business.abandoned_lead_hours,
        shutdown_tx.subscribe(),
    ));
    tokio::spawn(daily_metrics_worker(
        store.clone(),
        config.timezone(),
        shutdown_tx.subscribe(),
    ));
    state.workers_running.store(true, Ordering::Relaxed);
    info!("background workers started");

    let app = app_router(state);
    let listener =
        TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "listening for webhooks"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(());
        })
        .await?;

    Ok(())
}
