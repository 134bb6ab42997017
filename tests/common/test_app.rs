//! HTTP test application wrapper
//!
//! Runs the real router over the in-memory store and the scripted
//! collaborator doubles, on a random port, one server per test.

use super::mocks::{MockGenerator, MockSender};
use super::store::InMemoryStore;
use leasebot::Config;
use leasebot::routes::app_router;
use leasebot::services::flow::FlowService;
use leasebot::services::scheduling::SchedulingService;
use leasebot::state::AppState;
use reqwest::Client;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const TEST_APP_SECRET: &str = "test-app-secret";
pub const TEST_VERIFY_TOKEN: &str = "test-verify-token";
pub const TEST_PHONE_NUMBER_ID: &str = "1066";

/// A complete config with the critical secrets filled in.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.whatsapp.access_token = "test-access-token".to_string().into();
    config.whatsapp.app_secret = TEST_APP_SECRET.to_string().into();
    config.whatsapp.phone_number_id = TEST_PHONE_NUMBER_ID.to_string();
    config.whatsapp.verify_token = TEST_VERIFY_TOKEN.to_string();
    config.ai.api_key = "test-ai-key".to_string().into();
    config.calendly.booking_link = "https://calendly.com/office/tour".to_string();
    config
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub store: Arc<InMemoryStore>,
    pub generator: Arc<MockGenerator>,
    pub sender: Arc<MockSender>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let generator = Arc::new(MockGenerator::new());
        let sender = Arc::new(MockSender::new());
        let config = Arc::new(config);

        let flow = Arc::new(FlowService::new(
            store.clone(),
            generator.clone(),
            sender.clone(),
            config.calendly.clone(),
            config.business.max_property_recommendations,
        ));
        let scheduling = Arc::new(SchedulingService::new(
            store.clone(),
            sender.clone(),
            config.timezone(),
        ));

        let state = AppState::new(
            store.clone(),
            flow,
            scheduling,
            sender.clone(),
            config.clone(),
        );
        let app = app_router(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{port}");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give server time to start
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            client,
            store,
            generator,
            sender,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
