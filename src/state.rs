use crate::{
    config::Config, gateway::MessageSender, services::flow::FlowService,
    services::scheduling::SchedulingService, store::ConversationStore,
};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Application state shared across all HTTP handlers
///
/// Every collaborator is an explicitly constructed handle: the store, the
/// conversation flow, the calendar integration and the outbound gateway are
/// built once at startup and injected here, never reached for globally.
#[derive(Clone)]
pub struct AppState {
    /// Persistence handle, also used by the health probe
    pub store: Arc<dyn ConversationStore>,
    /// The lead conversation state machine
    pub flow: Arc<FlowService>,
    /// Calendar webhook processing
    pub scheduling: Arc<SchedulingService>,
    /// Outbound WhatsApp sends
    pub sender: Arc<dyn MessageSender>,
    /// Loaded process configuration
    pub config: Arc<Config>,
    /// Set once the background workers have been spawned
    pub workers_running: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        flow: Arc<FlowService>,
        scheduling: Arc<SchedulingService>,
        sender: Arc<dyn MessageSender>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            flow,
            scheduling,
            sender,
            config,
            workers_running: Arc::new(AtomicBool::new(false)),
        }
    }
}
