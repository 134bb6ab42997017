use crate::gateway::MessageSender;
use crate::models::conversations::{MessageDirection, NewConversationMessage};
use crate::models::leads::LeadStage;
use crate::services::reminders::nudge_message;
use crate::store::ConversationStore;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

/// Background worker that re-engages qualified leads that went quiet
///
/// Runs every hour. A lead counts as abandoned after
/// `abandoned_after_hours` without interaction; a successful nudge
/// refreshes the interaction time so the lead is not nudged again next tick.
pub async fn abandoned_lead_worker(
    store: Arc<dyn ConversationStore>,
    sender: Arc<dyn MessageSender>,
    abandoned_after_hours: i64,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    let mut nudge_interval = interval(Duration::from_secs(3600)); // Every hour
    info!("Abandoned lead worker started (runs every hour)");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Abandoned lead worker shutting down");
                break;
            }
            _ = nudge_interval.tick() => {
                if let Err(e) = nudge_abandoned_leads(store.as_ref(), sender.as_ref(), abandoned_after_hours).await {
                    error!("Abandoned lead tick failed: {}", e);
                }
            }
        }
    }

    info!("Abandoned lead worker stopped");
}

/// One nudge pass. Public so tests can tick it directly.
pub async fn nudge_abandoned_leads(
    store: &dyn ConversationStore,
    sender: &dyn MessageSender,
    abandoned_after_hours: i64,
) -> crate::error::Result<()> {
    let cutoff = Utc::now() - ChronoDuration::hours(abandoned_after_hours);
    let abandoned = store.stale_leads(LeadStage::Qualified, cutoff).await?;
    if abandoned.is_empty() {
        return Ok(());
    }

    info!("Found {} abandoned leads", abandoned.len());
    let mut sent_count = 0;
    let mut failed_count = 0;

    for lead in abandoned {
        let nudge = nudge_message(&lead);

        if sender.send_text(&lead.phone_number, &nudge).await {
            if let Err(e) = store.touch_lead(lead.id).await {
                error!("Failed to refresh lead {} after nudge: {}", lead.id, e);
            }
            if let Err(e) = store
                .log_message(NewConversationMessage {
                    lead_id: lead.id,
                    direction: MessageDirection::Bot,
                    content: nudge,
                    external_id: None,
                })
                .await
            {
                error!("Failed to log nudge for lead {}: {}", lead.id, e);
            }
            sent_count += 1;
        } else {
            failed_count += 1;
            error!("Failed to send nudge to lead {}", lead.id);
        }
    }

    info!(
        "Abandoned lead processing complete: {} sent, {} failed",
        sent_count, failed_count
    );
    Ok(())
}
