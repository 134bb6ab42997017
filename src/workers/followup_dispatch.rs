use crate::gateway::MessageSender;
use crate::store::ConversationStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

/// Background worker that delivers due followup messages
///
/// Runs every 5 minutes. A followup that fails to send stays `pending`
/// and is retried on the next tick; there is no backoff and no retry cap.
pub async fn followup_dispatch_worker(
    store: Arc<dyn ConversationStore>,
    sender: Arc<dyn MessageSender>,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    let mut dispatch_interval = interval(Duration::from_secs(300)); // Every 5 minutes
    info!("Followup dispatch worker started (runs every 5 minutes)");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Followup dispatch worker shutting down");
                break;
            }
            _ = dispatch_interval.tick() => {
                if let Err(e) = dispatch_due_followups(store.as_ref(), sender.as_ref()).await {
                    error!("Followup dispatch tick failed: {}", e);
                }
            }
        }
    }

    info!("Followup dispatch worker stopped");
}

/// One dispatch pass. Public so tests can tick it directly.
pub async fn dispatch_due_followups(
    store: &dyn ConversationStore,
    sender: &dyn MessageSender,
) -> crate::error::Result<()> {
    let due = store.due_followups(Utc::now()).await?;
    if due.is_empty() {
        return Ok(());
    }

    info!("Processing {} due followups", due.len());
    let mut sent_count = 0;
    let mut failed_count = 0;

    for followup in due {
        let lead = match store.lead_by_id(followup.lead_id).await {
            Ok(Some(lead)) => lead,
            Ok(None) => {
                error!("No lead found for followup {}", followup.id);
                continue;
            }
            Err(e) => {
                error!("Failed to load lead for followup {}: {}", followup.id, e);
                failed_count += 1;
                continue;
            }
        };

        if sender.send_text(&lead.phone_number, &followup.content).await {
            match store.mark_followup_sent(followup.id).await {
                Ok(()) => {
                    sent_count += 1;
                    info!("Reminder sent to lead {}: {}", lead.id, followup.kind);
                }
                Err(e) => {
                    warn!("Sent followup {} but failed to mark it: {}", followup.id, e);
                }
            }
        } else {
            failed_count += 1;
            error!("Failed to send reminder to lead {}", lead.id);
        }
    }

    info!(
        "Followup dispatch complete: {} sent, {} failed",
        sent_count, failed_count
    );
    Ok(())
}
