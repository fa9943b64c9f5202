use std::sync::Arc;

use tracing::{debug, error, warn};

use parley_db::Database;
use parley_types::wire::{ClientFrame, ServerFrame};

use crate::blobs::AttachmentStore;
use crate::identity::Identity;
use crate::registry::{FrameSender, Registry};

/// Handle one inbound text frame from a connection bound to `sender`.
///
/// Order matters: persist first (off the async runtime, never under the
/// registry lock), then look up the recipient's live connections and fan
/// out. A store failure is reported on `reply` — the sender's own channel —
/// and nothing is delivered; the connection itself survives. A frame missing
/// `recipient` or `text` is dropped without comment, matching what clients
/// have always been sent.
pub async fn handle_frame(
    db: &Arc<Database>,
    registry: &Registry,
    blobs: &AttachmentStore,
    sender: &Identity,
    raw: &str,
    reply: &FrameSender,
) {
    let frame: ClientFrame = match serde_json::from_str(raw) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "dropping unparseable frame");
            return;
        }
    };

    let (Some(recipient), Some(text)) = (frame.recipient, frame.text) else {
        debug!("dropping frame without recipient or text");
        return;
    };

    // Attachments are a side concern: persist best-effort, keyed by a
    // generated name, and never let them fail the message.
    if let Some(file) = &frame.file {
        match blobs.save(&file.name, &file.data).await {
            Ok(stored) => debug!(name = %file.name, %stored, "attachment stored"),
            Err(e) => warn!(name = %file.name, error = %e, "attachment not stored"),
        }
    }

    let stored = {
        let db = db.clone();
        let sender_id = sender.user_id.to_string();
        let recipient_id = recipient.to_string();
        let text = text.clone();
        tokio::task::spawn_blocking(move || db.create_message(&sender_id, &recipient_id, &text))
            .await
    };

    let row = match stored {
        Ok(Ok(row)) => row,
        Ok(Err(e)) => {
            error!(error = %e, "message persistence failed");
            let _ = reply.send(ServerFrame::Error {
                error: "message could not be stored".to_string(),
            });
            return;
        }
        Err(e) => {
            error!(error = %e, "persistence task failed to join");
            let _ = reply.send(ServerFrame::Error {
                error: "message could not be stored".to_string(),
            });
            return;
        }
    };

    let delivery = ServerFrame::Delivery {
        text,
        sender: sender.user_id,
        recipient,
        id: row.id,
    };

    // Zero live connections is fine: the message stays persisted and the
    // recipient picks it up from history later.
    for tx in registry.live_connections_for(recipient).await {
        let _ = tx.send(delivery.clone());
    }
}
