use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use parley_db::Database;

use crate::blobs::AttachmentStore;
use crate::identity::Identity;
use crate::liveness::{Heartbeat, PING_INTERVAL, PONG_TIMEOUT};
use crate::presence;
use crate::registry::Registry;
use crate::relay;

/// Drive one authenticated WebSocket connection to completion.
///
/// The socket splits into a send task (outbound frames plus the liveness
/// protocol) and a recv task (inbound frames into the relay). Whichever
/// finishes first aborts the other; both the pong deadline and the ping
/// timer live inside the send task, so nothing can fire after the tasks are
/// gone. Timeout eviction and a graceful peer close end in the same
/// idempotent removal.
pub async fn serve(
    socket: WebSocket,
    registry: Registry,
    db: Arc<Database>,
    blobs: Arc<AttachmentStore>,
    identity: Identity,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();
    let reply = tx.clone();

    let handle = registry.add(identity.clone(), tx).await;
    info!("{} ({}) connected", identity.username, identity.user_id);

    presence::announce(&registry).await;

    let send_username = identity.username.clone();
    let mut send_task = tokio::spawn(async move {
        let mut ping_timer = tokio::time::interval(PING_INTERVAL);
        ping_timer.tick().await; // immediate first tick

        let mut heartbeat = Heartbeat::new();
        let mut pong_deadline = Box::pin(tokio::time::sleep(PONG_TIMEOUT));

        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else { break };
                    let json = match serde_json::to_string(&frame) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!(error = %e, "unserializable outbound frame");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }

                _ = ping_timer.tick() => {
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                    let deadline = heartbeat.ping_sent(Instant::now());
                    pong_deadline.as_mut().reset(deadline);
                }

                pong = pong_rx.recv() => {
                    if pong.is_none() {
                        break;
                    }
                    heartbeat.pong_received();
                }

                _ = pong_deadline.as_mut(), if heartbeat.awaiting_pong() => {
                    warn!("{} missed pong deadline, closing dead peer", send_username);
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let recv_registry = registry.clone();
    let recv_identity = identity.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => {
                    relay::handle_frame(
                        &db,
                        &recv_registry,
                        &blobs,
                        &recv_identity,
                        &text,
                        &reply,
                    )
                    .await;
                }
                Message::Pong(_) => {
                    let _ = pong_tx.send(());
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if registry.remove(handle).await {
        presence::announce(&registry).await;
    }
    info!("{} ({}) disconnected", identity.username, identity.user_id);
}
