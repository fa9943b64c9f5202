use tracing::debug;

use parley_types::wire::ServerFrame;

use crate::registry::Registry;

/// Push the full roster to every live connection. Called after every
/// registry membership change; always a complete re-announcement, never a
/// delta. Fire-and-forget per peer: a connection whose send task has already
/// gone away is skipped, its eviction belongs to the liveness supervisor.
pub async fn announce(registry: &Registry) {
    let (online, peers) = registry.roster_and_peers().await;
    debug!(online = online.len(), peers = peers.len(), "announcing roster");

    let frame = ServerFrame::Roster { online };
    for tx in peers {
        let _ = tx.send(frame.clone());
    }
}
