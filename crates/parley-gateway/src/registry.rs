use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use parley_types::wire::{OnlineUser, ServerFrame};

use crate::identity::Identity;

/// Outbound half of one connection. Pushing a frame never blocks; the frame
/// is drained by the connection's send task.
pub type FrameSender = mpsc::UnboundedSender<ServerFrame>;

/// Opaque handle returned by [`Registry::add`]; the only way to remove an
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnHandle(Uuid);

/// The process-wide set of live, identity-bound connections. One shared
/// collection behind one lock; every handler task goes through it.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    conns: HashMap<Uuid, Entry>,
    /// Index for fan-out: user id -> connection ids. A user with several
    /// sessions has several entries here; the registry never deduplicates.
    by_user: HashMap<Uuid, HashSet<Uuid>>,
}

struct Entry {
    identity: Identity,
    tx: FrameSender,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Admit a connection with its bound identity. O(1), never fails.
    pub async fn add(&self, identity: Identity, tx: FrameSender) -> ConnHandle {
        let id = Uuid::new_v4();
        let mut inner = self.inner.write().await;
        inner.by_user.entry(identity.user_id).or_default().insert(id);
        inner.conns.insert(id, Entry { identity, tx });
        ConnHandle(id)
    }

    /// Remove a connection. Idempotent: removing a handle twice is a no-op.
    /// Returns true iff the entry was still present, i.e. membership changed.
    pub async fn remove(&self, handle: ConnHandle) -> bool {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.conns.remove(&handle.0) else {
            return false;
        };
        if let Some(set) = inner.by_user.get_mut(&entry.identity.user_id) {
            set.remove(&handle.0);
            if set.is_empty() {
                inner.by_user.remove(&entry.identity.user_id);
            }
        }
        true
    }

    /// Every live connection bound to `user_id`, as a point-in-time snapshot
    /// taken under the lock. The returned senders stay valid even if the
    /// connection is removed mid-fan-out; a send to a gone peer is simply
    /// dropped.
    pub async fn live_connections_for(&self, user_id: Uuid) -> Vec<FrameSender> {
        let inner = self.inner.read().await;
        match inner.by_user.get(&user_id) {
            Some(conn_ids) => conn_ids
                .iter()
                .filter_map(|id| inner.conns.get(id))
                .map(|entry| entry.tx.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Distinct identities currently online.
    pub async fn snapshot(&self) -> Vec<OnlineUser> {
        self.inner.read().await.roster()
    }

    /// Roster plus every peer's sender, under a single lock acquisition, so
    /// the presence broadcaster announces a consistent view.
    pub(crate) async fn roster_and_peers(&self) -> (Vec<OnlineUser>, Vec<FrameSender>) {
        let inner = self.inner.read().await;
        let peers = inner.conns.values().map(|e| e.tx.clone()).collect();
        (inner.roster(), peers)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn roster(&self) -> Vec<OnlineUser> {
        let mut seen = HashSet::new();
        self.conns
            .values()
            .filter(|e| seen.insert(e.identity.user_id))
            .map(|e| OnlineUser {
                user_id: e.identity.user_id,
                username: e.identity.username.clone(),
            })
            .collect()
    }
}
