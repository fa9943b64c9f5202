use std::time::Duration;

use tokio::time::Instant;

/// Ping cadence. Part of the wire contract: clients expect a ping every 5s.
pub const PING_INTERVAL: Duration = Duration::from_secs(5);

/// How long a pong may take before the peer is declared dead. Also part of
/// the wire contract.
pub const PONG_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-connection liveness state: Alive ⇄ PingOutstanding. The terminal Dead
/// state is the connection loop breaking out; removal from the registry is
/// idempotent so the timeout path and a concurrent peer close converge.
#[derive(Debug)]
pub struct Heartbeat {
    awaiting_pong: bool,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self {
            awaiting_pong: false,
        }
    }

    /// A ping was just written; returns a fresh deadline, `PONG_TIMEOUT` from
    /// `now`, to arm. Callers never re-ping with a pong outstanding: the
    /// deadline resolves before the next ping tick.
    pub fn ping_sent(&mut self, now: Instant) -> Instant {
        self.awaiting_pong = true;
        now + PONG_TIMEOUT
    }

    /// The peer answered; disarm the deadline.
    pub fn pong_received(&mut self) {
        self.awaiting_pong = false;
    }

    /// Whether a pong deadline is currently armed.
    pub fn awaiting_pong(&self) -> bool {
        self.awaiting_pong
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}
