//! The real-time core of parley: identity binding for WebSocket upgrades,
//! the process-wide connection registry, per-connection liveness supervision,
//! the message relay with at-most-once persistence, and full-roster presence
//! announcements.

pub mod blobs;
pub mod connection;
pub mod identity;
pub mod liveness;
pub mod presence;
pub mod registry;
pub mod relay;
