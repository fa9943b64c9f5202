//! HTTP surface of parley: registration, login/logout, profile, the people
//! list, and message history. All reads and writes go against the persistent
//! store; the real-time side lives in parley-gateway.

pub mod auth;
pub mod messages;
pub mod middleware;
pub mod people;
