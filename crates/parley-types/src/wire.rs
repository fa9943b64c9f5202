use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound frame, client -> server. The fields are all optional on the wire:
/// a frame missing `recipient` or `text` is treated as malformed and dropped
/// by the relay rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    pub recipient: Option<Uuid>,
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Attachment>,
}

/// File attachment riding along with a message, base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub data: String,
}

/// Outbound frames, server -> client. Plain JSON objects distinguished by
/// shape, not by a type tag: clients check for an `online` key, then `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    /// Full roster re-announcement, pushed to every live connection on each
    /// registry membership change.
    Roster { online: Vec<OnlineUser> },

    /// One delivered message; `id` is the persisted record's identifier and
    /// is identical across every connection of the recipient.
    Delivery {
        text: String,
        sender: Uuid,
        recipient: Uuid,
        id: i64,
    },

    /// Persistence failure, reported only to the originating sender.
    Error { error: String },
}

/// One entry of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUser {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub username: String,
}
