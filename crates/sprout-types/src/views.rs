use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display-labeled message as a session presents it.
/// Distinct from the stored [`Message`](crate::models::Message) so the
/// persistence layer stays independent of presentation concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    /// Sender resolved to a human-readable display name, falling back to the
    /// raw identity string when no account record matches.
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    /// True when the session's own identity is the sender.
    pub outgoing: bool,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    /// "You" for the session's own replies, otherwise the counterpart's
    /// role label ("Teacher" / "Parent" / "Student").
    pub author: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}
