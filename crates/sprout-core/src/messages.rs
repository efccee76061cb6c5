//! Single source of truth for cross-role communication.
//!
//! The full message list lives under one key; every mutation is
//! read-full-list, modify, write-full-list. Linear scans are fine at the
//! scale this store serves.

use std::sync::Arc;

use chrono::Utc;
use sprout_store::{Store, keys};
use sprout_types::{Message, Reply, Role};
use tracing::debug;

use crate::error::CoreError;

#[derive(Clone)]
pub struct MessageStore {
    store: Arc<Store>,
}

impl MessageStore {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<Vec<Message>, CoreError> {
        Ok(self.store.get(keys::GLOBAL_MESSAGES)?.unwrap_or_default())
    }

    fn save(&self, all: &[Message]) -> Result<(), CoreError> {
        self.store.set(keys::GLOBAL_MESSAGES, &all)?;
        Ok(())
    }

    /// Create a message with a fresh id and timestamp and prepend it, so the
    /// stored list stays newest-first. Identities are taken as given; the
    /// caller resolves them beforehand.
    pub fn add_message(
        &self,
        from: &str,
        from_role: Role,
        to: &str,
        to_role: Role,
        subject: &str,
        body: &str,
    ) -> Result<Message, CoreError> {
        let message = Message {
            id: fresh_id(),
            from: from.to_string(),
            from_role,
            to: to.to_string(),
            to_role,
            subject: subject.to_string(),
            body: body.to_string(),
            timestamp: Utc::now(),
            is_read: false,
            replies: Vec::new(),
        };

        let mut all = self.load()?;
        all.insert(0, message.clone());
        self.save(&all)?;

        debug!("message {} added ({} -> {})", message.id, from, to);
        Ok(message)
    }

    /// Append a reply with a fresh timestamp. Unknown ids are an explicit
    /// [`CoreError::NotFound`] with no side effects.
    pub fn add_reply(
        &self,
        message_id: &str,
        from: &str,
        from_role: Role,
        body: &str,
    ) -> Result<Reply, CoreError> {
        let mut all = self.load()?;
        let message = all
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| CoreError::NotFound(message_id.to_string()))?;

        let reply = Reply {
            from: from.to_string(),
            from_role,
            body: body.to_string(),
            timestamp: Utc::now(),
        };
        message.replies.push(reply.clone());

        self.save(&all)?;
        Ok(reply)
    }

    /// Idempotent: re-reading an already-read message is not an error.
    pub fn mark_as_read(&self, message_id: &str) -> Result<(), CoreError> {
        let mut all = self.load()?;
        let message = all
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| CoreError::NotFound(message_id.to_string()))?;

        if !message.is_read {
            message.is_read = true;
            self.save(&all)?;
        }
        Ok(())
    }

    /// All messages visible to `(identity, role)`, in stored (newest-first)
    /// order. Identity matching is case-insensitive; role matching is exact.
    pub fn messages_for_user(&self, identity: &str, role: Role) -> Result<Vec<Message>, CoreError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|m| m.visible_to(identity, role))
            .collect())
    }
}

/// Unique message id: creation millis plus a random suffix.
fn fresh_id() -> String {
    format!("{}-{:08x}", Utc::now().timestamp_millis(), rand::random::<u32>())
}
