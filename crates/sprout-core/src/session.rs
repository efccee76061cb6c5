//! A logged-in role's window onto the shared state: sending and answering
//! messages, and deriving the display-labeled view the UI renders.

use std::sync::Arc;
use std::time::Duration;

use sprout_store::{Store, keys};
use sprout_types::{Message, MessageView, Reply, ReplyView, Role, SessionSnapshot};

use crate::accounts::Accounts;
use crate::error::CoreError;
use crate::messages::MessageStore;
use crate::sync::{self, SyncHandle};

#[derive(Clone)]
pub struct Session {
    snapshot: SessionSnapshot,
    store: Arc<Store>,
    messages: MessageStore,
    accounts: Accounts,
}

impl Session {
    pub fn new(store: Arc<Store>, snapshot: SessionSnapshot) -> Self {
        Self {
            messages: MessageStore::new(store.clone()),
            accounts: Accounts::new(store.clone()),
            store,
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn identity(&self) -> &str {
        &self.snapshot.identity
    }

    pub fn role(&self) -> Role {
        self.snapshot.role
    }

    // -- Mutations --

    pub fn send_message(
        &self,
        to: &str,
        to_role: Role,
        subject: &str,
        body: &str,
    ) -> Result<Message, CoreError> {
        self.messages
            .add_message(self.identity(), self.role(), to, to_role, subject, body)
    }

    pub fn reply(&self, message_id: &str, body: &str) -> Result<Reply, CoreError> {
        self.messages
            .add_reply(message_id, self.identity(), self.role(), body)
    }

    pub fn mark_as_read(&self, message_id: &str) -> Result<(), CoreError> {
        self.messages.mark_as_read(message_id)
    }

    // -- Views --

    /// Recompute the session's message view from the store: fetch visible
    /// messages, resolve endpoints to display names, relabel replies, and
    /// persist the result to the dashboard cache.
    pub fn refresh_view(&self) -> Result<Vec<MessageView>, CoreError> {
        let views = self
            .messages
            .messages_for_user(self.identity(), self.role())?
            .into_iter()
            .map(|m| self.label(m))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(key) = self.cache_key() {
            self.store.set(&key, &views)?;
        }
        Ok(views)
    }

    /// Last persisted view, for rendering before the first poll completes.
    pub fn cached_view(&self) -> Result<Vec<MessageView>, CoreError> {
        match self.cache_key() {
            Some(key) => Ok(self.store.get(&key)?.unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    /// Spawn the polling synchronizer for this session. Dropping (or
    /// stopping) the returned handle tears the poller down.
    pub fn start_sync(&self, interval: Duration) -> SyncHandle {
        sync::spawn(self.clone(), interval)
    }

    /// Clears the persisted session snapshot. The caller drops any
    /// [`SyncHandle`] it holds, which cancels the poller.
    pub fn logout(self) -> Result<(), CoreError> {
        self.accounts.logout(self.snapshot.role)
    }

    fn cache_key(&self) -> Option<String> {
        match self.snapshot.role {
            Role::Parent => Some(keys::parent_data(self.snapshot.account_id)),
            Role::Teacher => Some(keys::teacher_data(self.snapshot.account_id)),
            Role::Student => None,
        }
    }

    fn is_self(&self, identity: &str, role: Role) -> bool {
        role == self.role() && identity.eq_ignore_ascii_case(self.identity())
    }

    fn label(&self, message: Message) -> Result<MessageView, CoreError> {
        let outgoing = self.is_self(&message.from, message.from_role);

        let replies = message
            .replies
            .iter()
            .map(|r| ReplyView {
                author: if self.is_self(&r.from, r.from_role) {
                    "You".to_string()
                } else {
                    r.from_role.label().to_string()
                },
                body: r.body.clone(),
                timestamp: r.timestamp,
            })
            .collect();

        Ok(MessageView {
            from: self.accounts.display_name(&message.from, message.from_role)?,
            to: self.accounts.display_name(&message.to, message.to_role)?,
            id: message.id,
            subject: message.subject,
            body: message.body,
            timestamp: message.timestamp,
            is_read: message.is_read,
            outgoing,
            replies,
        })
    }
}
