//! In-memory conversation store.
//!
//! Maps conversation ids to their retained messages and auto-summary flag.
//! The store is owned by the application (no global singleton): initialized
//! at startup (optionally from a snapshot), mutated throughout the process
//! lifetime, flushed periodically and optionally at shutdown.
//!
//! All mutations go through `&mut self`; the application shares the store as
//! an [`Arc<tokio::sync::RwLock<ConversationStore>>`] so the poll loop and
//! the periodic jobs get mutual exclusion around the read-then-trim sequence.

pub mod retention;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use charla_types::conversation::{Conversation, ConversationId, StoreStats, StoredMessage};

/// The store handle shared between the poll loop and the periodic jobs.
pub type SharedStore = Arc<RwLock<ConversationStore>>;

/// In-memory map from conversation id to per-group state.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<ConversationId, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a store for shared use.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Get-or-create accessor with a defined default: empty message list,
    /// auto-summary enabled.
    pub fn entry(&mut self, id: ConversationId) -> &mut Conversation {
        self.conversations.entry(id).or_default()
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.get(&id)
    }

    /// Record a message, then apply the count cap. Never fails; the
    /// conversation is created on first use.
    pub fn append(
        &mut self,
        id: ConversationId,
        author: &str,
        text: &str,
        now: DateTime<Utc>,
        max_messages: usize,
    ) {
        let conversation = self.entry(id);
        conversation
            .messages
            .push(StoredMessage::new(author, text, now));
        let dropped = retention::trim_by_count(&mut conversation.messages, max_messages);
        if dropped > 0 {
            debug!(%id, dropped, "count cap applied");
        }
    }

    /// All messages with `timestamp >= since`, in chronological order.
    /// Unknown conversations yield an empty vector. No side effects.
    pub fn recent_messages(&self, id: ConversationId, since: DateTime<Utc>) -> Vec<StoredMessage> {
        match self.conversations.get(&id) {
            Some(conversation) => conversation
                .messages
                .iter()
                .filter(|msg| msg.timestamp >= since)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn set_auto_summary(&mut self, id: ConversationId, enabled: bool) {
        self.entry(id).auto_summary = enabled;
    }

    /// Defaults to `true` for conversations never explicitly toggled.
    pub fn auto_summary_enabled(&self, id: ConversationId) -> bool {
        self.conversations
            .get(&id)
            .map(|conversation| conversation.auto_summary)
            .unwrap_or(true)
    }

    /// Mark a summary as in flight for this conversation. Returns `false`
    /// (without changing anything) if one is already running -- a second
    /// summary must not start while one is awaiting the model.
    pub fn begin_summary(&mut self, id: ConversationId) -> bool {
        let conversation = self.entry(id);
        if conversation.summary_in_flight {
            return false;
        }
        conversation.summary_in_flight = true;
        true
    }

    pub fn finish_summary(&mut self, id: ConversationId) {
        if let Some(conversation) = self.conversations.get_mut(&id) {
            conversation.summary_in_flight = false;
        }
    }

    /// Apply the age trim to every conversation. Returns the total number of
    /// dropped messages.
    pub fn trim_all_by_age(&mut self, now: DateTime<Utc>, max_age: Duration) -> usize {
        self.conversations
            .values_mut()
            .map(|conversation| retention::trim_by_age(&mut conversation.messages, now, max_age))
            .sum()
    }

    pub fn conversation_ids(&self) -> Vec<ConversationId> {
        self.conversations.keys().copied().collect()
    }

    /// Iterate conversations (used by the snapshot adapter).
    pub fn iter(&self) -> impl Iterator<Item = (ConversationId, &Conversation)> {
        self.conversations.iter().map(|(id, conv)| (*id, conv))
    }

    /// Insert a restored conversation (used by the snapshot adapter).
    pub fn insert(&mut self, id: ConversationId, conversation: Conversation) {
        self.conversations.insert(id, conversation);
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            conversations: self.conversations.len(),
            messages: self
                .conversations
                .values()
                .map(|conversation| conversation.messages.len())
                .sum(),
        }
    }
}
