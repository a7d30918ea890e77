//! Conversation and message types for charla.
//!
//! A conversation is one monitored chat group, identified by the platform's
//! numeric chat id. Messages are immutable once recorded and are owned by
//! their conversation's message vector, in arrival order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a monitored chat group.
///
/// Canonically an `i64` (Telegram chat ids are signed 64-bit; group chats
/// are negative). The snapshot file stores the decimal string rendering of
/// the same value, converted through `Display`/`FromStr` on both the save
/// and load paths so the key type survives a persistence round-trip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(ConversationId)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        ConversationId(id)
    }
}

/// A single recorded group message.
///
/// Timestamps are instants (`DateTime<Utc>`) internally; the string form
/// exists only at the snapshot boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Display name of the author.
    pub author: String,
    /// Message text.
    pub text: String,
    /// Arrival time.
    pub timestamp: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(
        author: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            timestamp,
        }
    }
}

/// Per-group state: the retained messages plus the auto-summary toggle.
///
/// Created lazily on first message or first toggle; never destroyed, only
/// emptied by retention trimming.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Retained messages, insertion order = chronological order.
    pub messages: Vec<StoredMessage>,
    /// Whether the periodic auto-summary tick acts on this conversation.
    pub auto_summary: bool,
    /// A summary request is currently awaiting the model for this
    /// conversation. Runtime-only, never serialized.
    pub summary_in_flight: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            auto_summary: true,
            summary_in_flight: false,
        }
    }
}

/// Aggregate counts over the whole store, reported by `/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub conversations: usize,
    pub messages: usize,
}
