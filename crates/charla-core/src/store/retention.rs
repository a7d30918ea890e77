//! Retention policy: pure trimming functions.
//!
//! Two independent trims, both idempotent and order-preserving. The age trim
//! runs on the periodic cleanup tick across every conversation; the count
//! trim runs synchronously on every append.

use chrono::{DateTime, Duration, Utc};

use charla_types::conversation::StoredMessage;

/// Drop all messages older than `now - max_age`. Returns how many were
/// dropped.
pub fn trim_by_age(
    messages: &mut Vec<StoredMessage>,
    now: DateTime<Utc>,
    max_age: Duration,
) -> usize {
    let cutoff = now - max_age;
    let before = messages.len();
    messages.retain(|msg| msg.timestamp >= cutoff);
    before - messages.len()
}

/// If the sequence exceeds `max_count`, drop the oldest messages so exactly
/// the newest `max_count` remain. Returns how many were dropped.
pub fn trim_by_count(messages: &mut Vec<StoredMessage>, max_count: usize) -> usize {
    if messages.len() <= max_count {
        return 0;
    }
    let excess = messages.len() - max_count;
    messages.drain(..excess);
    excess
}
