//! JSON snapshot persistence for the conversation store.
//!
//! One structured file on local disk:
//!
//! ```json
//! {
//!   "conversations": {
//!     "-1001234": {
//!       "messages": [{"author": "Ana", "text": "hola", "time": "2025-03-01T12:00:00Z"}],
//!       "auto_summary_enabled": true
//!     }
//!   }
//! }
//! ```
//!
//! Conversation keys are the decimal rendering of the in-memory `i64` id;
//! timestamps are ISO-8601 with second precision. Writes go to a temp file
//! first and are renamed into place -- last successful write wins.
//!
//! Load degrades instead of failing startup: a missing file is an empty
//! store; a message with an unparseable timestamp keeps the message stamped
//! with the load instant; an unparseable key skips that conversation; a file
//! that is not valid JSON at all is quarantined to `<path>.corrupt` (so the
//! next snapshot tick cannot clobber it) and an empty store is returned.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use charla_core::snapshot::SnapshotStore;
use charla_core::store::ConversationStore;
use charla_types::conversation::{Conversation, ConversationId, StoredMessage};
use charla_types::error::SnapshotError;

/// Snapshot adapter writing to a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonSnapshot {
    path: PathBuf,
}

impl JsonSnapshot {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    // BTreeMap keeps the file diff-stable across writes
    conversations: BTreeMap<String, SnapshotConversation>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotConversation {
    messages: Vec<SnapshotMessage>,
    auto_summary_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotMessage {
    author: String,
    text: String,
    time: String,
}

fn encode(store: &ConversationStore) -> SnapshotFile {
    let conversations = store
        .iter()
        .map(|(id, conversation)| {
            let messages = conversation
                .messages
                .iter()
                .map(|msg| SnapshotMessage {
                    author: msg.author.clone(),
                    text: msg.text.clone(),
                    time: msg.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                })
                .collect();
            (
                id.to_string(),
                SnapshotConversation {
                    messages,
                    auto_summary_enabled: conversation.auto_summary,
                },
            )
        })
        .collect();
    SnapshotFile { conversations }
}

fn decode(file: SnapshotFile, loaded_at: DateTime<Utc>) -> ConversationStore {
    let mut store = ConversationStore::new();
    for (key, wire) in file.conversations {
        let id: ConversationId = match key.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(%key, "skipping conversation with non-numeric snapshot key");
                continue;
            }
        };

        let messages = wire
            .messages
            .into_iter()
            .map(|msg| {
                let timestamp = match DateTime::parse_from_rfc3339(&msg.time) {
                    Ok(t) => t.with_timezone(&Utc),
                    Err(_) => {
                        warn!(%id, time = %msg.time, "unparseable message timestamp, using load time");
                        loaded_at
                    }
                };
                StoredMessage::new(msg.author, msg.text, timestamp)
            })
            .collect();

        store.insert(
            id,
            Conversation {
                messages,
                auto_summary: wire.auto_summary_enabled,
                summary_in_flight: false,
            },
        );
    }
    store
}

impl SnapshotStore for JsonSnapshot {
    async fn save(&self, store: &ConversationStore) -> Result<(), SnapshotError> {
        let body = serde_json::to_vec_pretty(&encode(store))
            .map_err(|err| SnapshotError::Encode(err.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn load(&self) -> Result<ConversationStore, SnapshotError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ConversationStore::new());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<SnapshotFile>(&raw) {
            Ok(file) => Ok(decode(file, Utc::now())),
            Err(err) => {
                // Quarantine the file so the periodic save cannot overwrite
                // the only copy of the data.
                let quarantine = self.path.with_extension("json.corrupt");
                error!(
                    path = %self.path.display(),
                    quarantine = %quarantine.display(),
                    %err,
                    "snapshot is not valid JSON, starting with an empty store"
                );
                if let Err(rename_err) = tokio::fs::rename(&self.path, &quarantine).await {
                    warn!(%rename_err, "could not quarantine corrupt snapshot");
                }
                Ok(ConversationStore::new())
            }
        }
    }
}
