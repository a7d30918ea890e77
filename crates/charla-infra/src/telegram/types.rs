//! Telegram Bot API wire types.
//!
//! Only the fields the bot reads are modeled; everything else in the
//! platform's payloads is ignored by serde.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One update from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    /// Present for new-message updates; other update kinds are ignored.
    #[serde(default)]
    pub message: Option<Incoming>,
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Incoming {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    /// Absent for photos, stickers, joins, etc.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
}

/// Payload for `sendMessage`.
#[derive(Debug, Serialize)]
pub(crate) struct SendMessagePayload<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'static str,
}
