//! Telegram Bot API transport.
//!
//! A thin reqwest client over the HTTP Bot API: `getUpdates` long polling
//! for inbound traffic and `sendMessage` for the core [`Transport`] seam.
//! Replies use Markdown parse mode, matching the summary formatting.

pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use charla_core::transport::Transport;
use charla_types::conversation::ConversationId;
use charla_types::error::TransportError;

use self::types::{ApiEnvelope, SendMessagePayload, Update};

/// Telegram Bot API client.
///
/// Does NOT derive Debug: the bot token is part of every request URL.
#[derive(Clone)]
pub struct TelegramApi {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: &SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{}", token.expose_secret()),
        }
    }

    /// Fetch pending updates, long-polling up to `timeout_secs` server-side.
    ///
    /// Pass the last seen `update_id + 1` as `offset` to acknowledge
    /// previous updates.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let mut params: Vec<(&str, String)> = vec![("timeout", timeout_secs.to_string())];
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/getUpdates", self.base_url))
            .query(&params)
            // Client-side timeout must outlast the server-side long poll
            .timeout(Duration::from_secs(timeout_secs + 10))
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let envelope: ApiEnvelope<Vec<Update>> = response
            .json()
            .await
            .map_err(|err| TransportError::MalformedResponse(err.to_string()))?;

        let updates = unwrap_envelope(envelope)?;
        debug!(count = updates.len(), "updates fetched");
        Ok(updates)
    }
}

impl Transport for TelegramApi {
    async fn send_message(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> Result<(), TransportError> {
        let payload = SendMessagePayload {
            chat_id: conversation.0,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .http
            .post(format!("{}/sendMessage", self.base_url))
            .json(&payload)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let envelope: ApiEnvelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|err| TransportError::MalformedResponse(err.to_string()))?;

        unwrap_envelope(envelope).map(|_| ())
    }
}

fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T, TransportError> {
    if !envelope.ok {
        return Err(TransportError::Api {
            description: envelope
                .description
                .unwrap_or_else(|| "unknown platform error".to_string()),
        });
    }
    envelope.result.ok_or_else(|| {
        TransportError::MalformedResponse("ok response without a result".to_string())
    })
}
