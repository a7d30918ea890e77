//! Chat transport seam.
//!
//! The platform integration (receiving updates, command dispatch) lives in
//! `charla-infra` and the binary; core only needs the outbound primitive to
//! publish summaries and error notices.

use charla_types::conversation::ConversationId;
use charla_types::error::TransportError;

/// Outbound send primitive provided by the chat platform integration.
pub trait Transport: Send + Sync {
    /// Deliver `text` to the given conversation.
    fn send_message(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}
