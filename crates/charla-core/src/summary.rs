//! Summarization gateway.
//!
//! [`Summarizer`] turns an already-windowed message sequence into a prompt
//! and asks a [`SummaryModel`] for the digest text. The gateway does not
//! filter by time itself, and it performs exactly one attempt -- failure
//! mapping to [`SummaryError`] is the model implementation's job.
//!
//! Callers must short-circuit empty windows before invoking the gateway;
//! summarizing zero messages is a precondition violation, not an error the
//! gateway handles.

use charla_types::conversation::StoredMessage;
use charla_types::error::SummaryError;

/// System prompt for the digest LLM call.
const SUMMARY_SYSTEM_PROMPT: &str = "Eres un asistente que resume conversaciones \
de grupos de chat. Genera un resumen completo de la conversación, de hasta 800 \
palabras, identificando los temas principales, los participantes clave y las \
conclusiones importantes. El resumen debe estar en español, ser fácil de leer y \
usar un estilo informal con formato de lista ordenada. Haz uso de emoticonos y \
emojis típicos de un chat de grupo.";

/// Trait for the text-generation backend (implemented in `charla-infra`).
///
/// Uses native async fn in traits (RPITIT); the application pins a concrete
/// implementation, so no boxing is needed.
pub trait SummaryModel: Send + Sync {
    /// Run one completion: fixed system instruction plus the user turn.
    fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> impl std::future::Future<Output = Result<String, SummaryError>> + Send;
}

/// Format a message window as a transcript: `"{author}: {text}"` per line,
/// chronological order.
pub fn format_transcript(messages: &[StoredMessage]) -> String {
    messages
        .iter()
        .map(|msg| format!("{}: {}", msg.author, msg.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats windows into prompts and calls the model.
#[derive(Debug, Clone)]
pub struct Summarizer<M> {
    model: M,
    window_hours: u32,
    max_tokens: u32,
}

impl<M: SummaryModel> Summarizer<M> {
    pub fn new(model: M, window_hours: u32, max_tokens: u32) -> Self {
        Self {
            model,
            window_hours,
            max_tokens,
        }
    }

    /// Summarize an already-windowed, non-empty message sequence. Returns
    /// the generated text verbatim.
    #[tracing::instrument(
        name = "summarize_window",
        skip(self, messages),
        fields(message_count = messages.len())
    )]
    pub async fn summarize(&self, messages: &[StoredMessage]) -> Result<String, SummaryError> {
        debug_assert!(!messages.is_empty(), "caller must check the window first");

        let transcript = format_transcript(messages);
        let user = format!(
            "Resume la siguiente conversación de las últimas {} horas:\n\n{transcript}",
            self.window_hours
        );

        self.model
            .complete(SUMMARY_SYSTEM_PROMPT, &user, self.max_tokens)
            .await
    }
}
