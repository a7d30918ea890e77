//! Bot commands: parsing and handlers.
//!
//! The transport layer turns inbound updates into [`Command`] values plus a
//! [`CommandContext`]; the [`CommandRouter`] produces the reply text. All
//! replies are Spanish, matching the bot's summary language.

pub mod auth;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use charla_types::conversation::ConversationId;

use self::auth::Authorizer;
use crate::store::SharedStore;
use crate::summary::{SummaryModel, Summarizer};

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/resumen` -- summarize the recent window right now.
    Summarize,
    /// `/stop` -- disable auto-summaries for this conversation (gated).
    Stop,
    /// `/activar_resumenes` -- re-enable auto-summaries (gated).
    Enable,
    Status,
}

impl Command {
    /// Parse the leading token of a message as a command. Accepts the
    /// `@botname` suffix Telegram appends in groups. Unknown commands and
    /// plain text yield `None`.
    pub fn parse(text: &str) -> Option<Command> {
        let first = text.split_whitespace().next()?;
        let name = first.split('@').next().unwrap_or(first);
        match name {
            "/start" => Some(Command::Start),
            "/help" => Some(Command::Help),
            "/resumen" => Some(Command::Summarize),
            "/stop" => Some(Command::Stop),
            "/activar_resumenes" => Some(Command::Enable),
            "/status" => Some(Command::Status),
            _ => None,
        }
    }
}

/// Who sent a command, and where.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub conversation: ConversationId,
    pub sender_id: i64,
    pub sender_name: String,
}

const DENIED: &str = "⛔ Solo un administrador puede usar este comando.";
const STOPPED: &str = "✅ Los resúmenes automáticos han sido desactivados para este grupo. \
Puedes reactivarlos con /activar_resumenes";
const ENABLED: &str = "✅ Los resúmenes automáticos han sido reactivados para este grupo.";
const SUMMARY_RUNNING: &str = "⏳ Ya hay un resumen en marcha para este grupo. Espera un momento.";
const SUMMARY_FAILED: &str = "⚠️ No se pudo generar el resumen. Inténtalo de nuevo en unos minutos.";

/// Turns commands into replies.
pub struct CommandRouter<M> {
    store: SharedStore,
    summarizer: Summarizer<M>,
    authorizer: Authorizer,
    window_hours: u32,
    started_at: DateTime<Utc>,
}

impl<M: SummaryModel> CommandRouter<M> {
    pub fn new(
        store: SharedStore,
        summarizer: Summarizer<M>,
        authorizer: Authorizer,
        window_hours: u32,
    ) -> Self {
        Self {
            store,
            summarizer,
            authorizer,
            window_hours,
            started_at: Utc::now(),
        }
    }

    /// Handle one command and return the reply to send back.
    pub async fn handle(&self, command: Command, ctx: &CommandContext) -> String {
        match command {
            Command::Start => self.start_text(),
            Command::Help => self.help_text(),
            Command::Summarize => self.summarize_now(ctx).await,
            Command::Stop => self.set_auto_summary(ctx, false).await,
            Command::Enable => self.set_auto_summary(ctx, true).await,
            Command::Status => self.status_text(ctx).await,
        }
    }

    fn start_text(&self) -> String {
        format!(
            "¡Hola! Soy un bot que resume los mensajes del grupo con IA. Usa /resumen \
para obtener un resumen de las últimas {} horas. Con /stop puedes desactivar los \
resúmenes automáticos.",
            self.window_hours
        )
    }

    fn help_text(&self) -> String {
        "🤖 *COMANDOS DISPONIBLES* 🤖\n\n\
• /start - Mensaje de bienvenida\n\
• /help - Esta lista de comandos\n\
• /resumen - Genera un resumen de los mensajes recientes\n\
• /stop - Desactiva los resúmenes automáticos\n\
• /activar_resumenes - Reactiva los resúmenes automáticos\n\
• /status - Estado actual del bot"
            .to_string()
    }

    async fn set_auto_summary(&self, ctx: &CommandContext, enabled: bool) -> String {
        if !self.authorizer.is_admin(ctx.sender_id) {
            info!(
                conversation = %ctx.conversation,
                sender = ctx.sender_id,
                "gated command denied"
            );
            return DENIED.to_string();
        }
        self.store
            .write()
            .await
            .set_auto_summary(ctx.conversation, enabled);
        info!(conversation = %ctx.conversation, enabled, "auto-summary toggled");
        if enabled { ENABLED } else { STOPPED }.to_string()
    }

    /// On-demand summary: same windowing and gateway logic as the periodic
    /// tick, but for a single conversation, with failures reported directly
    /// to the requester.
    async fn summarize_now(&self, ctx: &CommandContext) -> String {
        let id = ctx.conversation;
        let since = Utc::now() - Duration::hours(i64::from(self.window_hours));

        let window = self.store.read().await.recent_messages(id, since);
        if window.is_empty() {
            return format!(
                "ℹ️ No hay mensajes en las últimas {} horas. Nada que resumir.",
                self.window_hours
            );
        }
        if !self.store.write().await.begin_summary(id) {
            return SUMMARY_RUNNING.to_string();
        }

        let result = self.summarizer.summarize(&window).await;
        self.store.write().await.finish_summary(id);

        match result {
            Ok(summary) => format!(
                "📝 *Resumen de las últimas {} horas:*\n\n{summary}",
                self.window_hours
            ),
            Err(err) => {
                warn!(conversation = %id, %err, "on-demand summary failed");
                SUMMARY_FAILED.to_string()
            }
        }
    }

    async fn status_text(&self, ctx: &CommandContext) -> String {
        let (stats, enabled) = {
            let store = self.store.read().await;
            (store.stats(), store.auto_summary_enabled(ctx.conversation))
        };
        format!(
            "📊 *Estado del bot*\n\n\
• Grupos monitorizados: {}\n\
• Mensajes retenidos: {}\n\
• Resúmenes automáticos aquí: {}\n\
• Tiempo en marcha: {}",
            stats.conversations,
            stats.messages,
            if enabled { "activados" } else { "desactivados" },
            format_uptime(Utc::now() - self.started_at),
        )
    }
}

/// Render an uptime as `"2d 3h 15m"` (hours/minutes only while under a day).
fn format_uptime(elapsed: Duration) -> String {
    let minutes = elapsed.num_minutes().max(0);
    let (days, hours, mins) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);
    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charla_types::error::SummaryError;
    use crate::store::ConversationStore;

    #[derive(Clone)]
    struct FixedModel {
        response: Result<&'static str, &'static str>,
    }

    impl SummaryModel for FixedModel {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _max_tokens: u32,
        ) -> Result<String, SummaryError> {
            match self.response {
                Ok(text) => Ok(text.to_string()),
                Err(message) => Err(SummaryError::Provider {
                    message: message.to_string(),
                }),
            }
        }
    }

    fn router(
        store: SharedStore,
        admins: Vec<i64>,
        response: Result<&'static str, &'static str>,
    ) -> CommandRouter<FixedModel> {
        CommandRouter::new(
            store,
            Summarizer::new(FixedModel { response }, 6, 800),
            Authorizer::new(admins),
            6,
        )
    }

    fn ctx(conversation: i64, sender: i64) -> CommandContext {
        CommandContext {
            conversation: ConversationId(conversation),
            sender_id: sender,
            sender_name: "Ana".to_string(),
        }
    }

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/resumen"), Some(Command::Summarize));
        assert_eq!(Command::parse("/stop"), Some(Command::Stop));
        assert_eq!(Command::parse("/activar_resumenes"), Some(Command::Enable));
        assert_eq!(Command::parse("/status extra words"), Some(Command::Status));
    }

    #[test]
    fn test_parse_strips_bot_mention() {
        assert_eq!(Command::parse("/resumen@charla_bot"), Some(Command::Summarize));
    }

    #[test]
    fn test_parse_rejects_unknown_and_plain_text() {
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("hola a todos"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[tokio::test]
    async fn test_stop_denied_for_non_admin() {
        let shared = ConversationStore::new().into_shared();
        let router = router(shared.clone(), vec![42], Ok("x"));

        let reply = router.handle(Command::Stop, &ctx(100, 7)).await;

        assert_eq!(reply, DENIED);
        // Flag untouched
        assert!(shared.read().await.auto_summary_enabled(ConversationId(100)));
    }

    #[tokio::test]
    async fn test_stop_and_enable_for_admin() {
        let shared = ConversationStore::new().into_shared();
        let router = router(shared.clone(), vec![42], Ok("x"));

        let reply = router.handle(Command::Stop, &ctx(100, 42)).await;
        assert!(reply.contains("desactivados"));
        assert!(!shared.read().await.auto_summary_enabled(ConversationId(100)));

        let reply = router.handle(Command::Enable, &ctx(100, 42)).await;
        assert!(reply.contains("reactivados"));
        assert!(shared.read().await.auto_summary_enabled(ConversationId(100)));
    }

    #[tokio::test]
    async fn test_summarize_empty_window_short_circuits() {
        let shared = ConversationStore::new().into_shared();
        // A model error here would mean the gateway was invoked
        let router = router(shared, vec![], Err("must not be called"));

        let reply = router.handle(Command::Summarize, &ctx(100, 7)).await;

        assert!(reply.contains("Nada que resumir"));
    }

    #[tokio::test]
    async fn test_summarize_success_wraps_summary() {
        let mut store = ConversationStore::new();
        store.append(ConversationId(100), "Ana", "hola", Utc::now(), 5000);
        let router = router(store.into_shared(), vec![], Ok("1. Saludos 👋"));

        let reply = router.handle(Command::Summarize, &ctx(100, 7)).await;

        assert!(reply.starts_with("📝 *Resumen de las últimas 6 horas:*"));
        assert!(reply.contains("1. Saludos 👋"));
    }

    #[tokio::test]
    async fn test_summarize_failure_reports_to_requester() {
        let mut store = ConversationStore::new();
        store.append(ConversationId(100), "Ana", "hola", Utc::now(), 5000);
        let shared = store.into_shared();
        let router = router(shared.clone(), vec![], Err("boom"));

        let reply = router.handle(Command::Summarize, &ctx(100, 7)).await;

        assert_eq!(reply, SUMMARY_FAILED);
        // Guard released even on failure
        assert!(shared.write().await.begin_summary(ConversationId(100)));
    }

    #[tokio::test]
    async fn test_summarize_while_in_flight() {
        let mut store = ConversationStore::new();
        store.append(ConversationId(100), "Ana", "hola", Utc::now(), 5000);
        store.begin_summary(ConversationId(100));
        let router = router(store.into_shared(), vec![], Ok("x"));

        let reply = router.handle(Command::Summarize, &ctx(100, 7)).await;

        assert_eq!(reply, SUMMARY_RUNNING);
    }

    #[tokio::test]
    async fn test_status_reports_counts_and_flag() {
        let mut store = ConversationStore::new();
        store.append(ConversationId(100), "Ana", "hola", Utc::now(), 5000);
        store.append(ConversationId(200), "Beto", "buenas", Utc::now(), 5000);
        store.set_auto_summary(ConversationId(100), false);
        let router = router(store.into_shared(), vec![], Ok("x"));

        let reply = router.handle(Command::Status, &ctx(100, 7)).await;

        assert!(reply.contains("Grupos monitorizados: 2"));
        assert!(reply.contains("Mensajes retenidos: 2"));
        assert!(reply.contains("desactivados"));
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::minutes(5)), "5m");
        assert_eq!(format_uptime(Duration::minutes(125)), "2h 5m");
        assert_eq!(format_uptime(Duration::minutes(1445)), "1d 0h 5m");
        assert_eq!(format_uptime(Duration::seconds(-3)), "0m");
    }
}
