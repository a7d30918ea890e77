//! Application state wiring all services together.
//!
//! Core services are generic over the model/transport/snapshot traits;
//! AppState pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use charla_core::command::CommandRouter;
use charla_core::command::auth::Authorizer;
use charla_core::jobs::{DigestJobs, JobSettings};
use charla_core::store::{ConversationStore, SharedStore};
use charla_core::summary::Summarizer;
use charla_core::snapshot::SnapshotStore;
use charla_infra::config::{Secrets, load_config, resolve_data_dir, snapshot_path};
use charla_infra::llm::OpenAiSummaryModel;
use charla_infra::snapshot::JsonSnapshot;
use charla_infra::telegram::TelegramApi;
use charla_types::config::BotConfig;

/// Concrete type aliases pinning the core generics to infra implementations.
pub type ConcreteJobs = DigestJobs<OpenAiSummaryModel, TelegramApi, JsonSnapshot>;
pub type ConcreteRouter = CommandRouter<OpenAiSummaryModel>;

/// Shared application state for the run loop.
pub struct AppState {
    pub config: BotConfig,
    pub store: SharedStore,
    pub transport: TelegramApi,
    pub snapshot: JsonSnapshot,
    pub jobs: Arc<ConcreteJobs>,
    pub router: Arc<ConcreteRouter>,
}

impl AppState {
    /// Initialize the application: resolve the data dir, load config and
    /// secrets, restore the store from the snapshot, wire the services.
    pub async fn init(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(resolve_data_dir);
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let secrets = Secrets::from_env()?;

        let snapshot = JsonSnapshot::new(snapshot_path(&data_dir));
        let store = match snapshot.load().await {
            Ok(store) => store,
            Err(err) => {
                warn!(%err, "snapshot could not be read, starting with an empty store");
                ConversationStore::new()
            }
        };
        let stats = store.stats();
        info!(
            conversations = stats.conversations,
            messages = stats.messages,
            "store restored"
        );
        let store = store.into_shared();

        let model = OpenAiSummaryModel::new(&secrets.openai_api_key, config.summary.model.as_str());
        let summarizer = Summarizer::new(
            model,
            config.summary.window_hours,
            config.summary.max_tokens,
        );
        let transport = TelegramApi::new(&secrets.telegram_token);

        let jobs = Arc::new(DigestJobs::new(
            store.clone(),
            summarizer.clone(),
            transport.clone(),
            snapshot.clone(),
            JobSettings {
                summary_window: Duration::hours(i64::from(config.summary.window_hours)),
                max_age: Duration::hours(i64::from(config.retention.max_age_hours)),
            },
        ));

        let router = Arc::new(CommandRouter::new(
            store.clone(),
            summarizer,
            Authorizer::new(config.admin_user_ids.clone()),
            config.summary.window_hours,
        ));

        Ok(Self {
            config,
            store,
            transport,
            snapshot,
            jobs,
            router,
        })
    }
}
