//! The run loop: Telegram long polling, dispatch, graceful shutdown.
//!
//! One cooperative loop drives inbound traffic. Plain text messages are
//! appended to the store; commands are routed and answered. The periodic
//! jobs run independently on the scheduler started here.

use chrono::Utc;
use tracing::{info, warn};

use charla_core::command::{Command, CommandContext};
use charla_core::snapshot::SnapshotStore;
use charla_core::transport::Transport;
use charla_infra::telegram::types::Update;
use charla_types::conversation::ConversationId;

use crate::scheduler::start_jobs;
use crate::state::AppState;

/// Server-side long-poll window for `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 50;

/// Pause after a failed `getUpdates` before retrying.
const POLL_BACKOFF: std::time::Duration = std::time::Duration::from_secs(5);

/// Run the bot until a shutdown signal arrives.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    // The first cleanup runs right after startup; snapshots may have
    // restored messages that already aged out.
    state.jobs.run_cleanup().await;

    let mut scheduler = start_jobs(state.jobs.clone(), &state.config).await?;

    info!("charla is polling for updates");
    let mut offset: Option<i64> = None;

    loop {
        tokio::select! {
            _ = shutdown_signal() => break,
            result = state.transport.get_updates(offset, POLL_TIMEOUT_SECS) => match result {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        handle_update(&state, update).await;
                    }
                }
                Err(err) => {
                    warn!(%err, "getUpdates failed, backing off");
                    tokio::time::sleep(POLL_BACKOFF).await;
                }
            },
        }
    }

    info!("shutdown signal received");
    if let Err(err) = scheduler.shutdown().await {
        warn!(%err, "scheduler shutdown failed");
    }

    if state.config.snapshot.flush_on_shutdown {
        let store = state.store.read().await;
        match state.snapshot.save(&store).await {
            Ok(()) => info!("final snapshot written"),
            Err(err) => warn!(%err, "final snapshot failed"),
        }
    }

    Ok(())
}

/// Dispatch one update: command replies or message recording.
async fn handle_update(state: &AppState, update: Update) {
    let Some(incoming) = update.message else {
        return;
    };
    let Some(text) = incoming.text else {
        return;
    };

    let conversation = ConversationId(incoming.chat.id);
    let (sender_id, sender_name) = match incoming.from {
        Some(user) => (user.id, user.first_name),
        None => (0, "desconocido".to_string()),
    };

    if text.starts_with('/') {
        // Unknown commands are ignored, like any other bot in the group
        let Some(command) = Command::parse(&text) else {
            return;
        };
        let ctx = CommandContext {
            conversation,
            sender_id,
            sender_name,
        };
        let reply = state.router.handle(command, &ctx).await;
        if let Err(err) = state.transport.send_message(conversation, &reply).await {
            warn!(%conversation, %err, "failed to send command reply");
        }
    } else {
        state.store.write().await.append(
            conversation,
            &sender_name,
            &text,
            Utc::now(),
            state.config.retention.max_messages,
        );
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
