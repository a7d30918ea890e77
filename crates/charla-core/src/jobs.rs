//! Periodic jobs: cleanup, auto-summary, snapshot.
//!
//! Each job is a standalone unit of work invoked on a timer by the binary's
//! scheduler. They share the store handle; windows are cloned out under the
//! lock and the lock is released before awaiting the model, so a slow
//! summarization never blocks message intake.

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use charla_types::conversation::{ConversationId, StoredMessage};

use crate::snapshot::SnapshotStore;
use crate::store::SharedStore;
use crate::summary::{SummaryModel, Summarizer};
use crate::transport::Transport;

/// Notice sent to a conversation whose auto-summary failed.
const AUTO_SUMMARY_FAILED: &str =
    "⚠️ No se pudo generar el resumen automático. Lo intentaré en la próxima pasada.";

/// Retention and windowing settings for the periodic jobs.
#[derive(Debug, Clone, Copy)]
pub struct JobSettings {
    /// Trailing window fed to the summarizer.
    pub summary_window: Duration,
    /// Messages older than this are dropped by the cleanup pass.
    pub max_age: Duration,
}

/// The three periodic jobs, generic over the infra seams.
pub struct DigestJobs<M, T, S> {
    store: SharedStore,
    summarizer: Summarizer<M>,
    transport: T,
    snapshot: S,
    settings: JobSettings,
}

impl<M, T, S> DigestJobs<M, T, S>
where
    M: SummaryModel,
    T: Transport,
    S: SnapshotStore,
{
    pub fn new(
        store: SharedStore,
        summarizer: Summarizer<M>,
        transport: T,
        snapshot: S,
        settings: JobSettings,
    ) -> Self {
        Self {
            store,
            summarizer,
            transport,
            snapshot,
            settings,
        }
    }

    /// Age-trim every conversation.
    pub async fn run_cleanup(&self) {
        let now = Utc::now();
        let dropped = self
            .store
            .write()
            .await
            .trim_all_by_age(now, self.settings.max_age);
        info!(dropped, "cleanup pass finished");
    }

    /// Summarize and publish the recent window for every conversation with
    /// auto-summaries enabled. A failing conversation is reported to that
    /// conversation and never aborts the others.
    pub async fn run_auto_summaries(&self) {
        let since = Utc::now() - self.settings.summary_window;

        // Select due conversations and mark them in flight under one lock.
        let due: Vec<(ConversationId, Vec<StoredMessage>)> = {
            let mut store = self.store.write().await;
            let mut due = Vec::new();
            for id in store.conversation_ids() {
                if !store.auto_summary_enabled(id) {
                    continue;
                }
                let window = store.recent_messages(id, since);
                if window.is_empty() {
                    continue;
                }
                if !store.begin_summary(id) {
                    debug!(%id, "summary already in flight, skipping");
                    continue;
                }
                due.push((id, window));
            }
            due
        };

        info!(due = due.len(), "auto-summary pass starting");

        for (id, window) in due {
            let result = self.summarizer.summarize(&window).await;
            self.store.write().await.finish_summary(id);

            match result {
                Ok(summary) => {
                    let hours = self.settings.summary_window.num_hours();
                    let text = format!(
                        "📝 *Resumen automático de las últimas {hours} horas:*\n\n{summary}"
                    );
                    if let Err(err) = self.transport.send_message(id, &text).await {
                        warn!(%id, %err, "failed to deliver auto-summary");
                    }
                }
                Err(err) => {
                    warn!(%id, %err, "auto-summary generation failed");
                    if let Err(send_err) = self.transport.send_message(id, AUTO_SUMMARY_FAILED).await
                    {
                        warn!(%id, %send_err, "failed to deliver failure notice");
                    }
                }
            }
        }
    }

    /// Flush the store to the snapshot file.
    pub async fn run_snapshot(&self) {
        let store = self.store.read().await;
        match self.snapshot.save(&store).await {
            Ok(()) => debug!("snapshot written"),
            Err(err) => warn!(%err, "snapshot save failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charla_types::error::{SnapshotError, SummaryError, TransportError};
    use crate::store::ConversationStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Fails whenever the user prompt mentions the poisoned topic.
    #[derive(Clone)]
    struct TopicModel {
        poison: &'static str,
    }

    impl SummaryModel for TopicModel {
        async fn complete(
            &self,
            _system: &str,
            user: &str,
            _max_tokens: u32,
        ) -> Result<String, SummaryError> {
            if user.contains(self.poison) {
                Err(SummaryError::Provider {
                    message: "upstream exploded".to_string(),
                })
            } else {
                Ok("• resumen de prueba".to_string())
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<(ConversationId, String)>>>,
    }

    impl Transport for RecordingTransport {
        async fn send_message(
            &self,
            conversation: ConversationId,
            text: &str,
        ) -> Result<(), TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((conversation, text.to_string()));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct CountingSnapshot {
        saves: Arc<AtomicUsize>,
    }

    impl SnapshotStore for CountingSnapshot {
        async fn save(&self, _store: &ConversationStore) -> Result<(), SnapshotError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn load(&self) -> Result<ConversationStore, SnapshotError> {
            Ok(ConversationStore::new())
        }
    }

    fn settings() -> JobSettings {
        JobSettings {
            summary_window: Duration::hours(6),
            max_age: Duration::hours(24),
        }
    }

    fn jobs_with(
        store: SharedStore,
        poison: &'static str,
    ) -> (
        DigestJobs<TopicModel, RecordingTransport, CountingSnapshot>,
        RecordingTransport,
        CountingSnapshot,
    ) {
        let transport = RecordingTransport::default();
        let snapshot = CountingSnapshot::default();
        let jobs = DigestJobs::new(
            store,
            Summarizer::new(TopicModel { poison }, 6, 800),
            transport.clone(),
            snapshot.clone(),
            settings(),
        );
        (jobs, transport, snapshot)
    }

    #[tokio::test]
    async fn test_auto_summary_sends_exactly_one_message_per_conversation() {
        let mut store = ConversationStore::new();
        let now = Utc::now();
        store.append(ConversationId(100), "Ana", "hola", now, 5000);
        store.append(ConversationId(100), "Beto", "qué tal", now, 5000);
        let (jobs, transport, _) = jobs_with(store.into_shared(), "<nunca>");

        jobs.run_auto_summaries().await;

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ConversationId(100));
        assert!(sent[0].1.contains("Resumen automático de las últimas 6 horas"));
        assert!(sent[0].1.contains("resumen de prueba"));
    }

    #[tokio::test]
    async fn test_failure_for_one_conversation_does_not_block_others() {
        let mut store = ConversationStore::new();
        let now = Utc::now();
        store.append(ConversationId(1), "Ana", "tema envenenado", now, 5000);
        store.append(ConversationId(2), "Beto", "tema normal", now, 5000);
        let (jobs, transport, _) = jobs_with(store.into_shared(), "envenenado");

        jobs.run_auto_summaries().await;

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let for_one: Vec<_> = sent.iter().filter(|(id, _)| *id == ConversationId(1)).collect();
        let for_two: Vec<_> = sent.iter().filter(|(id, _)| *id == ConversationId(2)).collect();
        // Conversation 1 gets the failure notice, conversation 2 its summary
        assert_eq!(for_one.len(), 1);
        assert!(for_one[0].1.contains("No se pudo generar"));
        assert_eq!(for_two.len(), 1);
        assert!(for_two[0].1.contains("resumen de prueba"));
    }

    #[tokio::test]
    async fn test_disabled_and_empty_conversations_are_skipped() {
        let mut store = ConversationStore::new();
        let now = Utc::now();
        // Disabled
        store.append(ConversationId(1), "Ana", "hola", now, 5000);
        store.set_auto_summary(ConversationId(1), false);
        // Only stale messages (outside the 6h window)
        store.append(ConversationId(2), "Beto", "viejo", now - Duration::hours(7), 5000);
        // Exists but empty
        store.set_auto_summary(ConversationId(3), true);
        let (jobs, transport, _) = jobs_with(store.into_shared(), "<nunca>");

        jobs.run_auto_summaries().await;

        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_conversation_is_skipped() {
        let mut store = ConversationStore::new();
        let now = Utc::now();
        store.append(ConversationId(1), "Ana", "hola", now, 5000);
        assert!(store.begin_summary(ConversationId(1)));
        let (jobs, transport, _) = jobs_with(store.into_shared(), "<nunca>");

        jobs.run_auto_summaries().await;

        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_flag_cleared_after_pass() {
        let mut store = ConversationStore::new();
        store.append(ConversationId(1), "Ana", "hola", Utc::now(), 5000);
        let shared = store.into_shared();
        let (jobs, _, _) = jobs_with(shared.clone(), "<nunca>");

        jobs.run_auto_summaries().await;

        assert!(shared.write().await.begin_summary(ConversationId(1)));
    }

    #[tokio::test]
    async fn test_cleanup_drops_old_messages_everywhere() {
        let mut store = ConversationStore::new();
        let now = Utc::now();
        store.append(ConversationId(1), "Ana", "viejo", now - Duration::hours(30), 5000);
        store.append(ConversationId(1), "Ana", "nuevo", now, 5000);
        store.append(ConversationId(2), "Beto", "viejo", now - Duration::hours(25), 5000);
        let shared = store.into_shared();
        let (jobs, _, _) = jobs_with(shared.clone(), "<nunca>");

        jobs.run_cleanup().await;

        let store = shared.read().await;
        assert_eq!(store.get(ConversationId(1)).unwrap().messages.len(), 1);
        assert!(store.get(ConversationId(2)).unwrap().messages.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_tick_saves_store() {
        let (jobs, _, snapshot) = jobs_with(ConversationStore::new().into_shared(), "<nunca>");
        jobs.run_snapshot().await;
        jobs.run_snapshot().await;
        assert_eq!(snapshot.saves.load(Ordering::SeqCst), 2);
    }
}
