//! Snapshot persistence seam.
//!
//! The store is flushed to a single local file on a timer (and optionally at
//! shutdown) and restored from it at startup. The concrete JSON adapter
//! lives in `charla-infra`.

use charla_types::error::SnapshotError;

use crate::store::ConversationStore;

/// Durable snapshot of the whole conversation store.
///
/// `load` never fails the whole startup for recoverable problems: a missing
/// file yields an empty store, and implementations degrade per-entry where
/// they can (see the adapter for the exact fallback rules).
pub trait SnapshotStore: Send + Sync {
    /// Serialize the entire store. Last successful write wins.
    fn save(
        &self,
        store: &ConversationStore,
    ) -> impl std::future::Future<Output = Result<(), SnapshotError>> + Send;

    /// Restore the store. A missing snapshot file is an empty store, not an
    /// error.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<ConversationStore, SnapshotError>> + Send;
}
