use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn};

use super::{DeleteOutcome, DeletePhase, Listener, lock};
use crate::api::EmailService;
use crate::models::{ConversationId, HistoryEntry};

/// Snapshot of the history list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryState {
    pub entries: Vec<HistoryEntry>,
    pub delete: DeletePhase,
    pub loaded: bool,
}

impl HistoryState {
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }
}

/// Owns the list of past conversations.
///
/// The list is only ever replaced wholesale by a server fetch, on mount and
/// after every create or delete. Constructed explicitly and shared by `Arc`.
pub struct HistoryStore<S> {
    service: Arc<S>,
    state: Mutex<HistoryState>,
    listener: Listener,
}

impl<S: EmailService> HistoryStore<S> {
    pub fn new(service: Arc<S>, listener: Listener) -> Self {
        Self { service, state: Mutex::new(HistoryState::default()), listener }
    }

    pub fn snapshot(&self) -> HistoryState {
        lock(&self.state).clone()
    }

    /// Replaces the list with the server's. Failures are logged and the
    /// previous list is kept.
    pub async fn refresh(&self) -> bool {
        match self.service.list_history().await {
            Ok(entries) => {
                debug!(count = entries.len(), "history refreshed");
                {
                    let mut state = lock(&self.state);
                    state.entries = entries;
                    state.loaded = true;
                }
                (self.listener)();
                true
            }
            Err(e) => {
                error!("History fetch error: {e}");
                false
            }
        }
    }

    /// Asks for confirmation to delete `id`, replacing any earlier pending id.
    /// Refused while a delete is in flight.
    pub fn request_delete(&self, id: ConversationId) -> bool {
        {
            let mut state = lock(&self.state);
            if state.delete.is_deleting() {
                return false;
            }
            state.delete = DeletePhase::Confirming(id);
        }
        (self.listener)();
        true
    }

    /// Dismisses the confirmation. Refused while a delete is in flight.
    pub fn cancel_delete(&self) -> bool {
        {
            let mut state = lock(&self.state);
            if !state.delete.is_confirming() {
                return false;
            }
            state.delete = DeletePhase::Idle;
        }
        (self.listener)();
        true
    }

    /// Deletes the pending id. On success the list is re-fetched; either way
    /// both markers are cleared afterwards. `None` when nothing was pending.
    pub async fn confirm_delete(&self) -> Option<DeleteOutcome> {
        let id = {
            let mut state = lock(&self.state);
            let DeletePhase::Confirming(id) = &state.delete else {
                return None;
            };
            let id = id.clone();
            state.delete = DeletePhase::Deleting(id.clone());
            id
        };
        (self.listener)();

        let result = self.service.delete_conversation(&id).await;
        match &result {
            Ok(()) => {
                self.refresh().await;
            }
            Err(e) => warn!(conversation = %id, "delete failed: {e}"),
        }

        lock(&self.state).delete = DeletePhase::Idle;
        (self.listener)();
        Some(DeleteOutcome::from_result(&result))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Weak;

    use super::*;
    use crate::errors::AppError;
    use crate::in_memory::{InMemoryEmailService, Operation, sample_conversation};
    use crate::models::Purpose;
    use crate::state::silent;

    fn seeded() -> Arc<InMemoryEmailService> {
        let service = InMemoryEmailService::new();
        service.insert(sample_conversation("a", Purpose::JobApplication));
        service.insert(sample_conversation("b", Purpose::Sales));
        Arc::new(service)
    }

    /// A store whose listener records every delete phase it observes.
    #[allow(clippy::type_complexity)]
    fn recording(
        service: Arc<InMemoryEmailService>,
    ) -> (Arc<HistoryStore<InMemoryEmailService>>, Arc<Mutex<Vec<DeletePhase>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new_cyclic(|weak: &Weak<HistoryStore<InMemoryEmailService>>| {
            let weak = weak.clone();
            let seen = seen.clone();
            let listener: Listener = Arc::new(move || {
                if let Some(store) = weak.upgrade() {
                    seen.lock().unwrap().push(store.snapshot().delete);
                }
            });
            HistoryStore::new(service, listener)
        });
        (store, seen)
    }

    #[tokio::test]
    async fn refresh_replaces_whole_list() {
        let service = seeded();
        let store = HistoryStore::new(service.clone(), silent());
        assert!(store.refresh().await);
        assert_eq!(store.snapshot().entries.len(), 2);
        assert!(store.snapshot().loaded);

        service.insert(sample_conversation("c", Purpose::Networking));
        store.refresh().await;
        let ids: Vec<_> = store.snapshot().entries.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        crate::init_test_tracing();
        let service = seeded();
        let store = HistoryStore::new(service.clone(), silent());
        store.refresh().await;

        service.fail_next(Operation::ListHistory, AppError::network("offline"));
        assert!(!store.refresh().await);
        assert_eq!(store.snapshot().entries.len(), 2);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_entry() {
        let service = seeded();
        let (store, seen) = recording(service.clone());
        store.refresh().await;

        assert!(store.request_delete("a".into()));
        assert_eq!(store.snapshot().delete.pending_id(), Some(&"a".into()));

        let outcome = store.confirm_delete().await.unwrap();
        assert!(outcome.is_deleted());
        assert_eq!(outcome.notice().message, "Conversation deleted.");

        let state = store.snapshot();
        assert_eq!(state.delete, DeletePhase::Idle);
        assert!(!state.contains(&"a".into()));
        assert!(state.contains(&"b".into()));
        assert!(seen.lock().unwrap().contains(&DeletePhase::Deleting("a".into())));
        assert_eq!(service.calls(Operation::ListHistory), 2);
    }

    #[tokio::test]
    async fn failed_delete_keeps_entry() {
        let service = seeded();
        let (store, seen) = recording(service.clone());
        store.refresh().await;

        service.fail_next(
            Operation::DeleteConversation,
            AppError::Server { status: 500, detail: None },
        );
        store.request_delete("b".into());
        let outcome = store.confirm_delete().await.unwrap();

        assert!(!outcome.is_deleted());
        assert!(outcome.notice().is_error());
        assert_eq!(outcome.notice().message, "Failed to delete conversation.");
        let state = store.snapshot();
        assert_eq!(state.delete, DeletePhase::Idle);
        assert!(state.contains(&"b".into()));
        assert!(seen.lock().unwrap().contains(&DeletePhase::Deleting("b".into())));
        // no re-fetch after a failed delete
        assert_eq!(service.calls(Operation::ListHistory), 1);
    }

    #[tokio::test]
    async fn transport_failure_has_its_own_notice() {
        let service = seeded();
        let store = HistoryStore::new(service.clone(), silent());
        service.fail_next(Operation::DeleteConversation, AppError::network("offline"));
        store.request_delete("a".into());
        let outcome = store.confirm_delete().await.unwrap();
        assert_eq!(outcome.notice().message, "Error deleting conversation.");
    }

    #[tokio::test]
    async fn second_request_replaces_pending_id() {
        let service = seeded();
        let (store, seen) = recording(service.clone());
        store.refresh().await;

        store.request_delete("a".into());
        store.request_delete("b".into());
        assert_eq!(store.snapshot().delete, DeletePhase::Confirming("b".into()));

        store.confirm_delete().await;
        let deleting: Vec<_> = seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.deleting_id().cloned())
            .collect();
        assert!(deleting.iter().all(|id| id.as_str() == "b"));
        assert!(store.snapshot().contains(&"a".into()));
        assert!(!store.snapshot().contains(&"b".into()));
    }

    #[tokio::test]
    async fn confirm_without_pending_is_noop() {
        let service = seeded();
        let store = HistoryStore::new(service.clone(), silent());
        assert!(store.confirm_delete().await.is_none());
        assert_eq!(service.calls(Operation::DeleteConversation), 0);
    }

    #[test]
    fn cancel_clears_confirmation() {
        let store = HistoryStore::new(seeded(), silent());
        assert!(!store.cancel_delete());
        store.request_delete("a".into());
        assert!(store.cancel_delete());
        assert_eq!(store.snapshot().delete, DeletePhase::Idle);
    }
}
