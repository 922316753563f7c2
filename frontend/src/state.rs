use std::sync::Arc;

use cold_mailer::state::{
    ComposeController, ConversationController, FollowUpMode, GenerationStatus, HistoryState,
    HistoryStore, Listener,
};
use cold_mailer::{ClientConfig, ConversationId, EmailDraft, Notice, Route};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::api::HttpEmailService;

pub type Service = HttpEmailService;

/// Wires a controller's change callback to a reactive trigger.
pub fn listener(trigger: &ArcTrigger) -> Listener {
    let trigger = trigger.clone();
    Arc::new(move || trigger.notify())
}

/// Shared application state, provided via Leptos context.
///
/// The controllers own the real state; the memos re-read a snapshot each time
/// a controller reports a change.
#[derive(Clone, Copy)]
pub struct AppState {
    service: StoredValue<Arc<Service>>,
    history_store: StoredValue<Arc<HistoryStore<Service>>>,
    compose: StoredValue<Arc<ComposeController<Service>>>,

    pub history: Memo<HistoryState>,
    pub generation: Memo<GenerationStatus>,
    pub draft: RwSignal<EmailDraft>,
    pub route: RwSignal<Route>,
    pub notice: RwSignal<Option<Notice>>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide(config: &ClientConfig) -> Self {
        let service = Arc::new(HttpEmailService::new(config));

        let history_changed = ArcTrigger::new();
        let history_store = Arc::new(HistoryStore::new(service.clone(), listener(&history_changed)));
        let compose_changed = ArcTrigger::new();
        let compose = Arc::new(ComposeController::new(
            service.clone(),
            history_store.clone(),
            listener(&compose_changed),
        ));

        let history = {
            let store = history_store.clone();
            Memo::new(move |_| {
                history_changed.track();
                store.snapshot()
            })
        };
        let generation = {
            let compose = compose.clone();
            Memo::new(move |_| {
                compose_changed.track();
                compose.status()
            })
        };

        let initial_route = window()
            .location()
            .pathname()
            .map(|path| Route::from_path(&path))
            .unwrap_or_default();

        let state = Self {
            service: StoredValue::new(service),
            history_store: StoredValue::new(history_store),
            compose: StoredValue::new(compose),
            history,
            generation,
            draft: RwSignal::new(EmailDraft::default()),
            route: RwSignal::new(initial_route),
            notice: RwSignal::new(None),
        };

        // Follow browser back/forward
        let _ = window_event_listener(leptos::ev::popstate, move |_| {
            if let Ok(path) = window().location().pathname() {
                state.route.set(Route::from_path(&path));
            }
        });

        provide_context(state);
        state
    }

    /// Builds a controller for one conversation view.
    pub fn conversation_controller(&self, changed: &ArcTrigger) -> Arc<ConversationController<Service>> {
        Arc::new(ConversationController::new(
            self.service.get_value(),
            self.history_store.get_value(),
            FollowUpMode::Replace,
            listener(changed),
        ))
    }

    /// Load the history list from the backend.
    pub fn load_history(&self) {
        let store = self.history_store.get_value();
        spawn_local(async move {
            store.refresh().await;
        });
    }

    pub fn navigate(&self, route: Route) {
        if self.route.get_untracked() == route {
            return;
        }
        if let Ok(history) = window().history() {
            if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(&route.path())) {
                log::warn!("Failed to push history entry: {e:?}");
            }
        }
        self.route.set(route);
    }

    pub fn open_conversation(&self, id: ConversationId) {
        self.navigate(Route::Conversation(id));
    }

    /// Shows a transient notice; a newer notice replaces it.
    pub fn notify(&self, notice: Notice) {
        let notices = self.notice;
        notices.set(Some(notice.clone()));
        spawn_local(async move {
            TimeoutFuture::new(Notice::DISPLAY_MS).await;
            notices.update(|current| {
                if current.as_ref() == Some(&notice) {
                    *current = None;
                }
            });
        });
    }

    /// Submit the current draft. Validation failures become notices.
    pub fn submit(&self) {
        let state = *self;
        let compose = self.compose.get_value();
        let draft = self.draft.get_untracked();
        spawn_local(async move {
            if let Err(e) = compose.submit(&draft).await {
                if e.is_validation() {
                    state.notify(Notice::error(e.to_string()));
                }
            }
        });
    }

    /// Full reset of the compose view: output, status, error and form.
    pub fn start_new(&self) {
        if self.compose.with_value(|c| c.start_new()) {
            self.draft.set(EmailDraft::default());
        }
        self.navigate(Route::Compose);
    }

    pub fn request_history_delete(&self, id: ConversationId) {
        self.history_store.with_value(|s| s.request_delete(id));
    }

    pub fn cancel_history_delete(&self) {
        self.history_store.with_value(|s| s.cancel_delete());
    }

    pub fn confirm_history_delete(&self) {
        let state = *self;
        let store = self.history_store.get_value();
        spawn_local(async move {
            if let Some(outcome) = store.confirm_delete().await {
                state.notify(outcome.notice().clone());
            }
        });
    }

    pub fn copy_to_clipboard(&self, text: String) {
        let state = *self;
        spawn_local(async move {
            let promise = window().navigator().clipboard().write_text(&text);
            match JsFuture::from(promise).await {
                Ok(_) => state.notify(Notice::success("Email copied to clipboard!")),
                Err(e) => log::error!("Clipboard write failed: {e:?}"),
            }
        });
    }
}
