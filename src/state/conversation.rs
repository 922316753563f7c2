use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::history::HistoryStore;
use super::{DeleteOutcome, DeletePhase, Listener, lock};
use crate::api::{EmailService, FollowUpRequest};
use crate::errors::AppError;
use crate::models::{Conversation, ConversationId};
use crate::scope::RequestScope;

/// How a follow-up reply is folded into the shown conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FollowUpMode {
    /// The reply overwrites the email body; the prompt joins the message list.
    #[default]
    Replace,
    /// The body is kept; the reply is shown as a separate latest response.
    Append,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DetailStatus {
    #[default]
    Loading,
    Ready,
    Sending,
    LoadFailed { message: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailState {
    pub status: DetailStatus,
    pub conversation: Option<Conversation>,
    pub latest_reply: Option<String>,
    pub follow_up_error: Option<String>,
    pub delete: DeletePhase,
}

impl DetailState {
    /// Text put on the clipboard by "Copy Email".
    pub fn copy_text(&self) -> Option<&str> {
        self.latest_reply
            .as_deref()
            .or_else(|| self.conversation.as_ref().map(|c| c.generated_email.as_str()))
    }

    pub fn is_sending(&self) -> bool {
        self.status == DetailStatus::Sending
    }
}

/// Loads one conversation, sends follow-ups and deletes it.
///
/// Requests run inside a [`RequestScope`]; after [`close`](Self::close) no
/// response is applied.
pub struct ConversationController<S> {
    service: Arc<S>,
    history: Arc<HistoryStore<S>>,
    mode: FollowUpMode,
    scope: RequestScope,
    state: Mutex<DetailState>,
    listener: Listener,
}

impl<S: EmailService> ConversationController<S> {
    pub fn new(
        service: Arc<S>,
        history: Arc<HistoryStore<S>>,
        mode: FollowUpMode,
        listener: Listener,
    ) -> Self {
        Self {
            service,
            history,
            mode,
            scope: RequestScope::new(),
            state: Mutex::new(DetailState::default()),
            listener,
        }
    }

    pub fn snapshot(&self) -> DetailState {
        lock(&self.state).clone()
    }

    pub fn mode(&self) -> FollowUpMode {
        self.mode
    }

    /// Fetches `id` and replaces whatever was shown. A response for a
    /// superseded load is dropped.
    pub async fn load(&self, id: &ConversationId) {
        let ticket = self.scope.begin();
        *lock(&self.state) = DetailState::default();
        (self.listener)();

        let result = self.scope.run(self.service.fetch_conversation(id)).await;
        if !self.scope.is_current(ticket) {
            debug!(conversation = %id, "dropping stale conversation response");
            return;
        }

        {
            let mut state = lock(&self.state);
            match result {
                Ok(conversation) => {
                    state.status = DetailStatus::Ready;
                    state.conversation = Some(conversation);
                }
                Err(AppError::Cancelled) => return,
                Err(e) => {
                    warn!(conversation = %id, "load failed: {e}");
                    let message = if e.is_transport() {
                        "Error loading conversation"
                    } else {
                        "Failed to load conversation"
                    };
                    state.status = DetailStatus::LoadFailed { message: message.to_string() };
                }
            }
        }
        (self.listener)();
    }

    /// Sends a follow-up instruction for the loaded conversation.
    ///
    /// Blank messages are rejected without a request. Only valid from `Ready`;
    /// other states ignore the call. A reply arriving after a newer `load`
    /// began is dropped with `Cancelled`.
    pub async fn send_follow_up(&self, message: &str) -> Result<(), AppError> {
        if message.trim().is_empty() {
            return Err(AppError::empty_field("Follow-up message"));
        }
        let (id, ticket) = {
            let mut state = lock(&self.state);
            let Some(conversation) = state.conversation.as_ref() else {
                return Ok(());
            };
            if state.status != DetailStatus::Ready {
                return Ok(());
            }
            let id = conversation.id.clone();
            state.status = DetailStatus::Sending;
            state.follow_up_error = None;
            (id, self.scope.current())
        };
        (self.listener)();

        let request = FollowUpRequest { conversation_id: id.clone(), user_message: message.to_string() };
        let result = self.scope.run(self.service.continue_conversation(&request)).await;
        if !self.scope.is_current(ticket) {
            debug!(conversation = %id, "dropping follow-up reply after reload");
            return Err(AppError::Cancelled);
        }

        let outcome = {
            let mut state = lock(&self.state);
            state.status = DetailStatus::Ready;
            match result {
                Ok(reply) => {
                    match self.mode {
                        FollowUpMode::Replace => {
                            if let Some(conversation) = state.conversation.as_mut() {
                                conversation.generated_email = reply.response;
                                conversation.follow_up_messages.push(message.to_string());
                            }
                        }
                        FollowUpMode::Append => state.latest_reply = Some(reply.response),
                    }
                    Ok(())
                }
                Err(e) => {
                    warn!(conversation = %id, "follow-up failed: {e}");
                    state.follow_up_error = Some(if e.is_transport() {
                        "Error sending message".to_string()
                    } else {
                        e.user_message("Failed to send message")
                    });
                    Err(e)
                }
            }
        };
        (self.listener)();
        outcome
    }

    /// Opens the delete confirmation for the loaded conversation.
    pub fn request_delete(&self) -> bool {
        {
            let mut state = lock(&self.state);
            let Some(id) = state.conversation.as_ref().map(|c| c.id.clone()) else {
                return false;
            };
            if state.delete.is_deleting() {
                return false;
            }
            state.delete = DeletePhase::Confirming(id);
        }
        (self.listener)();
        true
    }

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

    /// Deletes the conversation after confirmation. On success the history is
    /// re-fetched and the caller should navigate away.
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

        // Not scoped: the mutation is already on its way once sent.
        let result = self.service.delete_conversation(&id).await;
        match &result {
            Ok(()) => {
                self.history.refresh().await;
            }
            Err(e) => warn!(conversation = %id, "delete failed: {e}"),
        }

        lock(&self.state).delete = DeletePhase::Idle;
        (self.listener)();
        Some(DeleteOutcome::from_result(&result))
    }

    /// Tears the view down: pending requests are aborted, late replies ignored.
    pub fn close(&self) {
        self.scope.close();
    }

    pub fn is_closed(&self) -> bool {
        self.scope.is_closed()
    }
}
