//! View controllers. Each owns its state behind a lock, talks to an injected
//! [`EmailService`](crate::api::EmailService), and calls its listener after
//! every transition so a UI can re-render from a fresh snapshot.

pub mod compose;
pub mod conversation;
pub mod history;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::ConversationId;
use crate::notice::Notice;

pub use compose::{ComposeController, GenerationStatus};
pub use conversation::{ConversationController, DetailState, DetailStatus, FollowUpMode};
pub use history::{HistoryState, HistoryStore};

/// Change callback invoked after a controller's state moved.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

pub fn silent() -> Listener {
    Arc::new(|| {})
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Confirm → delete lifecycle shared by the history list and the detail view.
/// Confirmation and the in-flight delete are successive phases of one record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DeletePhase {
    #[default]
    Idle,
    Confirming(ConversationId),
    Deleting(ConversationId),
}

impl DeletePhase {
    /// The id awaiting or undergoing deletion.
    pub fn pending_id(&self) -> Option<&ConversationId> {
        match self {
            DeletePhase::Confirming(id) | DeletePhase::Deleting(id) => Some(id),
            DeletePhase::Idle => None,
        }
    }

    pub fn deleting_id(&self) -> Option<&ConversationId> {
        match self {
            DeletePhase::Deleting(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self, DeletePhase::Deleting(_))
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self, DeletePhase::Confirming(_))
    }
}

/// Result of a confirmed delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Notice),
    Failed(Notice),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }

    pub fn notice(&self) -> &Notice {
        match self {
            DeleteOutcome::Deleted(n) | DeleteOutcome::Failed(n) => n,
        }
    }

    pub(crate) fn from_result(result: &Result<(), crate::errors::AppError>) -> Self {
        match result {
            Ok(()) => DeleteOutcome::Deleted(Notice::success("Conversation deleted.")),
            Err(e) if e.is_transport() => {
                DeleteOutcome::Failed(Notice::error("Error deleting conversation."))
            }
            Err(_) => DeleteOutcome::Failed(Notice::error("Failed to delete conversation.")),
        }
    }
}
