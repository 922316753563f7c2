//! Client core for the AI cold email service: data model, form validation,
//! the HTTP contract and the view controllers. Platform-neutral; the web
//! front-end supplies the transport.

pub mod api;
pub mod config;
pub mod display;
pub mod errors;
pub mod form;
pub mod in_memory;
pub mod models;
pub mod notice;
pub mod route;
pub mod scope;
pub mod state;

pub use api::{Attachment, EmailService, Endpoints, FollowUpRequest, FormPart, GenerationRequest};
pub use config::ClientConfig;
pub use errors::AppError;
pub use form::EmailDraft;
pub use models::{Conversation, ConversationId, HistoryEntry, Purpose};
pub use notice::{Notice, NoticeKind};
pub use route::Route;

/// Installs a `tracing` subscriber for tests; honours `RUST_LOG`.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cold_mailer=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
