use std::sync::{Arc, Mutex};

use tracing::{debug, error};

use super::history::HistoryStore;
use super::{Listener, lock};
use crate::api::EmailService;
use crate::errors::AppError;
use crate::form::EmailDraft;

const GENERATE_FALLBACK: &str = "Failed to generate email from server.";

/// Generation flow: `Idle → Submitting → Success | Failed`, back to `Idle`
/// only through [`ComposeController::start_new`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Submitting,
    Success { email: String },
    Failed { message: String },
}

impl GenerationStatus {
    pub fn status_text(&self) -> &'static str {
        match self {
            GenerationStatus::Submitting => "Generating email...",
            GenerationStatus::Success { .. } => "Email generated successfully!",
            GenerationStatus::Idle | GenerationStatus::Failed { .. } => "",
        }
    }

    pub fn generated_email(&self) -> Option<&str> {
        match self {
            GenerationStatus::Success { email } => Some(email),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenerationStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, GenerationStatus::Submitting)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GenerationStatus::Success { .. } | GenerationStatus::Failed { .. })
    }
}

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Network { message } => format!("Error: {message}"),
        other => format!("Error: {}", other.user_message(GENERATE_FALLBACK)),
    }
}

/// Submits drafts and exposes the generated email. A successful generation
/// triggers exactly one history refresh.
pub struct ComposeController<S> {
    service: Arc<S>,
    history: Arc<HistoryStore<S>>,
    status: Mutex<GenerationStatus>,
    listener: Listener,
}

impl<S: EmailService> ComposeController<S> {
    pub fn new(service: Arc<S>, history: Arc<HistoryStore<S>>, listener: Listener) -> Self {
        Self { service, history, status: Mutex::new(GenerationStatus::Idle), listener }
    }

    pub fn status(&self) -> GenerationStatus {
        lock(&self.status).clone()
    }

    /// Validates and submits `draft`.
    ///
    /// Validation errors are returned before any request is made and leave the
    /// status untouched. A submission while one is already in flight is ignored.
    /// Server and transport failures move the status to `Failed` and are also
    /// returned.
    pub async fn submit(&self, draft: &EmailDraft) -> Result<(), AppError> {
        let request = draft.to_request()?;
        {
            let mut status = lock(&self.status);
            if status.is_submitting() {
                debug!("generation already in flight, ignoring submit");
                return Ok(());
            }
            *status = GenerationStatus::Submitting;
        }
        (self.listener)();

        match self.service.generate_email(&request).await {
            Ok(generated) => {
                *lock(&self.status) = GenerationStatus::Success { email: generated.email };
                (self.listener)();
                self.history.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!("Fetch error: {e}");
                *lock(&self.status) = GenerationStatus::Failed { message: failure_message(&e) };
                (self.listener)();
                Err(e)
            }
        }
    }

    /// Clears generated text, status and error together. Ignored mid-flight.
    pub fn start_new(&self) -> bool {
        {
            let mut status = lock(&self.status);
            if status.is_submitting() {
                return false;
            }
            *status = GenerationStatus::Idle;
        }
        (self.listener)();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::{InMemoryEmailService, Operation};
    use crate::models::Purpose;
    use crate::state::silent;

    fn controller() -> (Arc<InMemoryEmailService>, ComposeController<InMemoryEmailService>) {
        let service = Arc::new(InMemoryEmailService::new());
        let history = Arc::new(HistoryStore::new(service.clone(), silent()));
        let compose = ComposeController::new(service.clone(), history, silent());
        (service, compose)
    }

    fn networking_draft() -> EmailDraft {
        EmailDraft {
            purpose: Purpose::Networking,
            person_info: "Works at Acme".into(),
            sender_name: "Al".into(),
            sender_title: "Eng".into(),
            sender_company_name: "Acme".into(),
            call_to_action: "Chat?".into(),
            ..EmailDraft::default()
        }
    }

    #[tokio::test]
    async fn invalid_drafts_never_reach_the_server() {
        let (service, compose) = controller();
        for purpose in Purpose::ALL {
            let draft = EmailDraft { purpose, ..EmailDraft::default() };
            let err = compose.submit(&draft).await.unwrap_err();
            assert!(err.is_validation());
        }

        let mut both = networking_draft();
        both.purpose = Purpose::JobApplication;
        both.resume = Some(crate::api::Attachment::new("cv.docx", vec![1, 2]));
        both.job_desc_text = "Rust engineer".into();
        both.job_desc_url = "https://jobs.example.com/1".into();
        assert_eq!(compose.submit(&both).await.unwrap_err(), AppError::ConflictingJobDescription);

        assert_eq!(service.calls(Operation::GenerateEmail), 0);
        assert_eq!(compose.status(), GenerationStatus::Idle);
    }

    #[tokio::test]
    async fn networking_submission_generates_and_refreshes_once() {
        let (service, compose) = controller();
        service.reply_with_email("Hi...");

        compose.submit(&networking_draft()).await.unwrap();

        let request = service.last_generation_request().unwrap();
        assert_eq!(request.field("purpose"), Some("Networking / Relationship Building"));
        assert_eq!(request.field("person_info"), Some("Works at Acme"));
        assert_eq!(request.field("sender_name"), Some("Al"));
        assert_eq!(request.field("sender_title"), Some("Eng"));
        assert_eq!(request.field("sender_company_name"), Some("Acme"));
        assert_eq!(request.field("call_to_action"), Some("Chat?"));

        let status = compose.status();
        assert_eq!(status.generated_email(), Some("Hi..."));
        assert_eq!(status.status_text(), "Email generated successfully!");
        assert_eq!(service.calls(Operation::ListHistory), 1);
    }

    #[tokio::test]
    async fn history_grows_by_the_new_conversation() {
        let service = Arc::new(InMemoryEmailService::new());
        let history = Arc::new(HistoryStore::new(service.clone(), silent()));
        let compose = ComposeController::new(service.clone(), history.clone(), silent());
        history.refresh().await;
        assert!(history.snapshot().entries.is_empty());

        compose.submit(&networking_draft()).await.unwrap();
        let entries = history.snapshot().entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].purpose, Purpose::Networking);
    }

    #[tokio::test]
    async fn server_detail_becomes_error_message() {
        let (service, compose) = controller();
        service.fail_next(
            Operation::GenerateEmail,
            AppError::Server { status: 400, detail: Some("Could not fetch job URL".into()) },
        );

        assert!(compose.submit(&networking_draft()).await.is_err());
        assert_eq!(compose.status().error(), Some("Error: Could not fetch job URL"));
        assert_eq!(service.calls(Operation::ListHistory), 0);
    }

    #[tokio::test]
    async fn missing_detail_falls_back_to_generic_message() {
        let (service, compose) = controller();
        service.fail_next(Operation::GenerateEmail, AppError::Server { status: 502, detail: None });
        let _ = compose.submit(&networking_draft()).await;
        assert_eq!(
            compose.status().error(),
            Some("Error: Failed to generate email from server.")
        );
    }

    #[tokio::test]
    async fn start_new_clears_everything() {
        let (_service, compose) = controller();
        compose.submit(&networking_draft()).await.unwrap();
        assert!(compose.status().is_finished());

        assert!(compose.start_new());
        let status = compose.status();
        assert_eq!(status, GenerationStatus::Idle);
        assert_eq!(status.generated_email(), None);
        assert_eq!(status.error(), None);
        assert_eq!(status.status_text(), "");
    }
}
