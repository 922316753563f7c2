use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::api::{EmailService, FollowUpRequest, GenerationRequest};
use crate::errors::AppError;
use crate::models::{
    Conversation, ConversationId, FollowUpReply, GeneratedEmail, HistoryEntry, Purpose,
};
use crate::state::lock;

/// The calls an [`EmailService`] can receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    ListHistory,
    GenerateEmail,
    FetchConversation,
    ContinueConversation,
    DeleteConversation,
}

#[derive(Default)]
struct Inner {
    /// Newest first, the order `GET /history/` returns.
    conversations: Vec<Conversation>,
    calls: HashMap<Operation, usize>,
    failures: HashMap<Operation, AppError>,
    next_email: Option<String>,
    next_follow_up: Option<String>,
    generation_requests: Vec<GenerationRequest>,
    follow_up_requests: Vec<FollowUpRequest>,
}

impl Inner {
    /// Counts the call and hands back an injected failure, if any.
    fn enter(&mut self, op: Operation) -> Result<(), AppError> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_mut(&mut self, id: &ConversationId) -> Result<&mut Conversation, AppError> {
        self.conversations
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::Server { status: 404, detail: Some("Conversation not found".to_string()) }
}

/// In-memory email service.
/// Useful for testing and for running the UI without a backend.
#[derive(Default)]
pub struct InMemoryEmailService {
    inner: Mutex<Inner>,
}

impl InMemoryEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a conversation as the newest one.
    pub fn insert(&self, conversation: Conversation) {
        lock(&self.inner).conversations.insert(0, conversation);
    }

    /// Makes the next call to `op` fail with `err`.
    pub fn fail_next(&self, op: Operation, err: AppError) {
        lock(&self.inner).failures.insert(op, err);
    }

    /// Body returned by the next generation instead of the built-in template.
    pub fn reply_with_email(&self, email: impl Into<String>) {
        lock(&self.inner).next_email = Some(email.into());
    }

    /// Reply returned by the next follow-up instead of the built-in template.
    pub fn reply_with_follow_up(&self, response: impl Into<String>) {
        lock(&self.inner).next_follow_up = Some(response.into());
    }

    pub fn calls(&self, op: Operation) -> usize {
        lock(&self.inner).calls.get(&op).copied().unwrap_or(0)
    }

    pub fn last_generation_request(&self) -> Option<GenerationRequest> {
        lock(&self.inner).generation_requests.last().cloned()
    }

    pub fn last_follow_up_request(&self) -> Option<FollowUpRequest> {
        lock(&self.inner).follow_up_requests.last().cloned()
    }
}

fn draft_email(request: &GenerationRequest) -> String {
    let recipient = request.field("recipient_name").unwrap_or("there");
    let sender = request.field("sender_name").unwrap_or_default();
    let cta = request.field("call_to_action").unwrap_or_default();
    format!("Hi {recipient},\n\n{cta}\n\nBest,\n{sender}")
}

impl EmailService for InMemoryEmailService {
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, AppError> {
        let mut inner = lock(&self.inner);
        inner.enter(Operation::ListHistory)?;
        Ok(inner.conversations.iter().map(Conversation::summary).collect())
    }

    async fn generate_email(&self, request: &GenerationRequest) -> Result<GeneratedEmail, AppError> {
        let mut inner = lock(&self.inner);
        inner.enter(Operation::GenerateEmail)?;
        inner.generation_requests.push(request.clone());

        let purpose = Purpose::try_from(request.field("purpose").unwrap_or_default()).map_err(|e| {
            AppError::Server { status: 422, detail: Some(e) }
        })?;
        let email = inner.next_email.take().unwrap_or_else(|| draft_email(request));
        let field = |name: &str| request.field(name).unwrap_or_default().to_string();
        let conversation = Conversation {
            id: ConversationId::new(Uuid::new_v4().to_string()),
            purpose,
            sender_name: field("sender_name"),
            sender_title: field("sender_title"),
            sender_company_name: field("sender_company_name"),
            recipient_name: request.field("recipient_name").map(str::to_string),
            call_to_action: field("call_to_action"),
            generated_email: email.clone(),
            follow_up_messages: Vec::new(),
            created_at: Utc::now(),
        };
        inner.conversations.insert(0, conversation);
        Ok(GeneratedEmail { email })
    }

    async fn fetch_conversation(&self, id: &ConversationId) -> Result<Conversation, AppError> {
        let mut inner = lock(&self.inner);
        inner.enter(Operation::FetchConversation)?;
        inner.find_mut(id).cloned()
    }

    async fn continue_conversation(&self, request: &FollowUpRequest) -> Result<FollowUpReply, AppError> {
        let mut inner = lock(&self.inner);
        inner.enter(Operation::ContinueConversation)?;
        inner.follow_up_requests.push(request.clone());

        let next = inner.next_follow_up.take();
        let conversation = inner.find_mut(&request.conversation_id)?;
        let response = next.unwrap_or_else(|| {
            format!("{}\n\n({})", conversation.generated_email, request.user_message)
        });
        conversation.generated_email = response.clone();
        conversation.follow_up_messages.push(request.user_message.clone());
        Ok(FollowUpReply { response, conversation_id: conversation.id.clone() })
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), AppError> {
        let mut inner = lock(&self.inner);
        inner.enter(Operation::DeleteConversation)?;
        let before = inner.conversations.len();
        inner.conversations.retain(|c| &c.id != id);
        if inner.conversations.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

/// A filled-in conversation for seeding an [`InMemoryEmailService`].
pub fn sample_conversation(id: &str, purpose: Purpose) -> Conversation {
    Conversation {
        id: ConversationId::new(id),
        purpose,
        sender_name: "Al".to_string(),
        sender_title: "Eng".to_string(),
        sender_company_name: "Acme".to_string(),
        recipient_name: None,
        call_to_action: "Chat?".to_string(),
        generated_email: format!("Hi there,\n\nDraft for {purpose}.\n\nBest,\nAl"),
        follow_up_messages: Vec::new(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generated_conversation_shows_up_in_history() {
        let service = InMemoryEmailService::new();
        let mut draft = crate::form::EmailDraft {
            purpose: Purpose::Sales,
            sender_name: "Al".into(),
            sender_title: "Eng".into(),
            sender_company_name: "Acme".into(),
            recipient_name: "Hank".into(),
            recipient_company_info: "Globex".into(),
            product_service_description: "Reporting".into(),
            ..Default::default()
        };
        draft.call_to_action = "Demo next week?".into();

        let generated = service.generate_email(&draft.to_request().unwrap()).await.unwrap();
        assert_eq!(generated.email, "Hi Hank,\n\nDemo next week?\n\nBest,\nAl");

        let history = service.list_history().await.unwrap();
        assert_eq!(history.len(), 1);
        let conversation = service.fetch_conversation(&history[0].id).await.unwrap();
        assert_eq!(conversation.recipient_name.as_deref(), Some("Hank"));
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let service = InMemoryEmailService::new();
        service.fail_next(Operation::ListHistory, AppError::network("offline"));
        assert!(service.list_history().await.is_err());
        assert!(service.list_history().await.is_ok());
        assert_eq!(service.calls(Operation::ListHistory), 2);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let service = InMemoryEmailService::new();
        let err = service.delete_conversation(&"nope".into()).await.unwrap_err();
        assert_eq!(err.user_message("x"), "Conversation not found");
    }
}
