use crate::config::ClientConfig;
use crate::errors::AppError;
use crate::models::{Conversation, ConversationId, FollowUpReply, GeneratedEmail, HistoryEntry};

/// HTTP contract with the remote email service.
///
/// Implementations are single-threaded friendly: returned futures need not be
/// `Send`, so a browser `fetch` binding can implement this directly.
#[allow(async_fn_in_trait)]
pub trait EmailService {
    /// `GET /history/`
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, AppError>;

    /// `POST /generate-email/` (multipart)
    async fn generate_email(&self, request: &GenerationRequest) -> Result<GeneratedEmail, AppError>;

    /// `GET /conversation/{id}`
    async fn fetch_conversation(&self, id: &ConversationId) -> Result<Conversation, AppError>;

    /// `POST /chat-continue/` (multipart)
    async fn continue_conversation(&self, request: &FollowUpRequest) -> Result<FollowUpReply, AppError>;

    /// `DELETE /conversation/{id}`
    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), AppError>;
}

/// Absolute endpoint URLs for a configured base.
#[derive(Clone, Debug)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(config: &ClientConfig) -> Self {
        Self { base: config.api_base().to_string() }
    }

    pub fn history(&self) -> String {
        format!("{}/history/", self.base)
    }

    pub fn generate_email(&self) -> String {
        format!("{}/generate-email/", self.base)
    }

    pub fn conversation(&self, id: &ConversationId) -> String {
        format!("{}/conversation/{id}", self.base)
    }

    pub fn chat_continue(&self) -> String {
        format!("{}/chat-continue/", self.base)
    }
}

/// A file part of a multipart payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content_type: None, bytes }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lower-cased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// One multipart field, in submission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormPart {
    Text { name: &'static str, value: String },
    File { name: &'static str, file: Attachment },
}

impl FormPart {
    pub fn name(&self) -> &'static str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// Validated multipart payload for `POST /generate-email/`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    parts: Vec<FormPart>,
}

impl GenerationRequest {
    pub(crate) fn text(&mut self, name: &'static str, value: &str) {
        self.parts.push(FormPart::Text { name, value: value.to_string() });
    }

    pub(crate) fn text_if_present(&mut self, name: &'static str, value: &str) {
        if !value.trim().is_empty() {
            self.text(name, value);
        }
    }

    pub(crate) fn file(&mut self, name: &'static str, file: Attachment) {
        self.parts.push(FormPart::File { name, file });
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Value of a text field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if *n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.parts.iter().map(FormPart::name).collect()
    }
}

/// Multipart payload for `POST /chat-continue/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowUpRequest {
    pub conversation_id: ConversationId,
    pub user_message: String,
}

impl FollowUpRequest {
    pub fn parts(&self) -> [(&'static str, &str); 2] {
        [
            ("conversation_id", self.conversation_id.as_str()),
            ("user_message", self.user_message.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        let endpoints = Endpoints::new(&ClientConfig::new("https://api.example.com/").unwrap());
        let id = ConversationId::new("abc");
        assert_eq!(endpoints.history(), "https://api.example.com/history/");
        assert_eq!(endpoints.generate_email(), "https://api.example.com/generate-email/");
        assert_eq!(endpoints.conversation(&id), "https://api.example.com/conversation/abc");
        assert_eq!(endpoints.chat_continue(), "https://api.example.com/chat-continue/");
    }

    #[test]
    fn attachment_extension() {
        assert_eq!(Attachment::new("CV.PDF", vec![]).extension().as_deref(), Some("pdf"));
        assert_eq!(Attachment::new("resume", vec![]).extension(), None);
        assert_eq!(Attachment::new("resume.", vec![]).extension(), None);
    }
}
