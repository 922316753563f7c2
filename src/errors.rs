use thiserror::Error;

/// Top-level client error.
/// Validation variants carry the exact text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("Please upload a resume for Job Application.")]
    MissingResume,

    #[error("Resume '{file_name}' must be a PDF or DOCX file.")]
    UnsupportedResume { file_name: String },

    #[error("Please provide either job description text or a URL for Job Application.")]
    MissingJobDescription,

    #[error("Please provide EITHER job description text OR a URL, not both.")]
    ConflictingJobDescription,

    #[error("Recipient company info and product/service description are required for Sales.")]
    MissingSalesDetails,

    #[error("Person's info is required for Networking.")]
    MissingPersonInfo,

    // ── Configuration errors ─────────────────────────────────────────────────
    #[error("Invalid API base URL '{value}': must start with http:// or https://")]
    InvalidConfig { value: String },

    // ── Transport errors ─────────────────────────────────────────────────────
    #[error("{message}")]
    Network { message: String },

    #[error("Could not decode server response: {message}")]
    Decode { message: String },

    // ── Server errors ────────────────────────────────────────────────────────
    #[error("Server error {status}{}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },

    // ── Lifecycle errors ─────────────────────────────────────────────────────
    #[error("Request cancelled")]
    Cancelled,
}

impl AppError {
    pub fn empty_field(field_name: impl Into<String>) -> Self {
        AppError::EmptyField { field_name: field_name.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        AppError::Network { message: message.into() }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        AppError::Decode { message: message.into() }
    }

    /// Builds a server error from a non-2xx status and its raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        AppError::Server { status, detail: crate::models::ErrorBody::detail_from(body) }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyField { .. }
                | AppError::MissingResume
                | AppError::UnsupportedResume { .. }
                | AppError::MissingJobDescription
                | AppError::ConflictingJobDescription
                | AppError::MissingSalesDetails
                | AppError::MissingPersonInfo
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Network { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }

    /// The server's `detail` text verbatim when present, `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Server { detail: Some(detail), .. } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_detail_is_used_verbatim() {
        let err = AppError::from_response(422, r#"{"detail":"Resume could not be parsed"}"#);
        assert_eq!(err.user_message("Failed"), "Resume could not be parsed");
        assert_eq!(err.to_string(), "Server error 422: Resume could not be parsed");
    }

    #[test]
    fn fallback_applies_without_detail() {
        let err = AppError::from_response(500, "Internal Server Error");
        assert_eq!(err.user_message("Failed to send message"), "Failed to send message");
        assert_eq!(err.to_string(), "Server error 500");

        let net = AppError::network("connection refused");
        assert_eq!(net.user_message("Failed"), "Failed");
        assert!(net.is_transport());
    }

    #[test]
    fn validation_predicate() {
        assert!(AppError::MissingResume.is_validation());
        assert!(AppError::empty_field("Your Name").is_validation());
        assert!(!AppError::Cancelled.is_validation());
        assert!(AppError::Cancelled.is_cancelled());
    }
}
