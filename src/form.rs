use crate::api::{Attachment, GenerationRequest};
use crate::errors::AppError;
use crate::models::Purpose;

pub const DEFAULT_CALL_TO_ACTION: &str = "Would you be open to a brief 15-minute chat next week?";

const RESUME_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

/// Everything the compose form collects. Fields for purposes other than the
/// selected one are kept while editing but never submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailDraft {
    pub purpose: Purpose,
    pub recipient_name: String,
    pub sender_name: String,
    pub sender_title: String,
    pub sender_company_name: String,
    pub call_to_action: String,

    // Job application
    pub resume: Option<Attachment>,
    pub job_desc_text: String,
    pub job_desc_url: String,

    // Sales
    pub recipient_company_info: String,
    pub product_service_description: String,
    pub pain_points_text: String,

    // Networking
    pub person_info: String,
    pub common_ground_text: String,
}

impl Default for EmailDraft {
    fn default() -> Self {
        Self {
            purpose: Purpose::default(),
            recipient_name: String::new(),
            sender_name: String::new(),
            sender_title: String::new(),
            sender_company_name: String::new(),
            call_to_action: DEFAULT_CALL_TO_ACTION.to_string(),
            resume: None,
            job_desc_text: String::new(),
            job_desc_url: String::new(),
            recipient_company_info: String::new(),
            product_service_description: String::new(),
            pain_points_text: String::new(),
            person_info: String::new(),
            common_ground_text: String::new(),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(value: &str, label: &str) -> Result<(), AppError> {
    if is_blank(value) {
        return Err(AppError::empty_field(label));
    }
    Ok(())
}

impl EmailDraft {
    /// Validates the draft and packages the purpose-specific multipart payload.
    /// Nothing is sent when this fails.
    pub fn to_request(&self) -> Result<GenerationRequest, AppError> {
        require(&self.sender_name, "Your Name")?;
        require(&self.sender_title, "Your Title")?;
        require(&self.sender_company_name, "Your Company/University Name")?;
        require(&self.call_to_action, "Call to Action")?;

        let mut request = GenerationRequest::default();
        request.text("purpose", self.purpose.as_str());
        request.text("sender_name", &self.sender_name);
        request.text("sender_title", &self.sender_title);
        request.text("sender_company_name", &self.sender_company_name);
        request.text("call_to_action", &self.call_to_action);
        request.text_if_present("recipient_name", &self.recipient_name);

        match self.purpose {
            Purpose::JobApplication => {
                let resume = self.resume.as_ref().ok_or(AppError::MissingResume)?;
                let supported = resume
                    .extension()
                    .is_some_and(|ext| RESUME_EXTENSIONS.contains(&ext.as_str()));
                if !supported {
                    return Err(AppError::UnsupportedResume { file_name: resume.file_name.clone() });
                }
                match (is_blank(&self.job_desc_text), is_blank(&self.job_desc_url)) {
                    (true, true) => return Err(AppError::MissingJobDescription),
                    (false, false) => return Err(AppError::ConflictingJobDescription),
                    _ => {}
                }
                request.file("resume_file", resume.clone());
                request.text_if_present("job_desc_text", &self.job_desc_text);
                request.text_if_present("job_desc_url", &self.job_desc_url);
            }
            Purpose::Sales => {
                if is_blank(&self.recipient_company_info) || is_blank(&self.product_service_description) {
                    return Err(AppError::MissingSalesDetails);
                }
                request.text("recipient_company_info", &self.recipient_company_info);
                request.text("product_service_description", &self.product_service_description);
                request.text_if_present("pain_points_text", &self.pain_points_text);
            }
            Purpose::Networking => {
                if is_blank(&self.person_info) {
                    return Err(AppError::MissingPersonInfo);
                }
                request.text("person_info", &self.person_info);
                request.text_if_present("common_ground_text", &self.common_ground_text);
            }
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(purpose: Purpose) -> EmailDraft {
        EmailDraft {
            purpose,
            sender_name: "Al".into(),
            sender_title: "Eng".into(),
            sender_company_name: "Acme".into(),
            call_to_action: "Chat?".into(),
            ..EmailDraft::default()
        }
    }

    fn resume() -> Attachment {
        Attachment::new("cv.pdf", b"%PDF-1.7".to_vec()).with_content_type("application/pdf")
    }

    #[test]
    fn defaults() {
        let draft = EmailDraft::default();
        assert_eq!(draft.purpose, Purpose::JobApplication);
        assert_eq!(draft.call_to_action, DEFAULT_CALL_TO_ACTION);
    }

    #[test]
    fn common_fields_are_required() {
        let mut draft = sender(Purpose::Networking);
        draft.person_info = "Works at Acme".into();
        draft.sender_title = "   ".into();
        assert_eq!(draft.to_request().unwrap_err(), AppError::empty_field("Your Title"));
    }

    #[test]
    fn job_application_requires_resume() {
        let mut draft = sender(Purpose::JobApplication);
        draft.job_desc_text = "Rust engineer".into();
        assert_eq!(draft.to_request().unwrap_err(), AppError::MissingResume);
    }

    #[test]
    fn job_application_rejects_other_file_types() {
        let mut draft = sender(Purpose::JobApplication);
        draft.resume = Some(Attachment::new("cv.txt", vec![1]));
        draft.job_desc_text = "Rust engineer".into();
        assert!(matches!(draft.to_request(), Err(AppError::UnsupportedResume { .. })));
    }

    #[test]
    fn job_description_needs_exactly_one_source() {
        let mut draft = sender(Purpose::JobApplication);
        draft.resume = Some(resume());
        assert_eq!(draft.to_request().unwrap_err(), AppError::MissingJobDescription);

        draft.job_desc_text = "Rust engineer".into();
        draft.job_desc_url = "https://jobs.example.com/1".into();
        assert_eq!(draft.to_request().unwrap_err(), AppError::ConflictingJobDescription);
        assert_eq!(
            AppError::ConflictingJobDescription.to_string(),
            "Please provide EITHER job description text OR a URL, not both."
        );

        draft.job_desc_text.clear();
        let request = draft.to_request().unwrap();
        assert_eq!(
            request.field_names(),
            vec![
                "purpose",
                "sender_name",
                "sender_title",
                "sender_company_name",
                "call_to_action",
                "resume_file",
                "job_desc_url",
            ]
        );
    }

    #[test]
    fn sales_requires_company_and_product() {
        let mut draft = sender(Purpose::Sales);
        draft.recipient_company_info = "Globex".into();
        assert_eq!(draft.to_request().unwrap_err(), AppError::MissingSalesDetails);

        draft.product_service_description = "Reporting SaaS".into();
        draft.pain_points_text = "Automates reporting".into();
        draft.recipient_name = "Hank".into();
        let request = draft.to_request().unwrap();
        assert_eq!(request.field("purpose"), Some("Sales / Lead Generation"));
        assert_eq!(request.field("recipient_name"), Some("Hank"));
        assert_eq!(request.field("pain_points_text"), Some("Automates reporting"));
    }

    #[test]
    fn networking_sends_only_its_own_fields() {
        let mut draft = sender(Purpose::Networking);
        assert_eq!(draft.to_request().unwrap_err(), AppError::MissingPersonInfo);

        draft.person_info = "Works at Acme".into();
        draft.job_desc_text = "left over from job tab".into();
        draft.recipient_company_info = "left over from sales tab".into();
        let request = draft.to_request().unwrap();
        assert_eq!(request.field("person_info"), Some("Works at Acme"));
        assert_eq!(request.field("job_desc_text"), None);
        assert_eq!(request.field("recipient_company_info"), None);
        assert_eq!(request.field("common_ground_text"), None);
        assert_eq!(request.field("recipient_name"), None);
    }
}
