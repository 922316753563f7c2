use cold_mailer::api::FollowUpRequest;
use cold_mailer::models::{FollowUpReply, GeneratedEmail};
use cold_mailer::{
    AppError, Attachment, ClientConfig, Conversation, ConversationId, EmailService, Endpoints,
    FormPart, GenerationRequest, HistoryEntry,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData};

/// `fetch`-backed implementation of the email service contract.
pub struct HttpEmailService {
    endpoints: Endpoints,
}

impl HttpEmailService {
    pub fn new(config: &ClientConfig) -> Self {
        Self { endpoints: Endpoints::new(config) }
    }
}

fn js_error(err: JsValue) -> AppError {
    AppError::network(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn network_error(err: gloo_net::Error) -> AppError {
    AppError::network(err.to_string())
}

/// Maps non-2xx responses to `AppError::Server`, carrying the `detail` text.
async fn check(resp: Response) -> Result<Response, AppError> {
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::from_response(status, &body))
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, AppError> {
    check(resp)
        .await?
        .json::<T>()
        .await
        .map_err(|e| AppError::decode(e.to_string()))
}

fn form_data(parts: &[FormPart]) -> Result<FormData, AppError> {
    let form = FormData::new().map_err(js_error)?;
    for part in parts {
        match part {
            FormPart::Text { name, value } => form.append_with_str(name, value).map_err(js_error)?,
            FormPart::File { name, file } => {
                let blob = to_blob(file)?;
                form.append_with_blob_and_filename(name, &blob, &file.file_name)
                    .map_err(js_error)?;
            }
        }
    }
    Ok(form)
}

fn to_blob(file: &Attachment) -> Result<Blob, AppError> {
    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    let sequence = js_sys::Array::of1(&bytes);
    let blob = match &file.content_type {
        Some(content_type) => {
            let options = BlobPropertyBag::new();
            options.set_type(content_type);
            Blob::new_with_u8_array_sequence_and_options(&sequence, &options)
        }
        None => Blob::new_with_u8_array_sequence(&sequence),
    };
    blob.map_err(js_error)
}

/// Reads a picked file into memory so the draft stays platform-neutral.
pub async fn read_attachment(file: web_sys::File) -> Result<Attachment, AppError> {
    let buffer = JsFuture::from(file.array_buffer()).await.map_err(js_error)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let attachment = Attachment::new(file.name(), bytes);
    let content_type = file.type_();
    Ok(if content_type.is_empty() {
        attachment
    } else {
        attachment.with_content_type(content_type)
    })
}

impl EmailService for HttpEmailService {
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, AppError> {
        let resp = Request::get(&self.endpoints.history())
            .send()
            .await
            .map_err(network_error)?;
        read_json(resp).await
    }

    async fn generate_email(&self, request: &GenerationRequest) -> Result<GeneratedEmail, AppError> {
        log::debug!("Submitting generation request: {:?}", request.field_names());
        let resp = Request::post(&self.endpoints.generate_email())
            .body(form_data(request.parts())?)
            .map_err(network_error)?
            .send()
            .await
            .map_err(network_error)?;
        read_json(resp).await
    }

    async fn fetch_conversation(&self, id: &ConversationId) -> Result<Conversation, AppError> {
        let resp = Request::get(&self.endpoints.conversation(id))
            .send()
            .await
            .map_err(network_error)?;
        read_json(resp).await
    }

    async fn continue_conversation(&self, request: &FollowUpRequest) -> Result<FollowUpReply, AppError> {
        let form = FormData::new().map_err(js_error)?;
        for (name, value) in request.parts() {
            form.append_with_str(name, value).map_err(js_error)?;
        }
        let resp = Request::post(&self.endpoints.chat_continue())
            .body(form)
            .map_err(network_error)?
            .send()
            .await
            .map_err(network_error)?;
        read_json(resp).await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), AppError> {
        let resp = Request::delete(&self.endpoints.conversation(id))
            .send()
            .await
            .map_err(network_error)?;
        check(resp).await.map(|_| ())
    }
}
