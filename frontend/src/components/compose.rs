use cold_mailer::{EmailDraft, Notice, Purpose};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::read_attachment;
use crate::state::AppState;

/// The free-text fields of a draft, so inputs can be declared uniformly.
#[derive(Clone, Copy)]
enum DraftField {
    RecipientName,
    CallToAction,
    SenderName,
    SenderTitle,
    SenderCompanyName,
    JobDescText,
    JobDescUrl,
    RecipientCompanyInfo,
    ProductServiceDescription,
    PainPointsText,
    PersonInfo,
    CommonGroundText,
}

impl DraftField {
    fn slot(self, draft: &mut EmailDraft) -> &mut String {
        match self {
            DraftField::RecipientName => &mut draft.recipient_name,
            DraftField::CallToAction => &mut draft.call_to_action,
            DraftField::SenderName => &mut draft.sender_name,
            DraftField::SenderTitle => &mut draft.sender_title,
            DraftField::SenderCompanyName => &mut draft.sender_company_name,
            DraftField::JobDescText => &mut draft.job_desc_text,
            DraftField::JobDescUrl => &mut draft.job_desc_url,
            DraftField::RecipientCompanyInfo => &mut draft.recipient_company_info,
            DraftField::ProductServiceDescription => &mut draft.product_service_description,
            DraftField::PainPointsText => &mut draft.pain_points_text,
            DraftField::PersonInfo => &mut draft.person_info,
            DraftField::CommonGroundText => &mut draft.common_ground_text,
        }
    }

    fn get(self, draft: &EmailDraft) -> &str {
        match self {
            DraftField::RecipientName => &draft.recipient_name,
            DraftField::CallToAction => &draft.call_to_action,
            DraftField::SenderName => &draft.sender_name,
            DraftField::SenderTitle => &draft.sender_title,
            DraftField::SenderCompanyName => &draft.sender_company_name,
            DraftField::JobDescText => &draft.job_desc_text,
            DraftField::JobDescUrl => &draft.job_desc_url,
            DraftField::RecipientCompanyInfo => &draft.recipient_company_info,
            DraftField::ProductServiceDescription => &draft.product_service_description,
            DraftField::PainPointsText => &draft.pain_points_text,
            DraftField::PersonInfo => &draft.person_info,
            DraftField::CommonGroundText => &draft.common_ground_text,
        }
    }
}

/// Labelled single-line input, or a textarea when `rows` is given.
#[component]
fn TextField(
    field: DraftField,
    label: &'static str,
    #[prop(optional)] placeholder: &'static str,
    #[prop(optional)] rows: Option<u32>,
) -> impl IntoView {
    let draft = expect_context::<AppState>().draft;
    let value = move || draft.with(|d| field.get(d).to_string());

    let input = match rows {
        Some(rows) => view! {
            <textarea
                rows=rows.to_string()
                placeholder=placeholder
                prop:value=value
                on:input=move |ev| draft.update(|d| *field.slot(d) = event_target_value(&ev))
            />
        }
        .into_any(),
        None => view! {
            <input
                type="text"
                placeholder=placeholder
                prop:value=value
                on:input=move |ev| draft.update(|d| *field.slot(d) = event_target_value(&ev))
            />
        }
        .into_any(),
    };

    view! {
        <label class="field">
            <span class="field-label">{label}</span>
            {input}
        </label>
    }
}

/// Compose view: purpose-specific form plus the generated email.
#[component]
pub fn ComposePage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let draft = state.draft;
    let purpose = Memo::new(move |_| draft.with(|d| d.purpose));
    let submitting = move || state.generation.with(|g| g.is_submitting());

    let on_purpose = move |ev: leptos::ev::Event| {
        match Purpose::try_from(event_target_value(&ev).as_str()) {
            Ok(p) => draft.update(|d| d.purpose = p),
            Err(e) => log::warn!("{e}"),
        }
    };

    let on_resume = move |ev: leptos::ev::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            draft.update(|d| d.resume = None);
            return;
        };
        spawn_local(async move {
            match read_attachment(file).await {
                Ok(attachment) => draft.update(|d| d.resume = Some(attachment)),
                Err(e) => {
                    log::error!("Failed to read resume: {e}");
                    state.notify(Notice::error("Could not read the selected file."));
                }
            }
        });
    };

    let purpose_fields = move || match purpose.get() {
        Purpose::JobApplication => view! {
            <label class="field">
                <span class="field-label">"Resume (PDF/DOCX):"</span>
                <input type="file" accept=".pdf,.docx" on:change=on_resume />
            </label>
            <TextField
                field=DraftField::JobDescText
                label="Job Description Text:"
                placeholder="Paste job description text here..."
                rows=8
            />
            <div class="or-divider">"- OR -"</div>
            <TextField field=DraftField::JobDescUrl label="Job Description URL:" />
        }
        .into_any(),
        Purpose::Sales => view! {
            <TextField field=DraftField::RecipientCompanyInfo label="Recipient Company Info:" />
            <TextField
                field=DraftField::ProductServiceDescription
                label="Product/Service Description:"
            />
            <TextField
                field=DraftField::PainPointsText
                label="Key Pain Points Addressed or Great Features (optional, comma-separated):"
                placeholder="e.g. Automates reporting, Reduces manual work, Integrates with Slack"
            />
        }
        .into_any(),
        Purpose::Networking => view! {
            <TextField
                field=DraftField::PersonInfo
                label="Person's Info (e.g., LinkedIn, achievements):"
                placeholder="Paste LinkedIn profile, bio, or achievements here..."
                rows=4
            />
            <TextField
                field=DraftField::CommonGroundText
                label="Common Ground (optional):"
                placeholder="e.g., mutual connection, shared interest, event, etc."
            />
        }
        .into_any(),
    };

    view! {
        <div class="compose">
            <h1>"AI Cold Email Generator"</h1>
            <form on:submit=move |ev| {
                ev.prevent_default();
                if !submitting() {
                    state.submit();
                }
            }>
                <label class="field">
                    <span class="field-label">"Purpose of Email:"</span>
                    <select
                        prop:value=move || purpose.get().as_str()
                        on:change=on_purpose
                    >
                        {Purpose::ALL
                            .into_iter()
                            .map(|p| view! { <option value=p.as_str()>{p.option_label()}</option> })
                            .collect_view()}
                    </select>
                </label>

                <TextField
                    field=DraftField::RecipientName
                    label="Recipient Name (Optional, e.g., \"John Doe\" or \"Hiring Team\"):"
                    placeholder="e.g., Jane Smith, or Recruiting Team"
                />
                <TextField field=DraftField::CallToAction label="Call to Action:" />
                <div class="sender-grid">
                    <TextField field=DraftField::SenderName label="Your Name:" />
                    <TextField field=DraftField::SenderTitle label="Your Title:" />
                    <TextField
                        field=DraftField::SenderCompanyName
                        label="Your Company/University Name:"
                    />
                </div>

                {purpose_fields}

                <div class="submit-row">
                    <button type="submit" disabled=submitting>
                        {move || if submitting() { "Generating..." } else { "Generate Email" }}
                    </button>
                    <span class="status">{move || state.generation.with(|g| g.status_text())}</span>
                    {move || {
                        state
                            .generation
                            .with(|g| g.error().map(str::to_string))
                            .map(|err| view! { <span class="error">{err}</span> })
                    }}
                </div>
            </form>

            {move || {
                state
                    .generation
                    .with(|g| g.generated_email().map(str::to_string))
                    .map(|email| {
                        let copy = email.clone();
                        view! {
                            <div class="generated">
                                <h2>"Generated Email"</h2>
                                <pre>{email}</pre>
                                <button on:click=move |_| state.copy_to_clipboard(copy.clone())>
                                    "Copy Email"
                                </button>
                            </div>
                        }
                    })
            }}
            {move || {
                state.generation.with(|g| g.is_finished()).then(|| {
                    view! {
                        <button class="primary" on:click=move |_| state.start_new()>
                            "Start New Email"
                        </button>
                    }
                })
            }}
        </div>
    }
}
