use std::sync::Arc;

use cold_mailer::display::{
    follow_up_count, format_timestamp, recipient_label, sender_line, sender_role, Reveal,
};
use cold_mailer::state::{ConversationController, DetailState, DetailStatus};
use cold_mailer::{Conversation, ConversationId, Route};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::state::{AppState, Service};

type Controller = Arc<ConversationController<Service>>;

/// Detail view for one stored conversation.
#[component]
pub fn ConversationPage(id: ConversationId) -> impl IntoView {
    let state = expect_context::<AppState>();
    let changed = ArcTrigger::new();
    let controller = StoredValue::new(state.conversation_controller(&changed));
    let detail = Memo::new(move |_| {
        changed.track();
        controller.with_value(|c| c.snapshot())
    });
    let reveal = RwSignal::new(None::<Reveal>);

    on_cleanup(move || {
        if let Some(c) = controller.try_get_value() {
            c.close();
        }
    });

    {
        let controller = controller.get_value();
        spawn_local(async move { controller.load(&id).await });
    }

    // Ready and Sending share one view so the follow-up input survives a send.
    let phase = Memo::new(move |_| {
        detail.with(|d| match &d.status {
            DetailStatus::Loading => None,
            DetailStatus::LoadFailed { message } => Some(Err(message.clone())),
            DetailStatus::Ready | DetailStatus::Sending => Some(Ok(())),
        })
    });

    move || match phase.get() {
        None => view! { <div class="loading">"Loading conversation..."</div> }.into_any(),
        Some(Err(message)) => view! {
            <div class="load-error">
                <p class="error">{message}</p>
                <button on:click=move |_| state.start_new()>"Start New Email"</button>
            </div>
        }
        .into_any(),
        Some(Ok(())) => {
            view! { <ConversationDetail controller=controller detail=detail reveal=reveal /> }.into_any()
        }
    }
}

/// Runs the character reveal of a fresh reply until done or the view closes.
fn start_reveal(controller: StoredValue<Controller>, reveal: RwSignal<Option<Reveal>>, text: String) {
    reveal.set(Some(Reveal::new(text)));
    spawn_local(async move {
        loop {
            TimeoutFuture::new(Reveal::TICK_MS).await;
            if controller.try_with_value(|c| c.is_closed()).unwrap_or(true) {
                break;
            }
            let more = reveal
                .try_update(|r| r.as_mut().is_some_and(Reveal::advance))
                .unwrap_or(false);
            if !more {
                break;
            }
        }
    });
}

#[component]
fn ConversationDetail(
    controller: StoredValue<Controller>,
    detail: Memo<DetailState>,
    reveal: RwSignal<Option<Reveal>>,
) -> impl IntoView {
    let state = expect_context::<AppState>();
    let message = RwSignal::new(String::new());
    let conversation = Memo::new(move |_| detail.with(|d| d.conversation.clone()));
    let sending = move || detail.with(|d| d.is_sending());

    let send = move || {
        let text = message.get_untracked();
        if text.trim().is_empty() || sending() {
            return;
        }
        let c = controller.get_value();
        spawn_local(async move {
            if c.send_follow_up(&text).await.is_ok() {
                message.set(String::new());
                let snapshot = c.snapshot();
                if let Some(reply) = snapshot.copy_text() {
                    start_reveal(controller, reveal, reply.to_string());
                }
            }
        });
    };

    let email_text = move || {
        let revealing = reveal.with(|r| r.as_ref().filter(|r| !r.is_done()).map(|r| r.visible().to_string()));
        revealing.unwrap_or_else(|| detail.with(|d| d.copy_text().unwrap_or_default().to_string()))
    };

    let copy = move |_: leptos::ev::MouseEvent| {
        reveal.update(|r| {
            if let Some(r) = r.as_mut() {
                r.finish();
            }
        });
        if let Some(text) = detail.with(|d| d.copy_text().map(str::to_string)) {
            state.copy_to_clipboard(text);
        }
    };

    move || {
        let Some(conv) = conversation.get() else {
            return view! { <div class="loading">"Loading conversation..."</div> }.into_any();
        };
        view! {
            <div class="conversation-layout">
                <section class="conversation-main">
                    <div class="conversation-header">
                        <button class="back-btn" on:click=move |_| state.navigate(Route::Compose)>
                            "← Back"
                        </button>
                        <span class="badge">{conv.purpose.category()}</span>
                        <h2>{conv.purpose.as_str()}</h2>
                        <button on:click=move |_| state.start_new()>"Start New Email"</button>
                        <button
                            class="danger"
                            disabled=move || detail.with(|d| d.delete.is_deleting())
                            on:click=move |_| {
                                controller.with_value(|c| c.request_delete());
                            }
                        >
                            "Delete"
                        </button>
                    </div>

                    <div class="email-card">
                        <div class="email-meta">
                            <div>"To: " {recipient_label(&conv).to_string()}</div>
                            <div>"From: " {sender_line(&conv)}</div>
                        </div>
                        <pre class="email-body">{email_text}</pre>
                        <button on:click=copy>"Copy Email"</button>
                    </div>

                    <FollowUpList messages=conv.follow_up_messages.clone() />

                    <form
                        class="follow-up"
                        on:submit=move |ev| {
                            ev.prevent_default();
                            send();
                        }
                    >
                        <input
                            type="text"
                            placeholder="Ask for changes, e.g. \"Make it shorter\""
                            disabled=sending
                            prop:value=move || message.get()
                            on:input=move |ev| message.set(event_target_value(&ev))
                        />
                        <button
                            type="submit"
                            disabled=move || sending() || message.with(|m| m.trim().is_empty())
                        >
                            {move || if sending() { "Sending..." } else { "Send" }}
                        </button>
                    </form>
                    {move || {
                        detail
                            .with(|d| d.follow_up_error.clone())
                            .map(|err| view! { <p class="error">{err}</p> })
                    }}
                </section>

                <DetailsPanel conversation=conv />
                <ConfirmDelete controller=controller detail=detail />
            </div>
        }
        .into_any()
    }
}

#[component]
fn FollowUpList(messages: Vec<String>) -> impl IntoView {
    if messages.is_empty() {
        return ().into_any();
    }
    view! {
        <div class="follow-ups">
            <h3>"Follow-up Messages"</h3>
            <ul>{messages.into_iter().map(|m| view! { <li>{m}</li> }).collect_view()}</ul>
        </div>
    }
    .into_any()
}

/// Side panel with the stored conversation parameters.
#[component]
fn DetailsPanel(conversation: Conversation) -> impl IntoView {
    let recipient = conversation
        .recipient_name
        .clone()
        .unwrap_or_else(|| "Not specified".to_string());

    view! {
        <aside class="details-panel">
            <h3>"Details"</h3>
            <dl>
                <dt>"Purpose"</dt>
                <dd>{conversation.purpose.as_str()}</dd>
                <dt>"Sender"</dt>
                <dd>
                    {conversation.sender_name.clone()}
                    <br />
                    {sender_role(&conversation)}
                </dd>
                <dt>"Recipient"</dt>
                <dd>{recipient}</dd>
                <dt>"Call to Action"</dt>
                <dd>{conversation.call_to_action.clone()}</dd>
                <dt>"Created"</dt>
                <dd>{format_timestamp(&conversation.created_at)}</dd>
                <dt>"Follow-ups"</dt>
                <dd>{follow_up_count(&conversation)}</dd>
            </dl>
        </aside>
    }
}

/// Confirmation for deleting the open conversation. On success the view
/// returns to compose.
#[component]
fn ConfirmDelete(controller: StoredValue<Controller>, detail: Memo<DetailState>) -> impl IntoView {
    let state = expect_context::<AppState>();
    let deleting = move || detail.with(|d| d.delete.is_deleting());

    let confirm = move |_: leptos::ev::MouseEvent| {
        let c = controller.get_value();
        spawn_local(async move {
            let Some(outcome) = c.confirm_delete().await else {
                return;
            };
            state.notify(outcome.notice().clone());
            if outcome.is_deleted() {
                state.navigate(Route::Compose);
            }
        });
    };

    move || {
        if detail.with(|d| d.delete.pending_id().is_none()) {
            return ().into_any();
        }
        view! {
            <div class="dialog-backdrop">
                <div class="dialog">
                    <h3>"Delete Conversation?"</h3>
                    <p>"Are you sure you want to delete this conversation? This cannot be undone."</p>
                    <div class="dialog-actions">
                        <button
                            disabled=deleting
                            on:click=move |_| {
                                controller.with_value(|c| c.cancel_delete());
                            }
                        >
                            "Cancel"
                        </button>
                        <button class="danger" disabled=deleting on:click=confirm>
                            {move || if deleting() { "Deleting..." } else { "Delete" }}
                        </button>
                    </div>
                </div>
            </div>
        }
        .into_any()
    }
}
