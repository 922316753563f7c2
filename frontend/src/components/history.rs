use cold_mailer::display::{format_timestamp, snippet};
use cold_mailer::HistoryEntry;
use leptos::prelude::*;

use crate::state::AppState;

/// Sidebar listing past conversations, newest first.
#[component]
pub fn HistorySidebar() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>"Email History"</h2>
                <button class="refresh-btn" title="Refresh" on:click=move |_| state.load_history()>
                    "⟳"
                </button>
            </div>
            <div class="conversation-list">
                {move || {
                    if state.history.with(|h| h.entries.is_empty()) {
                        view! { <div class="empty-state">"No emails yet."</div> }.into_any()
                    } else {
                        view! {
                            <For
                                each=move || state.history.get().entries
                                key=|entry| entry.id.clone()
                                let:entry
                            >
                                <HistoryCard entry=entry />
                            </For>
                        }
                            .into_any()
                    }
                }}
            </div>
            <button class="new-chat-btn" on:click=move |_| state.start_new()>
                "+ Start New Email"
            </button>
        </aside>
        <DeleteDialog />
    }
}

/// One history entry: category badge, purpose, created time and a snippet.
#[component]
fn HistoryCard(entry: HistoryEntry) -> impl IntoView {
    let state = expect_context::<AppState>();
    let id = entry.id.clone();
    let id_delete = entry.id.clone();
    let id_deleting = entry.id.clone();
    let deleting = move || state.history.with(|h| h.delete.deleting_id() == Some(&id_deleting));
    let deleting_label = deleting.clone();

    view! {
        <div class="conversation-item" on:click=move |_| state.open_conversation(id.clone())>
            <span class="badge">{entry.purpose.category()}</span>
            <div class="item-title">{entry.purpose.as_str()}</div>
            <div class="item-date">{format_timestamp(&entry.created_at)}</div>
            <div class="item-snippet">{snippet(&entry.generated_email)}</div>
            <button
                class="delete-btn"
                title="Delete chat"
                disabled=deleting.clone()
                on:click=move |ev| {
                    ev.stop_propagation();
                    state.request_history_delete(id_delete.clone());
                }
            >
                {move || if deleting_label() { "…" } else { "🗑" }}
            </button>
        </div>
    }
}

/// Confirmation for deleting a history entry; stays open while deleting.
#[component]
fn DeleteDialog() -> impl IntoView {
    let state = expect_context::<AppState>();
    let deleting = move || state.history.with(|h| h.delete.is_deleting());

    view! {
        <Show when=move || state.history.with(|h| h.delete.pending_id().is_some())>
            <div class="dialog-backdrop">
                <div class="dialog">
                    <h3>"Delete Conversation?"</h3>
                    <p>"Are you sure you want to delete this conversation? This cannot be undone."</p>
                    <div class="dialog-actions">
                        <button disabled=deleting on:click=move |_| state.cancel_history_delete()>
                            "Cancel"
                        </button>
                        <button
                            class="danger"
                            disabled=deleting
                            on:click=move |_| state.confirm_history_delete()
                        >
                            {move || if deleting() { "Deleting..." } else { "Delete" }}
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
