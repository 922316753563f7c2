use leptos::prelude::*;

use crate::state::AppState;

/// Top-right transient notification.
#[component]
pub fn NoticeToast() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        {move || {
            state.notice.get().map(|notice| {
                let class = if notice.is_error() { "toast error" } else { "toast success" };
                view! {
                    <div class=class on:click=move |_| state.notice.set(None)>
                        {notice.message}
                    </div>
                }
            })
        }}
    }
}
