mod api;
mod components;
mod state;

use cold_mailer::{ClientConfig, Route};
use leptos::mount::mount_to_body;
use leptos::prelude::*;

use components::compose::ComposePage;
use components::conversation::ConversationPage;
use components::history::HistorySidebar;
use components::notice::NoticeToast;
use state::AppState;

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let config = ClientConfig::from_value(option_env!("COLD_MAILER_API_BASE")).unwrap_or_else(|e| {
        log::error!("{e}; falling back to the default API base");
        ClientConfig::default()
    });
    log::info!("Using API base {}", config.api_base());
    let state = AppState::provide(&config);

    // Load history on mount
    state.load_history();

    view! {
        <NoticeToast />
        <nav class="navbar">
            <span class="brand">"AI Cold Email Agent"</span>
            <button class="nav-link" on:click=move |_| state.navigate(Route::Compose)>"Home"</button>
            <button class="nav-link" on:click=move |_| state.start_new()>"New Email"</button>
        </nav>
        <div class="app-container">
            <HistorySidebar />
            <main class="main-content">
                {move || match state.route.get() {
                    Route::Compose => view! { <ComposePage /> }.into_any(),
                    Route::Conversation(id) => view! { <ConversationPage id=id /> }.into_any(),
                }}
            </main>
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
