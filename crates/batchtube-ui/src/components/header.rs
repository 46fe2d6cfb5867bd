//! Header component.

use batchtube_core::Phase;
use leptos::prelude::*;

use crate::app::use_app;

/// Application header with the "new playlist" action.
#[component]
pub fn Header() -> impl IntoView {
    let app = use_app();
    let has_playlist = move || app.page.with(|p| p.phase == Phase::Playlist);
    let busy = move || app.page.with(|p| p.busy);

    view! {
        <header class="app-header">
            <div class="logo">
                <span class="logo-text">"Batchtube"</span>
                <span class="logo-sub">"Playlist downloader"</span>
            </div>
            <Show when=has_playlist>
                <button
                    class="btn btn-ghost"
                    prop:disabled=busy
                    on:click=move |_| {
                        app.controller().start_new_playlist();
                    }
                >
                    "New playlist"
                </button>
            </Show>
        </header>
    }
}
