//! Playlist URL input.

use batchtube_core::Phase;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::debug;

use crate::app::use_app;

/// URL form shown before a playlist is loaded.
///
/// Validation and extraction errors come back through the page projection
/// and render under the input.
#[component]
pub fn UrlForm() -> impl IntoView {
    let app = use_app();
    let url = RwSignal::new(String::new());
    let extracting = move || app.page.with(|p| p.phase == Phase::Extracting);
    let input_error = move || app.page.with(|p| p.input_error.clone());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let controller = app.controller();
        let raw = url.get_untracked();
        spawn_local(async move {
            if let Err(e) = controller.submit_url(&raw).await {
                debug!("Playlist not loaded: {}", e);
            }
        });
    };

    view! {
        <section class="url-section">
            <h1 class="url-heading">"Download a whole playlist"</h1>
            <form class="url-form" on:submit=on_submit>
                <input
                    class="url-input"
                    type="text"
                    placeholder="https://www.youtube.com/playlist?list=..."
                    autofocus=true
                    prop:value=move || url.get()
                    prop:disabled=extracting
                    on:input=move |ev| url.set(event_target_value(&ev))
                />
                <button class="btn btn-primary" type="submit" prop:disabled=extracting>
                    {move || if extracting() { "Loading..." } else { "Fetch playlist" }}
                </button>
            </form>
            <Show when=extracting>
                <div class="spinner" aria-label="Loading playlist"></div>
            </Show>
            {move || input_error().map(|message| view! { <p class="input-error">{message}</p> })}
        </section>
    }
}
