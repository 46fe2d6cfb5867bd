//! Global controls above the card grid.

use batchtube_core::{ControlsView, OutputFormat};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::app::use_app;
use crate::components::toast::{Notification, use_notifications};

/// Selection toggle, format picker and download button.
#[component]
pub fn Controls() -> impl IntoView {
    let app = use_app();
    let notifications = use_notifications();
    let controls: Memo<ControlsView> = Memo::new(move |_| app.page.with(|p| p.controls.clone()));

    let on_toggle_all = move |_| {
        app.controller().toggle_all();
    };

    let on_format = move |ev: leptos::ev::Event| {
        if let Some(format) = OutputFormat::parse(&event_target_value(&ev)) {
            app.controller().set_format(format);
        }
    };

    let on_download = move |_| {
        let controller = app.controller();
        spawn_local(async move {
            if let Some(summary) = controller.start_run().await {
                notifications.push(Notification::for_run(&summary));
            }
        });
    };

    view! {
        <div class="controls">
            <button
                class="btn"
                prop:disabled=move || !controls.get().select_toggle_enabled
                on:click=on_toggle_all
            >
                {move || controls.get().select_toggle_label}
            </button>
            <select
                class="format-select"
                prop:value=move || controls.get().format.as_str()
                prop:disabled=move || controls.get().format_locked
                on:change=on_format
            >
                {OutputFormat::ALL
                    .into_iter()
                    .map(|format| view! { <option value=format.as_str()>{format.to_string()}</option> })
                    .collect_view()}
            </select>
            <button
                class="btn btn-primary"
                prop:disabled=move || controls.get().download_disabled
                on:click=on_download
            >
                {move || controls.get().download_label}
            </button>
        </div>
    }
}
