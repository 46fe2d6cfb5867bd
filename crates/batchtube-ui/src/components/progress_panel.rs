//! Aggregate progress, run summary and bulk retrieval link.

use leptos::prelude::*;

use crate::app::use_app;

/// Progress bar of the current run plus the outcome of the last one.
#[component]
pub fn ProgressPanel() -> impl IntoView {
    let app = use_app();
    let progress = move || app.page.with(|p| p.progress.clone());
    let status_message = move || app.page.with(|p| p.status_message.clone());
    let zip_url = move || app.page.with(|p| p.zip_url.clone());

    view! {
        <div class="progress-panel">
            {move || {
                progress()
                    .map(|progress| {
                        view! {
                            <div class="progress">
                                <div
                                    class="progress-bar"
                                    role="progressbar"
                                    aria-valuemin="0"
                                    aria-valuemax=progress.total.to_string()
                                    aria-valuenow=progress.resolved.to_string()
                                >
                                    <div
                                        class="progress-fill"
                                        style:width=format!("{:.1}%", progress.fraction * 100.0)
                                    ></div>
                                </div>
                                <span class="progress-label">{progress.label}</span>
                            </div>
                        }
                    })
            }}
            {move || status_message().map(|message| view! { <p class="status-message">{message}</p> })}
            {move || {
                zip_url()
                    .map(|url| {
                        view! {
                            <a class="btn btn-primary zip-link" href=url download="">
                                "Download all as ZIP"
                            </a>
                        }
                    })
            }}
        </div>
    }
}
