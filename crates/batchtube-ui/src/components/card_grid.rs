//! Item card grid.
//!
//! Cards are keyed by video id, so a run only patches the parts of a card
//! that change (status, progress, links) and never rebuilds the grid.

use batchtube_core::CardView;
use leptos::ev::MouseEvent;
use leptos::prelude::*;

use crate::app::use_app;

/// Single item card.
///
/// Identity fields come from the card as first projected; everything a run
/// touches is read from the live page projection.
#[component]
fn Card(
    /// The card as projected when the playlist loaded.
    card: CardView,
) -> impl IntoView {
    let app = use_app();
    let id = card.video_id.clone();

    let live = {
        let id = id.clone();
        Memo::new(move |_| {
            app.page.with(|p| {
                p.cards
                    .iter()
                    .find(|c| c.video_id == id)
                    .cloned()
                    .unwrap_or_default()
            })
        })
    };
    let file_url = Memo::new(move |_| live.with(|c| c.file_url.clone()));
    let selected = move || live.with(|c| c.selected);
    let status_label = move || live.with(|c| c.status_label.clone());

    let classes = move || {
        live.with(|c| {
            let mut classes = format!("card status-{}", c.status.as_str());
            if c.selected {
                classes.push_str(" selected");
            }
            if !c.toggle_enabled {
                classes.push_str(" locked");
            }
            classes
        })
    };

    view! {
        <div
            class=classes
            aria-selected=move || selected().to_string()
            on:click=move |_| {
                app.controller().toggle(&id);
            }
        >
            <div class="card-thumb">
                <img src=card.thumbnail_url alt=card.title.clone() loading="lazy" />
                {card.duration.map(|d| view! { <span class="card-duration">{d}</span> })}
                <span class="card-check">{move || if selected() { "✓" } else { "" }}</span>
            </div>
            <div class="card-body">
                <div class="card-title" title=card.title.clone()>{card.title.clone()}</div>
                {card.uploader.map(|u| view! { <div class="card-uploader">{u}</div> })}
                <div class="card-progress">
                    <div
                        class="card-progress-fill"
                        style:width=move || live.with(|c| format!("{:.1}%", c.progress_percent))
                    ></div>
                </div>
                {move || {
                    live.with(|c| c.error_message.clone())
                        .map(|e| view! { <div class="card-error">{e}</div> })
                }}
                {move || {
                    live.with(|c| c.note.clone()).map(|n| view! { <div class="card-note">{n}</div> })
                }}
                // Clicks in the status region never toggle the selection.
                <div class="card-status" on:click=|ev: MouseEvent| ev.stop_propagation()>
                    {move || match file_url.get() {
                        Some(url) => {
                            view! {
                                <a class="card-file" href=url target="_blank" rel="noopener">
                                    {status_label}
                                </a>
                            }
                                .into_any()
                        }
                        None => view! { <span>{status_label}</span> }.into_any(),
                    }}
                    {move || {
                        live.with(|c| c.speed.clone())
                            .map(|s| view! { <span class="card-speed">{s}</span> })
                    }}
                </div>
            </div>
        </div>
    }
}

/// Card grid for the loaded playlist.
#[component]
pub fn CardGrid() -> impl IntoView {
    let app = use_app();

    view! {
        <div class="card-grid">
            <For
                each=move || app.page.with(|p| p.cards.clone())
                key=|card| card.video_id.clone()
                children=move |card| view! { <Card card=card /> }
            />
        </div>
    }
}
