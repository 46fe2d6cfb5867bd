//! Main application component.

use std::rc::Rc;

use batchtube_core::{ClientConfig, Controller, Endpoints, PageView, Phase, SessionState, project};
use leptos::prelude::*;

use crate::components::{CardGrid, Controls, Header, NotificationProvider, ProgressPanel, UrlForm};
use crate::http_backend::HttpBackend;
use crate::store::SignalStore;
use crate::theme::generate_css_variables;

/// Controller wired to the browser backend and the state signal.
pub type AppController = Controller<HttpBackend, SignalStore>;

/// Shared handles for every component.
#[derive(Clone, Copy)]
pub struct AppContext {
    controller: StoredValue<Rc<AppController>, LocalStorage>,
    /// Page projection, recomputed after every state change.
    pub page: Memo<PageView>,
}

impl AppContext {
    /// The controller, for starting flows.
    pub fn controller(&self) -> Rc<AppController> {
        self.controller.get_value()
    }
}

/// Access the application context.
///
/// # Panics
/// Panics if called outside of [`App`].
pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

/// Main application component.
#[component]
pub fn App(
    /// Client configuration read at startup.
    config: ClientConfig,
    /// Backend endpoints.
    endpoints: Endpoints,
) -> impl IntoView {
    let css_vars = generate_css_variables();
    let mode = config.transfer_mode;

    let state = RwSignal::new(SessionState::new(config.default_format));
    let controller = Controller::new(
        HttpBackend::new(endpoints.clone()),
        SignalStore::new(state),
        endpoints.clone(),
        &config,
    );
    let page = Memo::new(move |_| state.with(|s| project(s, mode, &endpoints)));

    provide_context(AppContext {
        controller: StoredValue::new_local(Rc::new(controller)),
        page,
    });

    view! {
        <style>{css_vars}</style>
        <style>{include_str!("../styles/main.css")}</style>
        <NotificationProvider>
            <Header />
            <main class="container">
                <Show
                    when=move || page.with(|p| p.phase == Phase::Playlist)
                    fallback=|| view! { <UrlForm /> }
                >
                    <PlaylistView />
                </Show>
            </main>
        </NotificationProvider>
    }
}

/// Loaded playlist: heading, controls, progress and the card grid.
#[component]
fn PlaylistView() -> impl IntoView {
    let app = use_app();
    let title = move || app.page.with(|p| p.playlist_title.clone().unwrap_or_default());
    let count = move || app.page.with(|p| p.controls.total_count);

    view! {
        <section class="playlist">
            <div class="playlist-header">
                <h2 class="playlist-title">{title}</h2>
                <span class="playlist-count">{move || format!("{} videos", count())}</span>
            </div>
            <Controls />
            <ProgressPanel />
            <CardGrid />
        </section>
    }
}
