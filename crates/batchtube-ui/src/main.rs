//! Batchtube UI entry point for WASM.

#![no_main]

use batchtube_ui::App;
use batchtube_ui::bootstrap::{self, ConfigSource};
use batchtube_ui::logging::{self, LoggingConfig};
use leptos::prelude::*;
use tracing::{error, info, warn};
use wasm_bindgen::prelude::wasm_bindgen;

/// Entry point for the WASM application.
/// This function is called automatically when the WASM module is loaded.
#[wasm_bindgen(start)]
pub fn start() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();

    let (config, source) = bootstrap::load_config();
    if let Err(e) = logging::init(&LoggingConfig::auto().with_level(config.log_level.clone())) {
        web_sys::console::warn_1(&format!("Logging not initialized: {e}").into());
    }

    match source {
        ConfigSource::Page => info!(mode = %config.transfer_mode, "Loaded page configuration"),
        ConfigSource::Defaults => info!(mode = %config.transfer_mode, "Using default configuration"),
        ConfigSource::Invalid(e) => warn!("Ignoring invalid page configuration: {}", e),
    }

    let endpoints = match bootstrap::endpoints(&config) {
        Ok(endpoints) => endpoints,
        Err(e) => {
            error!("Cannot resolve backend address: {}", e);
            return;
        }
    };

    // Remove the loading spinner
    if let Some(window) = web_sys::window()
        && let Some(document) = window.document()
        && let Some(loading) = document.get_element_by_id("loading")
    {
        loading.remove();
    }

    mount_to_body(move || view! { <App config=config endpoints=endpoints /> });
}
