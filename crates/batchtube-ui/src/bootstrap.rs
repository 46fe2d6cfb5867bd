//! Startup configuration read from the host page.
//!
//! The page may embed a JSON [`ClientConfig`] in
//! `<script id="batchtube-config" type="application/json">`. A missing
//! element means defaults; an invalid one is reported and also falls back to
//! defaults so the client still starts.

use batchtube_core::{ClientConfig, Endpoints, Error, Result};

/// Id of the inline configuration element.
pub const CONFIG_ELEMENT_ID: &str = "batchtube-config";

/// Where the configuration came from.
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from the page.
    Page,
    /// No configuration element.
    Defaults,
    /// The element was present but unusable.
    Invalid(Error),
}

/// Read the client configuration from the page.
pub fn load_config() -> (ClientConfig, ConfigSource) {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    match raw {
        Some(json) if !json.trim().is_empty() => match ClientConfig::from_json(&json) {
            Ok(config) => (config, ConfigSource::Page),
            Err(e) => (ClientConfig::default(), ConfigSource::Invalid(e)),
        },
        _ => (ClientConfig::default(), ConfigSource::Defaults),
    }
}

/// Origin of the current page, e.g. `http://localhost:8000`.
pub fn page_origin() -> Result<String> {
    web_sys::window()
        .ok_or_else(|| Error::Configuration("no window".to_string()))?
        .location()
        .origin()
        .map_err(|_| Error::Configuration("page origin unavailable".to_string()))
}

/// Backend endpoints for a configuration.
pub fn endpoints(config: &ClientConfig) -> Result<Endpoints> {
    let base = config.resolve_base_url(&page_origin()?)?;
    Endpoints::new(base)
}
