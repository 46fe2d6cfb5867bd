//! Client configuration.
//!
//! The browser client reads a small JSON document at startup: where the
//! backend lives, which transfer protocol to use and a few defaults. Every
//! field is optional in the JSON form.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

/// Output format for a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Audio only, converted to MP3.
    #[default]
    Mp3,
    /// Audio and video, merged to MP4.
    Mp4,
}

impl OutputFormat {
    /// All formats in display order.
    pub const ALL: [Self; 2] = [Self::Mp3, Self::Mp4];

    /// Value sent to the backend as `fmt`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }

    /// Parse the backend value, as used by the format picker.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|fmt| fmt.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mp3 => write!(f, "Audio (MP3)"),
            Self::Mp4 => write!(f, "Video (MP4)"),
        }
    }
}

/// Protocol used to transfer a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// One request per item, awaited in order.
    Sequential,
    /// One server-push subscription per run.
    #[default]
    EventStream,
}

impl TransferMode {
    /// Whether item selection is frozen while a run is in flight.
    pub const fn locks_selection_while_busy(&self) -> bool {
        matches!(self, Self::Sequential)
    }

    /// Whether the backend keeps finished files for later retrieval.
    pub const fn serves_files(&self) -> bool {
        matches!(self, Self::EventStream)
    }
}

impl std::fmt::Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::EventStream => write!(f, "event stream"),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL. `None` means the page's own origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Transfer protocol.
    #[serde(default)]
    pub transfer_mode: TransferMode,
    /// Format preselected after extraction.
    #[serde(default)]
    pub default_format: OutputFormat,
    /// Server-side folder to save into (sequential mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<String>,
    /// `tracing` filter directive for the console logger.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            transfer_mode: TransferMode::default(),
            default_format: OutputFormat::default(),
            save_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        info!(
            "Loaded client config (mode: {}, format: {})",
            config.transfer_mode,
            config.default_format.as_str()
        );
        Ok(config)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if let Some(base) = &self.api_base_url {
            let url = Url::parse(base).map_err(|e| {
                Error::Configuration(format!("api_base_url is not a valid URL ({base}): {e}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Configuration(format!(
                    "api_base_url must use http or https: {base}"
                )));
            }
        }
        if self.save_dir.is_some() && self.transfer_mode != TransferMode::Sequential {
            debug!("save_dir is ignored outside sequential mode");
        }
        if self.log_level.trim().is_empty() {
            return Err(Error::Configuration("log_level must not be empty".to_string()));
        }
        Ok(())
    }

    /// Resolve the backend base URL against the page origin.
    pub fn resolve_base_url(&self, page_origin: &str) -> Result<Url> {
        let raw = self.api_base_url.as_deref().unwrap_or(page_origin);
        Ok(Url::parse(raw)?)
    }

    /// The save directory, only honoured in sequential mode.
    pub fn effective_save_dir(&self) -> Option<&str> {
        match self.transfer_mode {
            TransferMode::Sequential => self
                .save_dir
                .as_deref()
                .map(str::trim)
                .filter(|dir| !dir.is_empty()),
            TransferMode::EventStream => None,
        }
    }
}
