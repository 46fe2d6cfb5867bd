//! Backend HTTP contract: endpoint URLs, request bodies and response helpers.
//!
//! Every URL the client talks to is built here so path segments and query
//! values are percent-encoded in one place.

use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

use crate::config::OutputFormat;
use crate::error::{Error, Result};

/// Longest file name stem produced by [`safe_filename`].
pub const MAX_FILENAME_LEN: usize = 200;

/// Stem used when a title has no usable characters.
pub const DEFAULT_FILENAME_STEM: &str = "video";

/// Endpoint builder rooted at the backend base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Create endpoints under `base`.
    pub fn new(base: Url) -> Result<Self> {
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "backend URL must be an http(s) base URL: {base}"
            )));
        }
        Ok(Self { base })
    }

    /// Parse `base` and create endpoints under it.
    pub fn parse(base: &str) -> Result<Self> {
        Self::new(Url::parse(base)?)
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `POST` target for playlist extraction.
    pub fn extract(&self) -> Url {
        self.join(&["api", "extract"])
    }

    /// `POST` target for a single request/response download.
    pub fn download(&self) -> Url {
        self.join(&["api", "download"])
    }

    /// Server-push subscription for a run.
    pub fn subscription(&self, session_id: &str, video_ids: &[String], format: OutputFormat) -> Url {
        let mut url = self.join(&["api", "download", session_id]);
        url.query_pairs_mut()
            .append_pair("video_ids", &video_ids.join(","))
            .append_pair("fmt", format.as_str());
        url
    }

    /// Retrieval link for one completed item.
    pub fn file(&self, session_id: &str, video_id: &str) -> Url {
        self.join(&["api", "file", session_id, video_id])
    }

    /// Retrieval link for a bundle of every completed item.
    pub fn zip(&self, session_id: &str) -> Url {
        self.join(&["api", "zip", session_id])
    }

    /// `DELETE` target releasing a backend session.
    pub fn session(&self, session_id: &str) -> Url {
        self.join(&["api", "session", session_id])
    }
}

/// Body of the extraction request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractRequest {
    /// Playlist (or single video) URL.
    pub url: String,
}

/// Body of a request/response download.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Item source URL.
    pub url: String,
    /// Output format.
    pub fmt: OutputFormat,
    /// Title used by the backend to name the file.
    pub title: String,
    /// Server-side folder to save into instead of returning the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<String>,
}

/// Successful result of a request/response download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was handed to the browser under this name.
    File {
        /// Name the file was saved as.
        filename: String,
    },
    /// The backend saved the file itself.
    Saved {
        /// Path reported by the backend.
        path: String,
    },
}

impl DownloadOutcome {
    /// Short note for the item card.
    pub fn note(&self) -> String {
        match self {
            Self::File { filename } => filename.clone(),
            Self::Saved { path } => format!("Saved to {path}"),
        }
    }
}

/// JSON reply when the backend saved the file itself.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedResponse {
    /// Destination path.
    pub saved: String,
}

/// Check a user-supplied playlist URL before any request is made.
pub fn validate_source_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("Please enter a playlist URL".to_string()));
    }
    let looks_valid = Url::parse(trimmed)
        .ok()
        .is_some_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some());
    if !looks_valid {
        return Err(Error::InvalidUrl(
            "Please enter a valid URL starting with http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// `filename*` (RFC 5987) wins over a plain `filename` parameter.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value.trim().rsplit_once("''").map_or(value, |(_, v)| v);
                extended = Some(percent_decode(encoded.trim_matches('"')));
            }
            "filename" => plain = Some(value.trim().trim_matches('"').to_string()),
            _ => {}
        }
    }
    extended.or(plain).filter(|name| !name.trim().is_empty())
}

fn percent_decode(value: &str) -> String {
    let escaped = value.replace('+', "%2B").replace('&', "%26");
    form_urlencoded::parse(format!("v={escaped}").as_bytes())
        .next()
        .map(|(_, decoded)| decoded.into_owned())
        .unwrap_or_default()
}

/// Reduce a title to characters safe in a file name.
pub fn safe_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || " -_().".contains(*c))
        .collect();
    let trimmed: String = kept.trim().chars().take(MAX_FILENAME_LEN).collect();
    if trimmed.is_empty() {
        DEFAULT_FILENAME_STEM.to_string()
    } else {
        trimmed
    }
}

/// File name used when the response carries no usable header.
pub fn fallback_filename(title: &str, format: OutputFormat) -> String {
    format!("{}.{}", safe_filename(title), format.as_str())
}
