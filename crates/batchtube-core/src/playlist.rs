//! Playlist and item types as returned by the extraction endpoint.
//!
//! Items are immutable once received; the session state only ever refers to
//! them by `video_id`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};

/// Base used to derive a thumbnail when the backend supplies none.
pub const FALLBACK_THUMBNAIL_BASE: &str = "https://i.ytimg.com/vi";

/// Image file requested from [`FALLBACK_THUMBNAIL_BASE`].
pub const FALLBACK_THUMBNAIL_FILE: &str = "mqdefault.jpg";

/// Title used when the backend returns an empty playlist title.
pub const UNTITLED_PLAYLIST: &str = "Untitled playlist";

/// One downloadable media entry within an extracted playlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Identifier, unique within a session.
    pub video_id: String,
    /// Display title.
    pub title: String,
    /// Source URL of the media.
    pub url: String,
    /// Thumbnail URL, if the backend found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Pre-formatted duration label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_str: Option<String>,
    /// Uploader / channel name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
}

impl Item {
    /// Duration badge text, preferring the backend's label.
    pub fn duration_label(&self) -> Option<String> {
        self.duration_str
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .or_else(|| self.duration.filter(|&secs| secs > 0).map(format_duration))
    }

    /// Thumbnail to display, falling back to one derived from the id.
    pub fn thumbnail_url(&self) -> String {
        self.thumbnail
            .as_ref()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| fallback_thumbnail_url(&self.video_id))
    }
}

/// Format a duration as `M:SS`, or `H:MM:SS` past one hour.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// Deterministic thumbnail URL for a video id.
///
/// The id is percent-encoded as a single path segment.
pub fn fallback_thumbnail_url(video_id: &str) -> String {
    let Ok(mut url) = Url::parse(FALLBACK_THUMBNAIL_BASE) else {
        return String::new();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(video_id).push(FALLBACK_THUMBNAIL_FILE);
    }
    url.into()
}

/// An extracted playlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    /// Backend session correlating this extraction with later downloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Source playlist identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,
    /// Playlist title.
    #[serde(default)]
    pub title: String,
    /// Items in extraction order.
    #[serde(rename = "videos", default)]
    pub items: Vec<Item>,
}

impl Playlist {
    /// Parse an extraction response body.
    ///
    /// Items without an id are dropped and duplicate ids keep their first
    /// occurrence, so every id in the result is unique.
    pub fn from_json(body: &str) -> Result<Self> {
        let mut playlist: Self = serde_json::from_str(body)
            .map_err(|e| Error::Extraction(format!("malformed playlist response: {e}")))?;
        playlist.normalize();
        Ok(playlist)
    }

    fn normalize(&mut self) {
        let mut seen = HashSet::new();
        let before = self.items.len();
        self.items.retain(|item| {
            if item.video_id.is_empty() {
                return false;
            }
            seen.insert(item.video_id.clone())
        });
        if self.items.len() != before {
            warn!(
                "Dropped {} playlist entries with missing or duplicate ids",
                before - self.items.len()
            );
        }
        if self.title.trim().is_empty() {
            self.title = UNTITLED_PLAYLIST.to_string();
        }
        if self.session_id.as_deref().is_some_and(str::is_empty) {
            self.session_id = None;
        }
        debug!(
            "Normalized playlist '{}' with {} items",
            self.title,
            self.items.len()
        );
    }

    /// Look up an item by id.
    pub fn item(&self, video_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.video_id == video_id)
    }

    /// Whether an item with this id exists.
    pub fn contains(&self, video_id: &str) -> bool {
        self.item(video_id).is_some()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the playlist has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
