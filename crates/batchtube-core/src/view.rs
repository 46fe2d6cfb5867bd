//! Pure projection from [`SessionState`] to what the page shows.
//!
//! [`project`] is re-run after every state transition; the UI never derives
//! labels or enabled flags on its own.

use serde::Serialize;
use url::Url;

use crate::api::Endpoints;
use crate::config::{OutputFormat, TransferMode};
use crate::state::{ItemStatus, Phase, SessionState};

/// Label of the selection toggle when something is left unselected.
pub const SELECT_ALL_LABEL: &str = "Select All";

/// Label of the selection toggle when everything is selected.
pub const DESELECT_ALL_LABEL: &str = "Deselect All";

/// Download button label while a run is in flight.
pub const DOWNLOADING_LABEL: &str = "Downloading...";

/// One item card.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CardView {
    /// Item id, used as the card key.
    pub video_id: String,
    /// Title, untrusted.
    pub title: String,
    /// Uploader, untrusted.
    pub uploader: Option<String>,
    /// Thumbnail to show.
    pub thumbnail_url: String,
    /// Duration badge.
    pub duration: Option<String>,
    /// Whether the item is selected.
    pub selected: bool,
    /// Current status.
    pub status: ItemStatus,
    /// Status text.
    pub status_label: String,
    /// Progress fill, 0-100.
    pub progress_percent: f64,
    /// Transfer rate label.
    pub speed: Option<String>,
    /// Failure reason.
    pub error_message: Option<String>,
    /// Where the result went (request/response protocol).
    pub note: Option<String>,
    /// Direct retrieval link for a completed item.
    pub file_url: Option<String>,
    /// Whether clicking the card toggles its selection.
    pub toggle_enabled: bool,
}

/// Global controls above the card grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlsView {
    /// Selection toggle label.
    pub select_toggle_label: &'static str,
    /// Whether the selection toggle accepts clicks.
    pub select_toggle_enabled: bool,
    /// Download button label.
    pub download_label: String,
    /// Whether the download button is disabled.
    pub download_disabled: bool,
    /// Number of selected items.
    pub selected_count: usize,
    /// Number of items.
    pub total_count: usize,
    /// Chosen format.
    pub format: OutputFormat,
    /// Whether the format picker is locked.
    pub format_locked: bool,
}

/// Aggregate progress of the current run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    /// Resolved fraction, 0.0-1.0.
    pub fraction: f64,
    /// Resolved items.
    pub resolved: usize,
    /// Items in the run.
    pub total: usize,
    /// `resolved / total` text.
    pub label: String,
}

/// Everything the page needs to draw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    /// Current phase.
    pub phase: Phase,
    /// Whether a run is in flight.
    pub busy: bool,
    /// Playlist heading.
    pub playlist_title: Option<String>,
    /// Inline error under the URL input.
    pub input_error: Option<String>,
    /// One card per item, in playlist order.
    pub cards: Vec<CardView>,
    /// Global controls.
    pub controls: ControlsView,
    /// Aggregate progress, shown once a run has started.
    pub progress: Option<ProgressView>,
    /// Summary line of the last run.
    pub status_message: Option<String>,
    /// Bulk retrieval link, shown after a run with completions.
    pub zip_url: Option<String>,
}

/// Label of the selection toggle for a given selection size.
pub fn select_toggle_label(selected: usize, total: usize) -> &'static str {
    if total > 0 && selected == total {
        DESELECT_ALL_LABEL
    } else {
        SELECT_ALL_LABEL
    }
}

/// Label of the download button.
pub fn download_label(selected: usize, busy: bool) -> String {
    if busy {
        DOWNLOADING_LABEL.to_string()
    } else {
        format!("Download {selected} selected")
    }
}

/// Project the session state onto the page.
pub fn project(state: &SessionState, mode: TransferMode, endpoints: &Endpoints) -> PageView {
    let busy = state.busy();
    let selection_locked = busy && mode.locks_selection_while_busy();

    let cards = state
        .items()
        .iter()
        .map(|item| {
            let progress = state.item_progress(&item.video_id);
            let file_url = file_link(state, mode, endpoints, &item.video_id).map(String::from);
            CardView {
                video_id: item.video_id.clone(),
                title: item.title.clone(),
                uploader: item.uploader.clone(),
                thumbnail_url: item.thumbnail_url(),
                duration: item.duration_label(),
                selected: state.is_selected(&item.video_id),
                status: progress.status,
                status_label: status_label(progress.status, progress.percent),
                progress_percent: progress.percent,
                speed: progress.speed,
                error_message: progress.error,
                note: progress.note,
                file_url,
                toggle_enabled: !selection_locked,
            }
        })
        .collect();

    let selected_count = state.selected_count();
    let total_count = state.items().len();
    let controls = ControlsView {
        select_toggle_label: select_toggle_label(selected_count, total_count),
        select_toggle_enabled: total_count > 0 && !selection_locked,
        download_label: download_label(selected_count, busy),
        download_disabled: selected_count == 0 || busy,
        selected_count,
        total_count,
        format: state.format(),
        format_locked: busy,
    };

    let progress = state.aggregate_progress().map(|fraction| {
        let (done, failed) = state.run_tally();
        let total = state.run_ids().len();
        ProgressView {
            fraction,
            resolved: done + failed,
            total,
            label: format!("{} / {total}", done + failed),
        }
    });

    PageView {
        phase: state.phase(),
        busy,
        playlist_title: state.playlist().map(|p| p.title.clone()),
        input_error: state.input_error().map(str::to_string),
        cards,
        controls,
        progress,
        status_message: state.status_message().map(str::to_string),
        zip_url: zip_link(state, mode, endpoints).map(String::from),
    }
}

/// Retrieval link of a completed item, when the backend keeps files.
pub fn file_link(
    state: &SessionState,
    mode: TransferMode,
    endpoints: &Endpoints,
    video_id: &str,
) -> Option<Url> {
    if !mode.serves_files() || state.item_progress(video_id).status != ItemStatus::Complete {
        return None;
    }
    state.session_id().map(|session| endpoints.file(session, video_id))
}

/// Bulk retrieval link, once the last run completed at least one item.
pub fn zip_link(state: &SessionState, mode: TransferMode, endpoints: &Endpoints) -> Option<Url> {
    let any = state.last_summary().is_some_and(|s| s.has_completions());
    if !mode.serves_files() || !any {
        return None;
    }
    state.session_id().map(|session| endpoints.zip(session))
}

fn status_label(status: ItemStatus, percent: f64) -> String {
    match status {
        ItemStatus::Downloading if percent > 0.0 => format!("{percent:.0}%"),
        other => other.to_string(),
    }
}
