//! Session state for the playlist download client.
//!
//! All mutable client state lives in [`SessionState`] and changes only
//! through its operations. Operations naming an id that is not part of the
//! current playlist are ignored.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{OutputFormat, TransferMode};
use crate::playlist::{Item, Playlist};
use crate::run::{PlannedItem, RunOutcome, RunPlan, RunSummary, RunUpdate};

/// Which screen the client is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for a playlist URL.
    #[default]
    Input,
    /// Extraction request in flight.
    Extracting,
    /// A playlist is loaded.
    Playlist,
}

/// Lifecycle of one item.
///
/// Items move forward only: `Idle → Queued → Downloading → Merging →
/// Complete | Error`. `Interrupted` marks items a lost connection left
/// unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Not part of any run yet.
    #[default]
    Idle,
    /// Scheduled in the current run.
    Queued,
    /// Transferring.
    Downloading,
    /// Post-processing on the backend.
    Merging,
    /// Finished.
    Complete,
    /// Failed.
    Error,
    /// Outcome unknown after the subscription was lost.
    Interrupted,
}

impl ItemStatus {
    const fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Queued => 1,
            Self::Downloading => 2,
            Self::Merging => 3,
            Self::Complete | Self::Error | Self::Interrupted => 4,
        }
    }

    /// Whether no further transitions are accepted within a run.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::Interrupted)
    }

    /// Whether moving to `next` keeps the per-item sequence monotonic.
    pub const fn can_advance_to(self, next: Self) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }

    /// CSS-friendly name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Queued => "queued",
            Self::Downloading => "downloading",
            Self::Merging => "merging",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Interrupted => "interrupted",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Ready"),
            Self::Queued => write!(f, "Queued"),
            Self::Downloading => write!(f, "Downloading"),
            Self::Merging => write!(f, "Processing"),
            Self::Complete => write!(f, "Done"),
            Self::Error => write!(f, "Failed"),
            Self::Interrupted => write!(f, "Connection lost"),
        }
    }
}

/// Progress of one item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemProgress {
    /// Current status.
    pub status: ItemStatus,
    /// Percent complete, 0-100.
    pub percent: f64,
    /// Transfer rate label.
    pub speed: Option<String>,
    /// Failure reason when `status` is `Error`.
    pub error: Option<String>,
    /// Where the finished file went, when known.
    pub note: Option<String>,
}

/// In-memory state of one client session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    phase: Phase,
    playlist: Option<Playlist>,
    selected: HashSet<String>,
    completed: HashSet<String>,
    failed: HashSet<String>,
    progress: HashMap<String, ItemProgress>,
    format: OutputFormat,
    busy: bool,
    run_ids: Vec<String>,
    input_error: Option<String>,
    status_message: Option<String>,
    last_summary: Option<RunSummary>,
}

impl SessionState {
    /// Empty state with a preselected format.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Extraction
    // -------------------------------------------------------------------------

    /// Mark an extraction request as in flight.
    pub fn begin_extraction(&mut self) {
        self.phase = Phase::Extracting;
        self.input_error = None;
    }

    /// Return to the input view with an inline error.
    pub fn fail_extraction(&mut self, message: impl Into<String>) {
        self.phase = Phase::Input;
        self.input_error = Some(message.into());
    }

    /// Show a validation error without leaving the input view.
    pub fn set_input_error(&mut self, message: impl Into<String>) {
        self.input_error = Some(message.into());
    }

    /// Load a playlist, replacing any previous one.
    ///
    /// Every item starts selected; completion, error and progress records are
    /// cleared.
    pub fn set_playlist(&mut self, playlist: Playlist) {
        info!(
            "Loaded playlist '{}' with {} items",
            playlist.title,
            playlist.len()
        );
        self.selected = playlist.items.iter().map(|i| i.video_id.clone()).collect();
        self.completed.clear();
        self.failed.clear();
        self.progress.clear();
        self.run_ids.clear();
        self.busy = false;
        self.input_error = None;
        self.status_message = None;
        self.last_summary = None;
        self.playlist = Some(playlist);
        self.phase = Phase::Playlist;
    }

    /// Drop everything and return to the input view.
    ///
    /// Returns the released playlist's backend session, if it had one.
    pub fn reset(&mut self) -> Option<String> {
        let session_id = self.session_id().map(str::to_string);
        *self = Self::new(self.format);
        debug!("Session state reset");
        session_id
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    fn knows(&self, video_id: &str) -> bool {
        let known = self.playlist.as_ref().is_some_and(|p| p.contains(video_id));
        if !known {
            debug!("Ignoring operation for unknown item {video_id}");
        }
        known
    }

    /// Flip membership of `video_id` in the selection.
    ///
    /// Returns whether anything changed.
    pub fn toggle_selected(&mut self, video_id: &str) -> bool {
        if !self.knows(video_id) {
            return false;
        }
        if !self.selected.remove(video_id) {
            self.selected.insert(video_id.to_string());
        }
        true
    }

    /// Select every item, or none.
    pub fn set_all_selected(&mut self, selected: bool) {
        self.selected = if selected {
            self.items().iter().map(|i| i.video_id.clone()).collect()
        } else {
            HashSet::new()
        };
    }

    /// Select all unless everything is already selected, in which case clear.
    pub fn toggle_all(&mut self) {
        let select = !self.all_selected();
        self.set_all_selected(select);
    }

    /// Choose the output format for the next run.
    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    // -------------------------------------------------------------------------
    // Runs
    // -------------------------------------------------------------------------

    /// Start a run over the current selection.
    ///
    /// Returns `None` when a run is already in flight or nothing is selected.
    pub fn begin_run(&mut self, mode: TransferMode, save_dir: Option<&str>) -> Option<RunPlan> {
        // One run at a time in both transfer modes.
        if self.busy || self.selected.is_empty() {
            return None;
        }
        let playlist = self.playlist.as_ref()?;
        let items: Vec<PlannedItem> = playlist
            .items
            .iter()
            .filter(|i| self.selected.contains(&i.video_id))
            .map(|i| PlannedItem {
                video_id: i.video_id.clone(),
                url: i.url.clone(),
                title: i.title.clone(),
            })
            .collect();
        let plan = RunPlan {
            session_id: playlist.session_id.clone(),
            items,
            format: self.format,
            mode,
            save_dir: save_dir.map(str::to_string),
        };

        self.run_ids = plan.video_ids();
        for id in &self.run_ids {
            self.completed.remove(id);
            self.failed.remove(id);
            self.progress.insert(
                id.clone(),
                ItemProgress {
                    status: ItemStatus::Queued,
                    ..ItemProgress::default()
                },
            );
        }
        self.busy = true;
        self.status_message = None;
        self.last_summary = None;
        info!(
            "Starting {} run of {} items as {}",
            mode,
            plan.len(),
            plan.format.as_str()
        );
        Some(plan)
    }

    fn advance(&mut self, video_id: &str, next: ItemStatus) -> Option<&mut ItemProgress> {
        let entry = self.progress.entry(video_id.to_string()).or_default();
        if entry.status.can_advance_to(next) {
            entry.status = next;
            Some(entry)
        } else {
            debug!(
                "Ignoring {} -> {} for item {video_id}",
                entry.status.as_str(),
                next.as_str()
            );
            None
        }
    }

    /// Record that an item finished.
    pub fn record_complete(&mut self, video_id: &str, note: Option<String>) {
        if !self.knows(video_id) || self.failed.contains(video_id) {
            return;
        }
        if let Some(entry) = self.advance(video_id, ItemStatus::Complete) {
            entry.percent = 100.0;
            entry.speed = None;
            entry.note = note;
            self.completed.insert(video_id.to_string());
        }
    }

    /// Record that an item failed.
    pub fn record_error(&mut self, video_id: &str, message: impl Into<String>) {
        if !self.knows(video_id) || self.completed.contains(video_id) {
            return;
        }
        if let Some(entry) = self.advance(video_id, ItemStatus::Error) {
            entry.speed = None;
            entry.error = Some(message.into());
            self.failed.insert(video_id.to_string());
        }
    }

    /// Apply one status change reported by a transfer strategy.
    pub fn apply(&mut self, update: RunUpdate) {
        match update {
            RunUpdate::Downloading { video_id } => {
                if self.knows(&video_id) {
                    self.advance(&video_id, ItemStatus::Downloading);
                }
            }
            RunUpdate::Progress {
                video_id,
                percent,
                speed,
            } => {
                if self.knows(&video_id)
                    && let Some(entry) = self.advance(&video_id, ItemStatus::Downloading)
                {
                    if let Some(p) = percent {
                        entry.percent = p;
                    }
                    if speed.is_some() {
                        entry.speed = speed;
                    }
                }
            }
            RunUpdate::Merging { video_id } => {
                if self.knows(&video_id)
                    && let Some(entry) = self.advance(&video_id, ItemStatus::Merging)
                {
                    entry.percent = 100.0;
                    entry.speed = None;
                }
            }
            RunUpdate::Complete { video_id, note } => self.record_complete(&video_id, note),
            RunUpdate::Error { video_id, message } => self.record_error(&video_id, message),
        }
    }

    /// End the current run and compute its summary.
    ///
    /// After a lost connection, run items that never resolved are marked
    /// [`ItemStatus::Interrupted`]; they join neither the completion nor the
    /// error set.
    pub fn finish_run(&mut self, outcome: RunOutcome) -> RunSummary {
        let mut interrupted = 0;
        if matches!(outcome, RunOutcome::ConnectionLost(_)) {
            for id in &self.run_ids {
                if let Some(entry) = self.progress.get_mut(id)
                    && !entry.status.is_terminal()
                {
                    entry.status = ItemStatus::Interrupted;
                    entry.speed = None;
                    interrupted += 1;
                }
            }
        }
        let (completed, failed) = self.run_tally();
        let summary = RunSummary {
            total: self.run_ids.len(),
            completed,
            failed,
            interrupted,
            outcome,
        };
        self.busy = false;
        self.status_message = Some(summary.message());
        self.last_summary = Some(summary.clone());
        info!("{}", summary.message());
        summary
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Loaded playlist.
    pub const fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    /// Items of the loaded playlist, in extraction order.
    pub fn items(&self) -> &[Item] {
        self.playlist.as_ref().map_or(&[], |p| p.items.as_slice())
    }

    /// Backend session of the loaded playlist.
    pub fn session_id(&self) -> Option<&str> {
        self.playlist.as_ref().and_then(|p| p.session_id.as_deref())
    }

    /// Whether an item is selected.
    pub fn is_selected(&self, video_id: &str) -> bool {
        self.selected.contains(video_id)
    }

    /// Number of selected items.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in playlist order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.items()
            .iter()
            .filter(|i| self.selected.contains(&i.video_id))
            .map(|i| i.video_id.clone())
            .collect()
    }

    /// Whether every item is selected (false for an empty playlist).
    pub fn all_selected(&self) -> bool {
        let total = self.items().len();
        total > 0 && self.selected.len() == total
    }

    /// Whether an item completed in its latest run.
    pub fn is_completed(&self, video_id: &str) -> bool {
        self.completed.contains(video_id)
    }

    /// Whether an item failed in its latest run.
    pub fn is_failed(&self, video_id: &str) -> bool {
        self.failed.contains(video_id)
    }

    /// Number of completed items.
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Number of failed items.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Progress of an item (idle if it never ran).
    pub fn item_progress(&self, video_id: &str) -> ItemProgress {
        self.progress.get(video_id).cloned().unwrap_or_default()
    }

    /// Whether a run is in flight.
    pub const fn busy(&self) -> bool {
        self.busy
    }

    /// Format for the next run.
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Inline error under the URL input.
    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    /// Status line from the last finished run.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Summary of the last finished run.
    pub const fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Ids of the current (or last) run.
    pub fn run_ids(&self) -> &[String] {
        &self.run_ids
    }

    /// Completed and failed counts within the current (or last) run.
    pub fn run_tally(&self) -> (usize, usize) {
        self.run_ids.iter().fold((0, 0), |(done, failed), id| {
            (
                done + usize::from(self.completed.contains(id)),
                failed + usize::from(self.failed.contains(id)),
            )
        })
    }

    /// Fraction of the run resolved, `(completed + failed) / total`.
    pub fn aggregate_progress(&self) -> Option<f64> {
        if self.run_ids.is_empty() {
            return None;
        }
        let (done, failed) = self.run_tally();
        Some((done + failed) as f64 / self.run_ids.len() as f64)
    }
}
