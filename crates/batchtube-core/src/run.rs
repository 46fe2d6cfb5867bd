//! Run bookkeeping shared by the session state and the transfer strategies.
//!
//! A run is one user-triggered batch transfer over the current selection.
//! Strategies report what happens to each item as [`RunUpdate`]s and finish
//! with a [`RunOutcome`]; the session state turns those into a
//! [`RunSummary`].

use serde::{Deserialize, Serialize};

use crate::config::{OutputFormat, TransferMode};
use crate::events::ServerEvent;

/// One item scheduled in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedItem {
    /// Item id.
    pub video_id: String,
    /// Source URL, needed by the request/response protocol.
    pub url: String,
    /// Title, used by the backend to name files.
    pub title: String,
}

/// Everything a strategy needs to transfer a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    /// Backend session, present only when extraction returned one.
    pub session_id: Option<String>,
    /// Items in selection order.
    pub items: Vec<PlannedItem>,
    /// Format applied to every item.
    pub format: OutputFormat,
    /// Protocol chosen for the run.
    pub mode: TransferMode,
    /// Server-side save folder (request/response protocol only).
    pub save_dir: Option<String>,
}

impl RunPlan {
    /// Ids of the planned items, in order.
    pub fn video_ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.video_id.clone()).collect()
    }

    /// Number of planned items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is planned.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A per-item status change reported during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunUpdate {
    /// The item became active.
    Downloading {
        /// Item id.
        video_id: String,
    },
    /// Progress of an active item.
    Progress {
        /// Item id.
        video_id: String,
        /// Percent complete.
        percent: Option<f64>,
        /// Transfer rate label.
        speed: Option<String>,
    },
    /// The item entered post-processing.
    Merging {
        /// Item id.
        video_id: String,
    },
    /// The item finished.
    Complete {
        /// Item id.
        video_id: String,
        /// Where the result went, when known.
        note: Option<String>,
    },
    /// The item failed.
    Error {
        /// Item id.
        video_id: String,
        /// Failure reason.
        message: String,
    },
}

impl RunUpdate {
    /// Translate a pushed event. `all_complete` has no item counterpart.
    pub fn from_event(event: ServerEvent) -> Option<Self> {
        match event {
            ServerEvent::Downloading { video_id, .. } => Some(Self::Downloading { video_id }),
            ServerEvent::Progress {
                video_id,
                percent,
                speed,
            } => Some(Self::Progress {
                video_id,
                percent,
                speed,
            }),
            ServerEvent::Merging { video_id } => Some(Self::Merging { video_id }),
            ServerEvent::Complete { video_id, .. } => Some(Self::Complete {
                video_id,
                note: None,
            }),
            ServerEvent::Error { video_id, message } => Some(Self::Error {
                video_id,
                message: message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Download failed".to_string()),
            }),
            ServerEvent::AllComplete => None,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every planned item was attempted.
    Finished,
    /// The push subscription failed before the run finished.
    ConnectionLost(String),
}

/// Tallies reported once a run ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Items in the run.
    pub total: usize,
    /// Items that completed.
    pub completed: usize,
    /// Items that failed.
    pub failed: usize,
    /// Items left unresolved by a lost connection.
    pub interrupted: usize,
    /// How the run ended.
    pub outcome: RunOutcome,
}

impl RunSummary {
    /// Status line shown once the run ends.
    pub fn message(&self) -> String {
        let tally = format!("{} downloaded, {} failed.", self.completed, self.failed);
        match &self.outcome {
            RunOutcome::Finished => format!("Done! {tally}"),
            RunOutcome::ConnectionLost(reason) => {
                let mut msg = format!("Connection lost: {reason}. {tally}");
                if self.interrupted > 0 {
                    msg.push_str(&format!(" {} unfinished.", self.interrupted));
                }
                msg
            }
        }
    }

    /// Whether anything can be retrieved in bulk.
    pub const fn has_completions(&self) -> bool {
        self.completed > 0
    }
}
