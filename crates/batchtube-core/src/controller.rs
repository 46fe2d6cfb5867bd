//! User-facing flows of the download client.
//!
//! The controller glues the [`SessionState`] (behind a [`SessionStore`]) to a
//! [`Backend`] and picks the transfer strategy for the configured protocol.
//! Every flow leaves the state consistent so the page can be re-projected
//! with [`Controller::view`] right after.

use tracing::{debug, info, warn};
use url::Url;

use crate::api::{Endpoints, validate_source_url};
use crate::backend::{Backend, SessionStore};
use crate::config::{ClientConfig, OutputFormat, TransferMode};
use crate::error::{Error, Result};
use crate::run::{RunSummary, RunUpdate};
use crate::state::SessionState;
use crate::transfer::{EventStreamTransfer, SequentialTransfer, TransferStrategy};
use crate::view::{PageView, file_link, project, zip_link};

/// Message shown when extraction returns no items.
pub const EMPTY_PLAYLIST: &str = "No videos found in this playlist";

/// Drives a session against a backend.
#[derive(Debug)]
pub struct Controller<B, S> {
    backend: B,
    store: S,
    endpoints: Endpoints,
    mode: TransferMode,
    save_dir: Option<String>,
}

impl<B: Backend, S: SessionStore> Controller<B, S> {
    /// Create a controller from the client configuration.
    pub fn new(backend: B, store: S, endpoints: Endpoints, config: &ClientConfig) -> Self {
        Self {
            backend,
            store,
            endpoints,
            mode: config.transfer_mode,
            save_dir: config.effective_save_dir().map(str::to_string),
        }
    }

    /// The backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The state store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Endpoint builder.
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Project the current state.
    pub fn view(&self) -> PageView {
        self.store.read(|s| project(s, self.mode, &self.endpoints))
    }

    fn selection_locked(&self, state: &SessionState) -> bool {
        state.busy() && self.mode.locks_selection_while_busy()
    }

    /// Validate a playlist URL and load its items.
    ///
    /// Invalid input never reaches the backend. On failure the input view
    /// shows the error and the error is returned as well.
    pub async fn submit_url(&self, raw: &str) -> Result<()> {
        if self.store.read(SessionState::busy) {
            debug!("Ignoring URL submission during a run");
            return Ok(());
        }
        let url = match validate_source_url(raw) {
            Ok(url) => url,
            Err(e) => {
                self.store.update(|s| s.set_input_error(e.user_message()));
                return Err(e);
            }
        };

        self.store.update(SessionState::begin_extraction);
        info!("Extracting playlist from {}", url);

        let playlist = match self.backend.extract(&url).await {
            Ok(playlist) if playlist.is_empty() => {
                let e = Error::Extraction(EMPTY_PLAYLIST.to_string());
                self.store.update(|s| s.fail_extraction(e.user_message()));
                return Err(e);
            }
            Ok(playlist) => playlist,
            Err(e) => {
                warn!("Extraction failed: {}", e);
                self.store.update(|s| s.fail_extraction(e.user_message()));
                return Err(e);
            }
        };

        let replaced = self.store.update(|s| {
            let previous = s.session_id().map(str::to_string);
            s.set_playlist(playlist);
            previous.filter(|prev| s.session_id() != Some(prev.as_str()))
        });
        if let Some(session_id) = replaced {
            self.release(&session_id);
        }
        Ok(())
    }

    /// Flip one item's selection. Returns whether anything changed.
    pub fn toggle(&self, video_id: &str) -> bool {
        self.store.update(|s| {
            if self.selection_locked(s) {
                debug!("Selection is locked while downloading");
                return false;
            }
            s.toggle_selected(video_id)
        })
    }

    /// Select everything, or clear the selection when everything is selected.
    pub fn toggle_all(&self) -> bool {
        self.store.update(|s| {
            if self.selection_locked(s) || s.items().is_empty() {
                return false;
            }
            s.toggle_all();
            true
        })
    }

    /// Choose the format for the next run. Ignored during a run.
    pub fn set_format(&self, format: OutputFormat) -> bool {
        self.store.update(|s| {
            if s.busy() {
                return false;
            }
            s.set_format(format);
            true
        })
    }

    /// Transfer the current selection.
    ///
    /// Returns `None` when a run is already in flight or nothing is selected.
    pub async fn start_run(&self) -> Option<RunSummary> {
        let plan = self
            .store
            .update(|s| s.begin_run(self.mode, self.save_dir.as_deref()))?;

        let mut apply = |update: RunUpdate| self.store.update(|s| s.apply(update));
        let outcome = match plan.mode {
            TransferMode::Sequential => {
                SequentialTransfer::new(&self.backend)
                    .run(&plan, &mut apply)
                    .await
            }
            TransferMode::EventStream => {
                EventStreamTransfer::new(&self.backend)
                    .run(&plan, &mut apply)
                    .await
            }
        };

        Some(self.store.update(|s| s.finish_run(outcome)))
    }

    /// Drop the playlist and go back to the URL input.
    ///
    /// Releases the backend session, if any. Ignored during a run.
    pub fn start_new_playlist(&self) -> bool {
        if self.store.read(SessionState::busy) {
            debug!("Ignoring new playlist request during a run");
            return false;
        }
        if let Some(session_id) = self.store.update(SessionState::reset) {
            self.release(&session_id);
        }
        true
    }

    fn release(&self, session_id: &str) {
        debug!("Releasing session {}", session_id);
        self.backend.release_session(session_id);
    }

    /// Retrieval link for a completed item.
    pub fn file_url(&self, video_id: &str) -> Option<Url> {
        self.store
            .read(|s| file_link(s, self.mode, &self.endpoints, video_id))
    }

    /// Bulk retrieval link, once a run completed at least one item.
    pub fn zip_url(&self) -> Option<Url> {
        self.store.read(|s| zip_link(s, self.mode, &self.endpoints))
    }
}
