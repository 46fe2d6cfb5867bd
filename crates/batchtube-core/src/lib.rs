//! `Batchtube` Core Library
//!
//! This crate provides the platform-independent half of the `Batchtube`
//! playlist download client:
//! - Session state (playlist, selection, completion and error sets, progress)
//! - A pure view projection of the page
//! - Request/response and event-stream transfer strategies
//! - The controller driving user flows against a [`Backend`]
//! - Client configuration and the backend HTTP contract
//!
//! Nothing here touches browser APIs; the UI crate supplies a [`Backend`]
//! and a [`SessionStore`].
//!
//! # Error Handling
//!
//! Fallible operations return [`Result`]; see the [`error`] module.
//!
//! ```rust,ignore
//! use batchtube_core::{Controller, ClientConfig, Endpoints};
//!
//! let controller = Controller::new(backend, store, endpoints, &config);
//! controller.submit_url("https://www.youtube.com/playlist?list=PL...").await?;
//! let summary = controller.start_run().await;
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod playlist;
pub mod run;
pub mod state;
pub mod transfer;
pub mod view;

#[cfg(test)]
mod test_support;

pub use api::{
    DownloadOutcome, DownloadRequest, Endpoints, ExtractRequest, SavedResponse,
    content_disposition_filename, fallback_filename, safe_filename, validate_source_url,
};
pub use backend::{Backend, EventStream, SessionStore};
pub use config::{ClientConfig, OutputFormat, TransferMode};
pub use controller::{Controller, EMPTY_PLAYLIST};
pub use error::{Error, Result, clean_message};
pub use events::ServerEvent;
pub use playlist::{Item, Playlist, fallback_thumbnail_url, format_duration};
pub use run::{PlannedItem, RunOutcome, RunPlan, RunSummary, RunUpdate};
pub use state::{ItemProgress, ItemStatus, Phase, SessionState};
pub use transfer::{EventStreamTransfer, SequentialTransfer, TransferStrategy};
pub use view::{CardView, ControlsView, PageView, ProgressView, file_link, project, zip_link};
