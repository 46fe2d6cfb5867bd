//! Transfer strategies for a run.
//!
//! Two protocols move a run's items:
//! - [`SequentialTransfer`]: one request per item, awaited strictly in order
//! - [`EventStreamTransfer`]: one push subscription for the whole run
//!
//! Both report per-item changes as [`RunUpdate`]s through a callback and
//! return how the run ended. Neither retries.
//!
//! # Example
//!
//! ```rust,ignore
//! use batchtube_core::transfer::{SequentialTransfer, TransferStrategy};
//!
//! let strategy = SequentialTransfer::new(&backend);
//! let outcome = strategy
//!     .run(&plan, &mut |update| store.update(|s| s.apply(update)))
//!     .await;
//! ```

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::api::DownloadRequest;
use crate::backend::Backend;
use crate::error::Error;
use crate::events::ServerEvent;
use crate::run::{RunOutcome, RunPlan, RunUpdate};

/// Reason reported when the push stream ends before `all_complete`.
pub const STREAM_CLOSED: &str = "the event stream closed unexpectedly";

/// Reason reported when a push run has no backend session.
pub const NO_SESSION: &str = "no download session for this playlist";

/// A protocol that transfers the items of a [`RunPlan`].
#[allow(async_fn_in_trait)]
pub trait TransferStrategy {
    /// Transfer every planned item, reporting progress through `on_update`.
    async fn run(&self, plan: &RunPlan, on_update: &mut dyn FnMut(RunUpdate)) -> RunOutcome;
}

// =============================================================================
// Sequential
// =============================================================================

/// Request/response transfer, one item at a time.
#[derive(Debug)]
pub struct SequentialTransfer<'a, B> {
    backend: &'a B,
}

impl<'a, B: Backend> SequentialTransfer<'a, B> {
    /// Create a strategy over `backend`.
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }
}

impl<B: Backend> TransferStrategy for SequentialTransfer<'_, B> {
    async fn run(&self, plan: &RunPlan, on_update: &mut dyn FnMut(RunUpdate)) -> RunOutcome {
        let total = plan.len();
        for (index, item) in plan.items.iter().enumerate() {
            debug!(
                "Downloading item {}/{}: {}",
                index + 1,
                total,
                item.video_id
            );
            on_update(RunUpdate::Downloading {
                video_id: item.video_id.clone(),
            });

            let request = DownloadRequest {
                url: item.url.clone(),
                fmt: plan.format,
                title: item.title.clone(),
                save_dir: plan.save_dir.clone(),
            };
            // A failed item never stops the run.
            match self.backend.download(&request).await {
                Ok(outcome) => on_update(RunUpdate::Complete {
                    video_id: item.video_id.clone(),
                    note: Some(outcome.note()),
                }),
                Err(e) => {
                    let failure = Error::Download {
                        video_id: item.video_id.clone(),
                        message: e.user_message(),
                    };
                    warn!("{}", failure);
                    on_update(RunUpdate::Error {
                        video_id: item.video_id.clone(),
                        message: failure.user_message(),
                    });
                }
            }
        }
        info!("Sequential run over {} items finished", total);
        RunOutcome::Finished
    }
}

// =============================================================================
// Event stream
// =============================================================================

/// Push-subscription transfer for the whole run.
#[derive(Debug)]
pub struct EventStreamTransfer<'a, B> {
    backend: &'a B,
}

impl<'a, B: Backend> EventStreamTransfer<'a, B> {
    /// Create a strategy over `backend`.
    pub const fn new(backend: &'a B) -> Self {
        Self { backend }
    }
}

impl<B: Backend> TransferStrategy for EventStreamTransfer<'_, B> {
    async fn run(&self, plan: &RunPlan, on_update: &mut dyn FnMut(RunUpdate)) -> RunOutcome {
        let Some(session_id) = plan.session_id.as_deref() else {
            warn!("Cannot open event stream: {}", NO_SESSION);
            return RunOutcome::ConnectionLost(NO_SESSION.to_string());
        };

        let video_ids = plan.video_ids();
        let mut stream = match self.backend.subscribe(session_id, &video_ids, plan.format) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to open event stream: {}", e);
                return RunOutcome::ConnectionLost(e.user_message());
            }
        };
        info!(
            "Subscribed to session {} for {} items",
            session_id,
            video_ids.len()
        );

        while let Some(message) = stream.next().await {
            let data = match message {
                Ok(data) => data,
                Err(e) => {
                    warn!("Event stream failed: {}", e);
                    return RunOutcome::ConnectionLost(e.user_message());
                }
            };
            let event = match ServerEvent::from_json(&data) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Skipping event: {}", e);
                    continue;
                }
            };
            if event.is_terminal() {
                info!("Backend reported all items complete");
                return RunOutcome::Finished;
            }
            if event
                .video_id()
                .is_some_and(|id| !video_ids.iter().any(|v| v == id))
            {
                debug!("Ignoring event for item outside the run: {:?}", event);
                continue;
            }
            if let Some(update) = RunUpdate::from_event(event) {
                on_update(update);
            }
        }

        warn!("Event stream ended without all_complete");
        RunOutcome::ConnectionLost(STREAM_CLOSED.to_string())
    }
}
