//! Seams between the controller and the outside world.
//!
//! [`Backend`] is the remote download service; [`SessionStore`] is wherever
//! the [`SessionState`] lives. The browser client implements both on top of
//! `fetch`/`EventSource` and a reactive signal, tests use in-memory fakes.

use std::cell::RefCell;
use std::rc::Rc;

use futures::stream::LocalBoxStream;

use crate::api::{DownloadOutcome, DownloadRequest};
use crate::config::OutputFormat;
use crate::error::Result;
use crate::playlist::Playlist;
use crate::state::SessionState;

/// Raw `data:` payloads of a push subscription.
///
/// An `Err` item is a transport failure and ends the subscription. Dropping
/// the stream closes it.
pub type EventStream = LocalBoxStream<'static, Result<String>>;

/// Remote extraction and download service.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Extract the items of a playlist URL.
    async fn extract(&self, url: &str) -> Result<Playlist>;

    /// Download one item with the request/response protocol.
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome>;

    /// Open the push subscription for a run.
    fn subscribe(
        &self,
        session_id: &str,
        video_ids: &[String],
        format: OutputFormat,
    ) -> Result<EventStream>;

    /// Ask the backend to drop a session's files.
    ///
    /// Fire-and-forget: implementations swallow failures.
    fn release_session(&self, session_id: &str);
}

/// Owner of the session state.
///
/// Access is scoped to a closure so no borrow can outlive a suspension point.
pub trait SessionStore {
    /// Read the state.
    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R;

    /// Mutate the state.
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R;
}

impl SessionStore for RefCell<SessionState> {
    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.borrow())
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

impl<S: SessionStore> SessionStore for Rc<S> {
    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        S::read(self, f)
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        S::update(self, f)
    }
}
