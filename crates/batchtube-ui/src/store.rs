//! Reactive home of the session state.

use batchtube_core::{SessionState, SessionStore};
use leptos::prelude::*;

/// [`SessionStore`] backed by a Leptos signal.
///
/// Every update notifies subscribers once the write guard drops, which is
/// what re-projects the page.
#[derive(Debug, Clone, Copy)]
pub struct SignalStore(RwSignal<SessionState>);

impl SignalStore {
    /// Wrap an existing signal.
    pub const fn new(signal: RwSignal<SessionState>) -> Self {
        Self(signal)
    }
}

impl SessionStore for SignalStore {
    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&*self.0.read_untracked())
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut *self.0.write())
    }
}
