//! Toast notifications.
//!
//! Every run ends with a toast summarizing the outcome. A lost or refused
//! subscription shows as an error toast.

use std::sync::atomic::{AtomicU64, Ordering};

use batchtube_core::{RunOutcome, RunSummary};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Everything went fine.
    Success,
    /// Partial failure.
    Warning,
    /// The operation failed.
    Error,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Unique id.
    pub id: u64,
    /// Severity.
    pub kind: NotificationKind,
    /// Text.
    pub message: String,
    /// Auto-dismiss delay; `None` keeps it until dismissed.
    pub duration_ms: Option<u32>,
}

impl Notification {
    /// Create a notification with a fresh id.
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.into(),
            duration_ms: Some(match kind {
                NotificationKind::Error => 8000,
                _ => 5000,
            }),
        }
    }

    /// Toast summarizing a finished run.
    pub fn for_run(summary: &RunSummary) -> Self {
        let kind = match summary.outcome {
            RunOutcome::ConnectionLost(_) => NotificationKind::Error,
            RunOutcome::Finished if summary.failed > 0 => NotificationKind::Warning,
            RunOutcome::Finished => NotificationKind::Success,
        };
        Self::new(kind, summary.message())
    }
}

/// Notification list shared through context.
#[derive(Clone, Copy)]
pub struct NotificationContext {
    notifications: RwSignal<Vec<Notification>>,
}

impl NotificationContext {
    fn new() -> Self {
        Self {
            notifications: RwSignal::new(Vec::new()),
        }
    }

    /// Show a notification.
    pub fn push(&self, notification: Notification) {
        let id = notification.id;
        let duration_ms = notification.duration_ms;
        self.notifications.update(|list| list.push(notification));

        if let Some(duration) = duration_ms {
            let ctx = *self;
            spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(duration).await;
                ctx.dismiss(id);
            });
        }
    }

    /// Remove a notification.
    pub fn dismiss(&self, id: u64) {
        self.notifications.update(|list| list.retain(|n| n.id != id));
    }
}

/// Provides [`NotificationContext`] to `children` and renders the stack.
#[component]
pub fn NotificationProvider(children: Children) -> impl IntoView {
    let ctx = NotificationContext::new();
    provide_context(ctx);

    view! {
        {children()}
        <div class="toast-container">
            <For
                each=move || ctx.notifications.get()
                key=|n| n.id
                children=move |n| {
                    let id = n.id;
                    view! {
                        <div class=format!("toast toast-{}", n.kind) role="alert" aria-live="polite">
                            <div class="toast-message">{n.message}</div>
                            <button
                                class="toast-dismiss"
                                aria-label="Dismiss notification"
                                on:click=move |_| ctx.dismiss(id)
                            >
                                "×"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}

/// Access the notification context.
///
/// # Panics
/// Panics if called outside of a `NotificationProvider`.
pub fn use_notifications() -> NotificationContext {
    expect_context::<NotificationContext>()
}
