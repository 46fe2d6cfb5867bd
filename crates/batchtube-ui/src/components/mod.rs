//! UI components.

mod card_grid;
mod controls;
mod header;
mod progress_panel;
mod toast;
mod url_form;

pub use card_grid::CardGrid;
pub use controls::Controls;
pub use header::Header;
pub use progress_panel::ProgressPanel;
pub use toast::{
    Notification, NotificationContext, NotificationKind, NotificationProvider, use_notifications,
};
pub use url_form::UrlForm;
