//! `Batchtube` UI - Leptos-based browser client.
//!
//! This crate wires the platform-independent controller from
//! `batchtube-core` to the browser: an HTTP and `EventSource` backend, a
//! signal-backed session store, console logging and the page components.

// Component files tend to be large by nature - they contain view logic
#![allow(clippy::too_many_lines)]
// Pass by value suggestions for small types like bool - not always clearer
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod app;
pub mod bootstrap;
pub mod components;
pub mod http_backend;
pub mod logging;
pub mod store;
pub mod theme;

pub use app::App;
