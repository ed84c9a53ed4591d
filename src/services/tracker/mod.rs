//! WindowTracker service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for keeping the
//! window registry in sync with the X server (the root window's
//! _NET_CLIENT_LIST property plus per-window PropertyNotify events) and
//! emitting WindowEvent(s). It MUST NOT contain any policy about what
//! consumers do with windows (switching, layout, rendering). All
//! protocol round trips go through the DisplayServer seam so the sync
//! logic stays testable without a live X server.

mod atoms;
mod dispatch;
mod display;
mod dry_run;
#[cfg(test)]
mod mock;
mod property;
mod reconcile;
mod registry;
mod tracker;
mod r#trait;

pub use self::r#trait::create_window_tracker;
pub use self::registry::{WindowRecord, WindowRegistry};
