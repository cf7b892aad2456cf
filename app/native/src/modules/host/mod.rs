//! Windowing host seam.
//!
//! The bridge never talks to a display server directly. Everything it needs
//! from the windowing environment goes through [`WindowHost`]: enumerate
//! windows, read and write per-window agent metadata, focus, type, capture,
//! re-run the layout and subscribe to lifecycle events.
//!
//! Windows are referenced by id only. Callers get owned [`WindowSnapshot`]s
//! and never hold on to host-side objects between calls.

mod virtual_host;

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;
pub use virtual_host::VirtualHost;

use super::WindowId;
use super::layout::{FocusDirection, Layout};
use super::security::WindowIdentity;

/// Per-window agent metadata (`agent_id`, `confidence`, `status`, `slot`, ...).
pub type Metadata = Map<String, Value>;

/// Errors raised by host operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Window {0} not found")]
    WindowNotFound(WindowId),

    #[error("Window {0} does not support agent metadata")]
    MetadataUnsupported(WindowId),

    #[error("{0}")]
    Operation(String),
}

/// Point-in-time view of a window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub name: String,
    pub classes: Vec<String>,
    pub group: Option<String>,
    /// `None` when the window does not support agent metadata.
    pub metadata: Option<Metadata>,
}

impl WindowSnapshot {
    /// Slot named in the window's agent metadata.
    #[must_use]
    pub fn slot(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("slot")?.as_str()
    }
}

impl WindowIdentity for WindowSnapshot {
    fn window_id(&self) -> WindowId { self.id }

    fn window_classes(&self) -> &[String] { &self.classes }

    fn window_title(&self) -> &str { &self.name }
}

/// Summary of a group (workspace).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub name: String,
    pub label: String,
    pub layout: String,
    pub windows: Vec<WindowId>,
}

/// Lifecycle notifications pushed by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    WindowCreated(WindowSnapshot),
    WindowDestroyed(WindowSnapshot),
    /// Focus moved to a window, or away from every window.
    FocusChanged(Option<WindowSnapshot>),
    LayoutChanged { layout: String, group: String },
}

/// Receiving end registered with [`WindowHost::subscribe`].
pub type EventSink = mpsc::UnboundedSender<HostEvent>;

/// Decides whether a close request may be honored.
pub trait CloseGate {
    fn is_close_allowed(&self, id: WindowId) -> bool;
}

/// Verbs the bridge uses to drive the windowing environment.
///
/// Mutating verbs take `&mut self`; the bridge serializes every call behind
/// a single lock, so implementations need not be reentrant.
pub trait WindowHost: Send {
    /// Every managed window, in id order.
    fn windows(&self) -> Vec<WindowSnapshot>;

    fn window(&self, id: WindowId) -> Option<WindowSnapshot>;

    /// The window that currently has input focus.
    fn focused(&self) -> Option<WindowSnapshot>;

    /// Replace a window's agent metadata.
    ///
    /// # Errors
    ///
    /// Fails when the window is absent or does not support metadata.
    fn set_metadata(&mut self, id: WindowId, metadata: Metadata) -> Result<(), HostError>;

    /// A window's agent metadata; empty when it does not support any.
    ///
    /// # Errors
    ///
    /// Fails when the window is absent.
    fn metadata(&self, id: WindowId) -> Result<Metadata, HostError>;

    /// Set the `status` key of a window's agent metadata.
    ///
    /// # Errors
    ///
    /// Fails when the window is absent or does not support metadata.
    fn update_metadata_status(&mut self, id: WindowId, status: &str) -> Result<(), HostError>;

    /// # Errors
    ///
    /// Fails when the window is absent.
    fn focus(&mut self, id: WindowId) -> Result<(), HostError>;

    /// Move focus through the current group's client order, wrapping at
    /// either end. Returns the newly focused window, if the group has any.
    fn cycle_focus(&mut self, direction: FocusDirection) -> Option<WindowId>;

    /// Deliver text as keyboard input to a window.
    ///
    /// # Errors
    ///
    /// Fails when the window is absent.
    fn type_text(&mut self, id: WindowId, text: &str) -> Result<(), HostError>;

    /// Capture a window and return the image path.
    ///
    /// # Errors
    ///
    /// Fails when the window is absent or the capture cannot be written.
    fn screenshot(&mut self, id: WindowId) -> Result<PathBuf, HostError>;

    fn groups(&self) -> Vec<GroupInfo>;

    /// Name of the group on the current screen.
    fn current_group(&self) -> String;

    fn current_layout(&self) -> &dyn Layout;

    fn current_layout_mut(&mut self) -> &mut dyn Layout;

    /// Re-run the current group's layout and apply the placements.
    fn relayout(&mut self);

    /// Redraw the current layout's overlays.
    fn render_overlay(&mut self);

    /// Kill a window unconditionally.
    ///
    /// # Errors
    ///
    /// Fails when the window is absent.
    fn close(&mut self, id: WindowId) -> Result<(), HostError>;

    /// Register the sink that receives lifecycle events.
    fn subscribe(&mut self, sink: EventSink);
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn snapshot(metadata: Option<Value>) -> WindowSnapshot {
        WindowSnapshot {
            id: 1,
            name: "Terminal".to_string(),
            classes: vec!["kitty".to_string()],
            group: Some("a".to_string()),
            metadata: metadata.and_then(|m| m.as_object().cloned()),
        }
    }

    #[test]
    fn test_slot_from_metadata() {
        assert_eq!(snapshot(Some(json!({"slot": "chat"}))).slot(), Some("chat"));
        assert_eq!(snapshot(Some(json!({"slot": 3}))).slot(), None);
        assert_eq!(snapshot(Some(json!({}))).slot(), None);
        assert_eq!(snapshot(None).slot(), None);
    }

    #[test]
    fn test_identity() {
        let window = snapshot(None);
        assert_eq!(window.window_id(), 1);
        assert_eq!(window.window_classes(), ["kitty"]);
        assert_eq!(window.window_title(), "Terminal");
    }

    #[test]
    fn test_host_error_messages() {
        assert_eq!(HostError::WindowNotFound(5).to_string(), "Window 5 not found");
        assert_eq!(
            HostError::MetadataUnsupported(5).to_string(),
            "Window 5 does not support agent metadata"
        );
    }
}
