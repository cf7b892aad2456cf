//! Completion gate: keeps a window alive until its agent signs off.
//!
//! An agent that is still iterating on a window's task marks it incomplete;
//! from then on the host must veto close requests for that window until the
//! agent marks it complete. Windows never marked are not gated.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use super::error::BridgeError;
use super::event_log::EventLog;
use crate::events::audit;
use crate::modules::WindowId;
use crate::modules::host::{CloseGate, HostError, WindowHost};

/// Task status written to a window's agent metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    /// The agent wants another pass; closing is vetoed.
    Iterating,
    /// The agent signed off; closing is allowed.
    Complete,
}

impl CompletionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iterating => "iterating",
            Self::Complete => "complete",
        }
    }
}

/// Pending-close entries keyed by window id.
#[derive(Debug, Default)]
pub struct CompletionGate {
    pending: HashMap<WindowId, CompletionStatus>,
}

impl CompletionGate {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Records an agent's verdict on a window.
    ///
    /// Incomplete inserts (or overwrites) a pending entry; complete removes
    /// it. Either way the window's metadata `status` is updated when the
    /// window supports metadata, and an audit record is appended.
    ///
    /// # Errors
    ///
    /// Fails when the window does not exist.
    pub fn mark<H: WindowHost + ?Sized>(
        &mut self,
        host: &mut H,
        log: &EventLog,
        id: WindowId,
        complete: bool,
    ) -> Result<CompletionStatus, BridgeError> {
        if host.window(id).is_none() {
            return Err(BridgeError::WindowNotFound(id));
        }

        let (status, event) = if complete {
            self.pending.remove(&id);
            (CompletionStatus::Complete, audit::VERIFICATION_COMPLETE)
        } else {
            self.pending.insert(id, CompletionStatus::Iterating);
            (CompletionStatus::Iterating, audit::VERIFICATION_RETRY)
        };

        match host.update_metadata_status(id, status.as_str()) {
            Ok(()) | Err(HostError::MetadataUnsupported(_)) => {}
            Err(e) => return Err(e.into()),
        }

        log.append(event, json!({ "window_id": id }));
        tracing::debug!(
            "bridge: window {id} marked {}, {} awaiting verification",
            status.as_str(),
            self.pending_count()
        );
        Ok(status)
    }

    /// Whether the host may honor a close request for the window.
    #[must_use]
    pub fn is_close_allowed(&self, id: WindowId) -> bool { !self.pending.contains_key(&id) }

    /// Drops any entry for a window that no longer exists.
    pub fn forget(&mut self, id: WindowId) { self.pending.remove(&id); }

    /// Number of windows whose close is currently vetoed.
    #[must_use]
    pub fn pending_count(&self) -> usize { self.pending.len() }
}

impl CloseGate for CompletionGate {
    fn is_close_allowed(&self, id: WindowId) -> bool { Self::is_close_allowed(self, id) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::host::VirtualHost;
    use crate::modules::layout::{LayoutStyle, ScreenRect};

    fn host() -> VirtualHost {
        VirtualHost::new(ScreenRect::new(0, 0, 800, 600), &[], LayoutStyle::default())
    }

    #[test]
    fn test_unmarked_window_may_close() {
        let gate = CompletionGate::new();
        assert!(gate.is_close_allowed(42));
    }

    #[test]
    fn test_incomplete_then_complete() {
        let mut host = host();
        let log = EventLog::disabled();
        let id = host.spawn_window("editor", &[]);
        let mut gate = CompletionGate::new();

        assert_eq!(gate.mark(&mut host, &log, id, false), Ok(CompletionStatus::Iterating));
        assert!(!gate.is_close_allowed(id));
        assert_eq!(host.metadata(id).unwrap()["status"], "iterating");

        assert_eq!(gate.mark(&mut host, &log, id, true), Ok(CompletionStatus::Complete));
        assert!(gate.is_close_allowed(id));
        assert_eq!(host.metadata(id).unwrap()["status"], "complete");
    }

    #[test]
    fn test_repeated_incomplete_overwrites() {
        let mut host = host();
        let log = EventLog::disabled();
        let id = host.spawn_window("editor", &[]);
        let mut gate = CompletionGate::new();

        gate.mark(&mut host, &log, id, false).unwrap();
        gate.mark(&mut host, &log, id, false).unwrap();
        assert_eq!(gate.pending_count(), 1);
    }

    #[test]
    fn test_missing_window() {
        let mut host = host();
        let mut gate = CompletionGate::new();
        assert_eq!(
            gate.mark(&mut host, &EventLog::disabled(), 9, false),
            Err(BridgeError::WindowNotFound(9))
        );
        assert_eq!(gate.pending_count(), 0);
    }

    #[test]
    fn test_window_without_metadata_is_still_gated() {
        let mut host = host();
        let id = host.spawn_plain_window("legacy", &[]);
        let mut gate = CompletionGate::new();

        gate.mark(&mut host, &EventLog::disabled(), id, false).unwrap();
        assert!(!gate.is_close_allowed(id));
    }

    #[test]
    fn test_mark_appends_audit_records() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::new(dir.path().join("events.jsonl"));
        let mut host = host();
        let id = host.spawn_window("editor", &[]);
        let mut gate = CompletionGate::new();

        gate.mark(&mut host, &log, id, false).unwrap();
        gate.mark(&mut host, &log, id, true).unwrap();

        let events: Vec<_> = log.recent(10).into_iter().map(|r| r.event).collect();
        assert_eq!(events, [audit::VERIFICATION_RETRY, audit::VERIFICATION_COMPLETE]);
    }

    #[test]
    fn test_forget() {
        let mut host = host();
        let id = host.spawn_window("editor", &[]);
        let mut gate = CompletionGate::new();
        gate.mark(&mut host, &EventLog::disabled(), id, false).unwrap();

        gate.forget(id);
        assert!(gate.is_close_allowed(id));
    }

    #[test]
    fn test_host_honors_veto() {
        let mut host = host();
        let id = host.spawn_window("editor", &[]);
        let mut gate = CompletionGate::new();
        gate.mark(&mut host, &EventLog::disabled(), id, false).unwrap();

        assert_eq!(host.request_close(id, &gate), Ok(false));
        gate.mark(&mut host, &EventLog::disabled(), id, true).unwrap();
        assert_eq!(host.request_close(id, &gate), Ok(true));
    }
}
