//! Canonical names for records appended to the agent event store.
//!
//! Agents tail the store (or call `get_recent_events`) and key off these
//! names, so they are part of the wire contract and must not change.
//!
//! ## Groups
//!
//! - `lifecycle` - callbacks from the windowing host
//! - `audit` - outcomes of agent requests that touch windows or input

/// Host lifecycle events.
pub mod lifecycle {
    /// A window was mapped by the host.
    ///
    /// Payload: `{ window_id: u64, name: String }` (name redacted when hidden).
    pub const CLIENT_NEW: &str = "client_new";

    /// A window was destroyed by the host.
    ///
    /// Payload: `{ window_id: u64, name: String }` (name redacted when hidden).
    pub const CLIENT_KILLED: &str = "client_killed";

    /// Input focus moved.
    ///
    /// Payload: `{ window_id: u64, name: String }` or `null` when nothing is focused.
    pub const FOCUS_CHANGE: &str = "focus_change";

    /// The active layout of a group changed.
    ///
    /// Payload: `{ layout: String, group: String }`
    pub const LAYOUT_CHANGE: &str = "layout_change";
}

/// Audit events for agent requests.
pub mod audit {
    /// Agent metadata was attached to a window.
    ///
    /// Payload: `{ window_id: u64, metadata: Object }`
    pub const AGENT_METADATA_SET: &str = "agent_metadata_set";

    /// Text passed every guard and was handed to the host for injection.
    ///
    /// Payload: `{ window_id: u64, length: usize }`
    pub const AGENT_INPUT: &str = "agent_input";

    /// A request was refused by the security policy.
    ///
    /// Payload: `{ method: String, window_id: u64 | null, reason: String }`
    pub const SECURITY_VIOLATION: &str = "security_violation";

    /// An agent signed off on a window's task; the window may now close.
    ///
    /// Payload: `{ window_id: u64 }`
    pub const VERIFICATION_COMPLETE: &str = "ralph_wiggin_complete";

    /// An agent asked to keep a window alive for another iteration.
    ///
    /// Payload: `{ window_id: u64 }`
    pub const VERIFICATION_RETRY: &str = "ralph_wiggin_retry";

    /// The host asked to close a window and the completion gate vetoed it.
    ///
    /// Payload: `{ window_id: u64 }`
    pub const CLOSE_VETOED: &str = "close_vetoed";
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const ALL: [&str; 10] = [
        lifecycle::CLIENT_NEW,
        lifecycle::CLIENT_KILLED,
        lifecycle::FOCUS_CHANGE,
        lifecycle::LAYOUT_CHANGE,
        audit::AGENT_METADATA_SET,
        audit::AGENT_INPUT,
        audit::SECURITY_VIOLATION,
        audit::VERIFICATION_COMPLETE,
        audit::VERIFICATION_RETRY,
        audit::CLOSE_VETOED,
    ];

    #[test]
    fn test_event_names_are_unique() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
    }

    #[test]
    fn test_event_names_are_snake_case() {
        for event in ALL {
            assert!(
                event.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "Event '{event}' should be snake_case"
            );
        }
    }
}
