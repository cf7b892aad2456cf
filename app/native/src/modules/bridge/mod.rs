//! Agent bridge: a policy-gated JSON-RPC facade over the windowing host.
//!
//! # Architecture
//!
//! - [`AgentBridge`] owns the host, the completion gate and the event log
//!   behind one `parking_lot::Mutex`. Every request and every host event is
//!   handled while holding it, so event records are appended in the same
//!   order as the state changes they describe.
//! - Requests are dispatched through a name -> handler table built once at
//!   construction (see `handlers`).
//! - Host lifecycle events arrive on an mpsc channel registered with
//!   [`WindowHost::subscribe`] and are drained before and after each request,
//!   and on the server's idle tick.
//! - [`server`] exposes the bridge on a Unix socket, one request per
//!   connection.

mod error;
pub mod event_log;
mod gate;
mod handlers;
pub mod protocol;
pub mod server;

use std::collections::HashMap;

pub use error::{BridgeError, codes};
pub use event_log::{EventLog, EventRecord};
pub use gate::{CompletionGate, CompletionStatus};
use handlers::Handler;
use parking_lot::Mutex;
pub use protocol::{Request, Response, RpcError};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::constants::REDACTED_NAME;
use crate::events::{audit, lifecycle};
use crate::modules::WindowId;
use crate::modules::host::{HostEvent, WindowHost, WindowSnapshot};
use crate::modules::security::SecurityPolicy;

/// Default cap on `get_recent_events`.
pub const DEFAULT_RECENT_EVENTS_LIMIT: usize = 100;

/// State mutated by handlers, guarded by the bridge lock.
#[derive(Debug)]
pub struct BridgeState<H> {
    host: H,
    gate: CompletionGate,
    log: EventLog,
    events: mpsc::UnboundedReceiver<HostEvent>,
}

/// Construction options for [`AgentBridge`].
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    pub policy: SecurityPolicy,
    pub event_log: EventLog,
    pub recent_events_limit: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            policy: SecurityPolicy::new(),
            event_log: EventLog::disabled(),
            recent_events_limit: DEFAULT_RECENT_EVENTS_LIMIT,
        }
    }
}

/// The agent-facing RPC dispatcher.
pub struct AgentBridge<H: WindowHost> {
    state: Mutex<BridgeState<H>>,
    policy: SecurityPolicy,
    methods: HashMap<&'static str, Handler<H>>,
    recent_events_limit: usize,
}

impl<H: WindowHost> std::fmt::Debug for AgentBridge<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentBridge")
            .field("methods", &self.methods.len())
            .field("recent_events_limit", &self.recent_events_limit)
            .finish_non_exhaustive()
    }
}

impl<H: WindowHost> AgentBridge<H> {
    /// Wraps a host and subscribes to its lifecycle events.
    pub fn new(mut host: H, options: BridgeOptions) -> Self {
        let (sink, events) = mpsc::unbounded_channel();
        host.subscribe(sink);

        Self {
            state: Mutex::new(BridgeState {
                host,
                gate: CompletionGate::new(),
                log: options.event_log,
                events,
            }),
            policy: options.policy,
            methods: handlers::method_table(),
            recent_events_limit: options.recent_events_limit,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &SecurityPolicy { &self.policy }

    /// Registered method names, sorted.
    #[must_use]
    pub fn method_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Handles one raw request payload and returns the response to send.
    ///
    /// Never fails: every problem becomes an error envelope.
    pub fn handle(&self, payload: &[u8]) -> Response {
        let request = match Request::parse(payload) {
            Ok(request) => request,
            Err(response) => {
                tracing::debug!("bridge: rejected malformed request");
                return *response;
            }
        };
        self.dispatch(request)
    }

    /// Dispatches a parsed request.
    pub fn dispatch(&self, request: Request) -> Response {
        let Request { method, params, id, .. } = request;
        tracing::debug!("bridge: {method} (id {id})");

        let Some(handler) = self.methods.get(method.as_str()) else {
            return *Response::failure(id, &BridgeError::MethodNotFound(method));
        };

        let mut state = self.state.lock();
        self.drain_events(&mut state);

        let window_id = params.get("window_id").cloned();
        let outcome = handler(self, &mut state, params);
        self.drain_events(&mut state);

        match outcome {
            Ok(result) => Response::success(id, result),
            Err(err) => {
                if err.is_security_violation() {
                    tracing::info!("bridge: {method} refused: {err}");
                    state.log.append(
                        audit::SECURITY_VIOLATION,
                        json!({
                            "method": method,
                            "window_id": window_id,
                            "reason": err.to_string(),
                        }),
                    );
                } else {
                    tracing::debug!("bridge: {method} failed: {err}");
                }
                *Response::failure(id, &err)
            }
        }
    }

    /// Logs every host event queued since the last drain.
    pub fn process_host_events(&self) {
        let mut state = self.state.lock();
        self.drain_events(&mut state);
    }

    /// Runs `f` against the host under the bridge lock, then logs the host
    /// events it caused.
    pub fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state.host);
        self.drain_events(&mut state);
        result
    }

    /// Whether the completion gate currently allows closing the window.
    #[must_use]
    pub fn is_close_allowed(&self, id: WindowId) -> bool { self.state.lock().gate.is_close_allowed(id) }

    /// Host-side close request, honoring the completion gate.
    ///
    /// Returns whether the window was closed. A veto is recorded in the
    /// event log.
    ///
    /// # Errors
    ///
    /// Fails when the window does not exist.
    pub fn request_close(&self, id: WindowId) -> Result<bool, BridgeError> {
        let mut state = self.state.lock();
        if state.host.window(id).is_none() {
            return Err(BridgeError::WindowNotFound(id));
        }

        if !state.gate.is_close_allowed(id) {
            tracing::info!("bridge: close of window {id} vetoed, verification pending");
            state.log.append(audit::CLOSE_VETOED, json!({ "window_id": id }));
            return Ok(false);
        }

        state.host.close(id)?;
        self.drain_events(&mut state);
        Ok(true)
    }

    fn drain_events(&self, state: &mut BridgeState<H>) {
        while let Ok(event) = state.events.try_recv() {
            self.observe(state, event);
        }
    }

    /// Records one host lifecycle event.
    fn observe(&self, state: &mut BridgeState<H>, event: HostEvent) {
        match event {
            HostEvent::WindowCreated(window) => {
                state.log.append(lifecycle::CLIENT_NEW, self.window_event(&window));
            }
            HostEvent::WindowDestroyed(window) => {
                state.gate.forget(window.id);
                state.log.append(lifecycle::CLIENT_KILLED, self.window_event(&window));
            }
            HostEvent::FocusChanged(window) => {
                let payload = window.map_or(Value::Null, |w| self.window_event(&w));
                state.log.append(lifecycle::FOCUS_CHANGE, payload);
            }
            HostEvent::LayoutChanged { layout, group } => {
                state
                    .log
                    .append(lifecycle::LAYOUT_CHANGE, json!({ "layout": layout, "group": group }));
            }
        }
    }

    /// `{window_id, name}` with the name redacted for hidden windows.
    fn window_event(&self, window: &WindowSnapshot) -> Value {
        let name = if self.policy.can_see(Some(window)) { window.name.as_str() } else { REDACTED_NAME };
        json!({ "window_id": window.id, "name": name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::host::VirtualHost;
    use crate::modules::layout::{LayoutStyle, ScreenRect};

    fn bridge_with_log() -> (AgentBridge<VirtualHost>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let host = VirtualHost::new(
            ScreenRect::new(0, 0, 1000, 800),
            &["a".to_string()],
            LayoutStyle::default(),
        )
        .with_screenshot_dir(dir.path().join("shots"));
        let options = BridgeOptions {
            event_log: EventLog::new(dir.path().join("events.jsonl")),
            ..BridgeOptions::default()
        };
        (AgentBridge::new(host, options), dir)
    }

    fn events(bridge: &AgentBridge<VirtualHost>) -> Vec<EventRecord> {
        bridge.state.lock().log.recent(100)
    }

    #[test]
    fn test_lifecycle_events_are_logged() {
        let (bridge, _dir) = bridge_with_log();
        let id = bridge.with_host(|host| host.spawn_window("xterm", &["XTerm"]));
        bridge.with_host(|host| host.close(id)).unwrap();

        let names: Vec<_> = events(&bridge).into_iter().map(|r| r.event).collect();
        assert_eq!(names, ["client_new", "focus_change", "client_killed", "focus_change"]);
    }

    #[test]
    fn test_sensitive_windows_are_redacted_in_log() {
        let (bridge, _dir) = bridge_with_log();
        bridge.with_host(|host| host.spawn_window("Vault", &["KeePassXC"]));

        let records = events(&bridge);
        assert!(records.iter().all(|r| r.payload["name"] != "Vault"));
        assert_eq!(records[0].payload["name"], REDACTED_NAME);
        assert_eq!(records[1].payload["name"], REDACTED_NAME);
    }

    #[test]
    fn test_request_close_vetoed_then_allowed() {
        let (bridge, _dir) = bridge_with_log();
        let id = bridge.with_host(|host| host.spawn_window("editor", &[]));

        let params = format!(r#"{{"method":"verify_completion","params":{{"window_id":{id},"complete":false}},"id":1}}"#);
        assert!(!bridge.handle(params.as_bytes()).is_error());
        assert!(!bridge.is_close_allowed(id));

        assert_eq!(bridge.request_close(id), Ok(false));
        assert!(bridge.with_host(|host| host.window(id)).is_some());
        assert!(events(&bridge).iter().any(|r| r.event == audit::CLOSE_VETOED));

        let params = format!(r#"{{"method":"verify_completion","params":{{"window_id":{id},"complete":true}},"id":2}}"#);
        assert!(!bridge.handle(params.as_bytes()).is_error());
        assert_eq!(bridge.request_close(id), Ok(true));
        assert!(bridge.with_host(|host| host.window(id)).is_none());
        assert_eq!(bridge.request_close(id), Err(BridgeError::WindowNotFound(id)));
    }

    #[test]
    fn test_destroyed_window_leaves_gate() {
        let (bridge, _dir) = bridge_with_log();
        let id = bridge.with_host(|host| host.spawn_window("editor", &[]));
        let params = format!(r#"{{"method":"verify_completion","params":{{"window_id":{id},"complete":false}}}}"#);
        bridge.handle(params.as_bytes());

        bridge.with_host(|host| host.close(id)).unwrap();
        assert!(bridge.is_close_allowed(id));
    }

    #[test]
    fn test_security_violation_is_audited() {
        let (bridge, _dir) = bridge_with_log();
        let id = bridge.with_host(|host| host.spawn_window("term", &[]));
        let request = format!(r#"{{"method":"input_text","params":{{"text":"sudo reboot","window_id":{id}}},"id":1}}"#);

        let response = bridge.handle(request.as_bytes());
        assert_eq!(response.error().map(|e| e.code), Some(codes::SECURITY_VIOLATION));

        let record = events(&bridge).into_iter().find(|r| r.event == audit::SECURITY_VIOLATION).unwrap();
        assert_eq!(record.payload["method"], "input_text");
        assert_eq!(record.payload["window_id"], id);
    }

    #[test]
    fn test_method_names() {
        let (bridge, _dir) = bridge_with_log();
        let names = bridge.method_names();
        assert!(names.contains(&"echo"));
        assert!(names.contains(&"confirm_layout"));
        assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
