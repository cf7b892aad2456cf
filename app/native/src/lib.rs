//! Tether - a policy-gated JSON-RPC bridge between autonomous agents and a
//! tiling window manager.
//!
//! Agents connect to a Unix socket and call methods such as `get_windows`,
//! `input_text` or `propose_slot`. Every call passes through a
//! [`SecurityPolicy`](modules::security::SecurityPolicy) before it reaches
//! the windowing host, and every state change is appended to a JSONL event
//! store that planning agents read back as context.

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod modules;
pub mod platform;
pub mod schema;

use std::sync::Arc;

use config::TetherConfig;
use error::TetherError;
use modules::bridge::server::BridgeServer;
use modules::bridge::{AgentBridge, BridgeOptions, EventLog};
use modules::host::VirtualHost;
use modules::layout::LayoutStyle;

/// Windows mapped by `tether serve --virtual`, as `(name, class)`.
const DEMO_WINDOWS: [(&str, &str); 3] =
    [("Terminal", "alacritty"), ("Editor", "code"), ("Browser", "firefox")];

/// Builds the bridge described by `config` over an in-memory host.
#[must_use]
pub fn build_bridge(config: &TetherConfig) -> AgentBridge<VirtualHost> {
    let host = VirtualHost::new(
        config.host.screen,
        &config.host.groups,
        LayoutStyle::from(&config.layout),
    );

    AgentBridge::new(host, BridgeOptions {
        policy: config.security_policy(),
        event_log: EventLog::new(config.bridge.event_log_path()),
        recent_events_limit: config.bridge.recent_events_limit,
    })
}

/// Runs the bridge server until Ctrl-C.
///
/// With `seed_demo_windows`, a few ordinary windows are mapped first so that
/// clients have something to inspect.
///
/// # Errors
///
/// Returns an error if the runtime cannot start or the socket cannot be bound.
pub fn run_bridge(config: &TetherConfig, seed_demo_windows: bool) -> Result<(), TetherError> {
    let bridge = Arc::new(build_bridge(config));

    if seed_demo_windows {
        bridge.with_host(|host| {
            for (name, class) in DEMO_WINDOWS {
                host.spawn_window(name, &[class]);
            }
        });
    }

    tracing::debug!(methods = ?bridge.method_names(), "bridge: methods registered");
    let server = BridgeServer::new(bridge, config.bridge.socket_path());
    tracing::info!(
        socket = %server.socket_path().display(),
        event_log = %config.bridge.event_log_path().display(),
        "bridge: starting"
    );

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(server.run_until_ctrl_c())?;
    Ok(())
}
