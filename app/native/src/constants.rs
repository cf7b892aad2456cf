//! Application-wide constants.

/// Application name, used for the cache and config directory names.
pub const APP_NAME: &str = "tether";

/// Socket filename within the cache directory.
pub const SOCKET_FILENAME: &str = "agent_bridge.socket";

/// Event record store filename within the cache directory.
pub const EVENT_LOG_FILENAME: &str = "agent_events.jsonl";

/// Name shown in place of a window title the security policy hides.
pub const REDACTED_NAME: &str = "<REDACTED>";

/// JSON-RPC protocol version echoed in every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Default slot geometry when a proposal omits a coordinate.
pub mod slot_defaults {
    pub const X: f64 = 0.0;
    pub const Y: f64 = 0.0;
    pub const W: f64 = 0.3;
    pub const H: f64 = 0.3;

    /// Owner recorded for slots whose proposer did not identify itself.
    pub const OWNER: &str = "agent";
}
