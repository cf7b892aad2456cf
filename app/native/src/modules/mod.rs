//! Core modules of the agent bridge.
//!
//! Leaves first: `security` and `layout` depend on nothing but geometry and
//! window attributes, `host` defines the windowing seam, and `bridge`
//! composes all of them behind the JSON-RPC socket.

pub mod bridge;
pub mod host;
pub mod layout;
pub mod security;

/// Opaque window identifier assigned by the windowing host.
pub type WindowId = u64;
