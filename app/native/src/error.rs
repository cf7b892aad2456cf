//! Error types for Tether.
//!
//! `TetherError` is the crate-level error returned by the CLI and by the
//! serving entry point. Layer-specific errors (`BridgeError`, `HostError`,
//! `SecurityViolation`) live next to the code that raises them and convert
//! into this type at the edges.

use serde::Serialize;
use thiserror::Error;

use crate::modules::bridge::BridgeError;

/// Errors that can occur during application execution.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum TetherError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IPC communication error.
    #[error("IPC error: {0}")]
    IpcError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// A request failed inside the bridge.
    #[error("Bridge error: {0}")]
    BridgeError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for TetherError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for TetherError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<BridgeError> for TetherError {
    fn from(err: BridgeError) -> Self { Self::BridgeError(err.to_string()) }
}

impl From<String> for TetherError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for TetherError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}
