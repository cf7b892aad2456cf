//! Errors surfaced to agents through the JSON-RPC error envelope.

use thiserror::Error;

use crate::modules::WindowId;
use crate::modules::host::HostError;
use crate::modules::security::SecurityViolation;

/// JSON-RPC error codes.
pub mod codes {
    /// Payload is not valid JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// Payload is JSON but not a request envelope.
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    /// Generic application error.
    pub const APPLICATION_ERROR: i64 = -32000;
    /// Refusal by the security policy.
    pub const SECURITY_VIOLATION: i64 = -32001;
}

/// A failed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Window {0} not found")]
    WindowNotFound(WindowId),

    #[error("Window {0} does not support agent metadata")]
    MetadataUnsupported(WindowId),

    #[error("Current layout '{0}' does not support semantic slots")]
    LayoutUnsupported(String),

    #[error(transparent)]
    Security(#[from] SecurityViolation),

    #[error("{0}")]
    Host(String),
}

impl BridgeError {
    /// JSON-RPC error code for this failure.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::Parse(_) => codes::PARSE_ERROR,
            Self::InvalidRequest(_) => codes::INVALID_REQUEST,
            Self::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::Security(_) => codes::SECURITY_VIOLATION,
            Self::WindowNotFound(_)
            | Self::MetadataUnsupported(_)
            | Self::LayoutUnsupported(_)
            | Self::Host(_) => codes::APPLICATION_ERROR,
        }
    }

    /// Whether this failure was a policy refusal.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool { matches!(self, Self::Security(_)) }
}

impl From<HostError> for BridgeError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::WindowNotFound(id) => Self::WindowNotFound(id),
            HostError::MetadataUnsupported(id) => Self::MetadataUnsupported(id),
            HostError::Operation(message) => Self::Host(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(BridgeError::Parse("x".into()).code(), -32700);
        assert_eq!(BridgeError::InvalidRequest("x".into()).code(), -32600);
        assert_eq!(BridgeError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(BridgeError::InvalidParams("x".into()).code(), -32602);
        assert_eq!(BridgeError::WindowNotFound(1).code(), -32000);
        assert_eq!(BridgeError::LayoutUnsupported("monocle".into()).code(), -32000);
        assert_eq!(BridgeError::Security(SecurityViolation::NoFocusedWindow).code(), -32001);
    }

    #[test]
    fn test_security_message_is_distinguishable() {
        let err: BridgeError = SecurityViolation::NoFocusedWindow.into();
        assert!(err.is_security_violation());
        assert!(err.to_string().starts_with("Security violation:"));
        assert!(!BridgeError::WindowNotFound(3).to_string().starts_with("Security violation:"));
    }

    #[test]
    fn test_from_host_error() {
        assert_eq!(BridgeError::from(HostError::WindowNotFound(9)), BridgeError::WindowNotFound(9));
        assert_eq!(
            BridgeError::from(HostError::MetadataUnsupported(9)),
            BridgeError::MetadataUnsupported(9)
        );
        assert_eq!(
            BridgeError::from(HostError::Operation("boom".into())),
            BridgeError::Host("boom".into())
        );
    }

    #[test]
    fn test_layout_unsupported_message() {
        let err = BridgeError::LayoutUnsupported("monocle".to_string());
        assert_eq!(err.to_string(), "Current layout 'monocle' does not support semantic slots");
    }
}
