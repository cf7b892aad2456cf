//! JSON-RPC 2.0 envelopes.
//!
//! One request per connection, one response per request. Every response
//! echoes the request `id` unchanged, `null` included, so callers that do
//! not pipeline can still correlate.
//!
//! ```json
//! {"jsonrpc": "2.0", "method": "get_windows", "params": {}, "id": 1}
//! {"jsonrpc": "2.0", "result": [...], "id": 1}
//! {"jsonrpc": "2.0", "error": {"code": -32601, "message": "..."}, "id": 1}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::BridgeError;
use crate::constants::JSONRPC_VERSION;

fn jsonrpc_version() -> String { JSONRPC_VERSION.to_string() }

/// A request envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

impl Request {
    /// Builds a request.
    pub fn new(method: impl Into<String>, params: Value, id: impl Into<Value>) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            method: method.into(),
            params,
            id: id.into(),
        }
    }

    /// Parses a raw payload.
    ///
    /// Unparsable JSON is a parse error answered with a `null` id. A JSON
    /// value that is not an envelope is an invalid request, answered with
    /// whatever id could be recovered. Missing `params` default to `{}`.
    ///
    /// # Errors
    ///
    /// Returns the response to send back when the payload is not a request.
    pub fn parse(payload: &[u8]) -> Result<Self, Box<Response>> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| Response::failure(Value::Null, &BridgeError::Parse(e.to_string())))?;

        let Value::Object(mut envelope) = value else {
            return Err(Response::failure(
                Value::Null,
                &BridgeError::InvalidRequest("request must be a JSON object".to_string()),
            ));
        };

        let id = envelope.remove("id").unwrap_or(Value::Null);
        let method = match envelope.remove("method") {
            Some(Value::String(method)) => method,
            Some(_) => {
                return Err(Response::failure(
                    id,
                    &BridgeError::InvalidRequest("'method' must be a string".to_string()),
                ));
            }
            None => {
                return Err(Response::failure(
                    id,
                    &BridgeError::InvalidRequest("missing 'method'".to_string()),
                ));
            }
        };
        let params = envelope.remove("params").unwrap_or_else(|| Value::Object(Map::new()));

        Ok(Self {
            jsonrpc: jsonrpc_version(),
            method,
            params,
            id,
        })
    }
}

/// Error object of a failed response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl From<&BridgeError> for RpcError {
    fn from(err: &BridgeError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Either a result or an error. Exactly one of the two keys is emitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Error { error: RpcError },
    Result { result: Value },
}

/// A response envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub id: Value,
}

impl Response {
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            outcome: Outcome::Result { result },
            id,
        }
    }

    /// Error response. Boxed because it usually travels inside a `Result`.
    #[must_use]
    pub fn failure(id: Value, err: &BridgeError) -> Box<Self> {
        Box::new(Self {
            jsonrpc: jsonrpc_version(),
            outcome: Outcome::Error { error: err.into() },
            id,
        })
    }

    #[must_use]
    pub const fn is_error(&self) -> bool { matches!(self.outcome, Outcome::Error { .. }) }

    /// The error object, if this is a failure.
    #[must_use]
    pub const fn error(&self) -> Option<&RpcError> {
        match &self.outcome {
            Outcome::Error { error } => Some(error),
            Outcome::Result { .. } => None,
        }
    }

    /// Splits into the result value or the error object.
    ///
    /// # Errors
    ///
    /// Returns the error object of a failed response.
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.outcome {
            Outcome::Result { result } => Ok(result),
            Outcome::Error { error } => Err(error),
        }
    }

    /// Serializes to bytes, falling back to a fixed internal-error envelope.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|_| {
            br#"{"jsonrpc":"2.0","error":{"code":-32000,"message":"Failed to serialize response"},"id":null}"#
                .to_vec()
        })
    }
}
