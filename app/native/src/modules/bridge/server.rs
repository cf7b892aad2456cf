//! Unix domain socket transport for the agent bridge.
//!
//! # Protocol
//!
//! One request per connection:
//!
//! 1. The client connects and writes a single JSON-RPC request.
//! 2. The client shuts down its write half to signal end of input.
//! 3. The server reads until end of input, dispatches, writes one response
//!    and closes the connection.
//!
//! Every connection runs as its own task, so a silent client only ties up
//! its own task. There is no read timeout: a client that never signals end
//! of input keeps its task alive until it disconnects.
//!
//! A missing socket means the bridge has not started yet. Clients retry a
//! few times before giving up.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};

use super::AgentBridge;
use super::protocol::{Request, Response};
use crate::modules::host::WindowHost;

/// Number of connection attempts before a client gives up.
const MAX_RETRIES: u32 = 3;

/// Delay between connection attempts in milliseconds.
const RETRY_DELAY_MS: u64 = 100;

/// Interval at which queued host events are flushed to the event log while
/// no request is in flight.
const EVENT_FLUSH_INTERVAL_MS: u64 = 250;

// ============================================================================
// Server
// ============================================================================

/// Serves an [`AgentBridge`] on a Unix socket.
#[derive(Debug)]
pub struct BridgeServer<H: WindowHost + 'static> {
    bridge: Arc<AgentBridge<H>>,
    socket_path: PathBuf,
}

impl<H: WindowHost + 'static> BridgeServer<H> {
    pub fn new(bridge: Arc<AgentBridge<H>>, socket_path: impl Into<PathBuf>) -> Self {
        Self { bridge, socket_path: socket_path.into() }
    }

    #[must_use]
    pub fn socket_path(&self) -> &Path { &self.socket_path }

    /// Binds the socket, replacing any stale socket file.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails when the parent directory cannot be created or the socket
    /// cannot be bound.
    pub fn bind(&self) -> io::Result<UnixListener> {
        remove_socket(&self.socket_path);
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        UnixListener::bind(&self.socket_path)
    }

    /// Accepts connections until `shutdown` resolves, then removes the
    /// socket file.
    pub async fn serve(self, listener: UnixListener, shutdown: impl Future<Output = ()>) {
        tracing::info!("bridge: listening on {}", self.socket_path.display());

        let mut flush = tokio::time::interval(Duration::from_millis(EVENT_FLUSH_INTERVAL_MS));
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        let bridge = Arc::clone(&self.bridge);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &bridge).await {
                                tracing::debug!("bridge: connection aborted: {e}");
                            }
                        });
                    }
                    Err(e) => tracing::warn!("bridge: accept failed: {e}"),
                },
                _ = flush.tick() => self.bridge.process_host_events(),
                () = &mut shutdown => break,
            }
        }

        remove_socket(&self.socket_path);
        tracing::info!("bridge: stopped");
    }

    /// Binds and serves until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Fails when the socket cannot be bound.
    pub async fn run_until_ctrl_c(self) -> io::Result<()> {
        let listener = self.bind()?;
        self.serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("bridge: failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;
        Ok(())
    }
}

/// Reads one request, answers it, closes.
///
/// A read error drops the request before dispatch, so nothing is mutated.
async fn handle_connection<H: WindowHost>(
    mut stream: UnixStream,
    bridge: &AgentBridge<H>,
) -> io::Result<()> {
    let mut payload = Vec::new();
    stream.read_to_end(&mut payload).await?;

    let response = bridge.handle(&payload);
    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}

fn remove_socket(path: &Path) {
    if path.exists()
        && let Err(e) = std::fs::remove_file(path)
    {
        tracing::warn!("bridge: failed to remove socket {}: {e}", path.display());
    }
}

// ============================================================================
// Client
// ============================================================================

/// Errors raised by [`call`].
#[derive(Debug, Error)]
pub enum IpcError {
    /// Nothing is listening on the socket.
    #[error("Bridge is not running (no socket at {0})")]
    NotRunning(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Sends one request and waits for its response.
///
/// Retries while the socket is absent or refuses connections.
///
/// # Errors
///
/// Returns [`IpcError::NotRunning`] after the last failed attempt, or the
/// first I/O or decoding error.
pub async fn call(socket_path: &Path, request: &Request) -> Result<Response, IpcError> {
    let mut attempt = 0;
    loop {
        match call_once(socket_path, request).await {
            Err(IpcError::NotRunning(_)) if attempt + 1 < MAX_RETRIES => {
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
            }
            result => return result,
        }
    }
}

async fn call_once(socket_path: &Path, request: &Request) -> Result<Response, IpcError> {
    let mut stream = UnixStream::connect(socket_path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => {
            IpcError::NotRunning(socket_path.to_path_buf())
        }
        _ => IpcError::Io(e),
    })?;

    let payload = serde_json::to_vec(request)
        .map_err(|e| IpcError::InvalidResponse(format!("Failed to serialize request: {e}")))?;
    stream.write_all(&payload).await?;
    stream.shutdown().await?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    serde_json::from_slice(&response)
        .map_err(|e| IpcError::InvalidResponse(format!("Failed to parse response: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_call_without_server_is_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.socket");

        let result = call(&path, &Request::new("echo", json!({}), 1)).await;
        assert!(matches!(result, Err(IpcError::NotRunning(p)) if p == path));
    }

    #[test]
    fn test_remove_socket_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        remove_socket(&dir.path().join("nothing"));
    }

    #[test]
    fn test_not_running_message() {
        let err = IpcError::NotRunning(PathBuf::from("/tmp/x.socket"));
        assert_eq!(err.to_string(), "Bridge is not running (no socket at /tmp/x.socket)");
    }
}
