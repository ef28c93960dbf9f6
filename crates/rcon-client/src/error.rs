//! Engine error taxonomy.
//!
//! Connection-fatal conditions (`Frame`, `ConnectionLost`, repeated
//! timeouts) are recovered by the session manager through
//! reconnection; `AuthRejected` is terminal; `NotReady` and
//! `CommandTimeout` are per-caller and the caller decides whether to
//! retry; re-sending a non-idempotent command like a kick could
//! double-apply, so the engine never retries on its own.

use rcon_protocol::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RconError {
    /// Malformed or truncated wire data. Connection-fatal.
    #[error("malformed wire data: {0}")]
    Frame(#[from] CodecError),

    /// No complete frame arrived within the read deadline.
    #[error("timed out waiting for a frame")]
    Timeout,

    /// A submitted command got no response within its deadline. The
    /// command is not retried.
    #[error("no response to command within the deadline")]
    CommandTimeout,

    /// The game server rejected the password. Terminal for this
    /// engine instance.
    #[error("game server rejected the password")]
    AuthRejected,

    /// The session is not in the `Ready` state; retry later.
    #[error("session is not ready")]
    NotReady,

    /// The connection dropped; this and all queued commands failed.
    #[error("connection to the game server was lost")]
    ConnectionLost,

    /// The server answered `FAIL` to a command.
    #[error("game server returned status FAIL")]
    CommandFailed,

    /// The engine was shut down by an explicit disconnect.
    #[error("engine is shutting down")]
    Shutdown,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RconError {
    /// Whether the underlying connection can no longer be used and
    /// the session manager should reconnect.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            RconError::Frame(_) | RconError::ConnectionLost | RconError::Io(_)
        )
    }
}
