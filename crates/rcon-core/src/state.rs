//! Connection lifecycle vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the session currently stands.
///
/// Owned and transitioned exclusively by the session manager; every
/// other component only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No socket, not trying. Initial state, and the state between
    /// reconnection attempts.
    Disconnected,

    /// TCP connect in progress.
    Connecting,

    /// Socket is up; waiting for the XOR key and the login exchange.
    Authenticating,

    /// Authenticated and serving commands.
    Ready,

    /// The server rejected the password. Terminal: a fresh engine
    /// instance with new credentials is required.
    Failed,
}

impl ConnectionState {
    /// Whether commands may be submitted in this state.
    pub fn is_ready(self) -> bool {
        matches!(self, ConnectionState::Ready)
    }

    /// Whether the state machine will make no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::Ready => "ready",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}
