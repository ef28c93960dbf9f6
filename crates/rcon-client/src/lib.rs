//! rcon-client
//!
//! The RCON session engine. One [`RconEngine`] owns one authenticated
//! TCP session to one game server and multiplexes concurrent command
//! callers onto it:
//!
//! - `connection`: the socket, framing and handshake reads
//! - `dispatcher`: strict-FIFO serialization of concurrent commands
//! - `session`: connect / authenticate / reconnect state machine
//! - `poller`: cadenced read-only status queries
//! - `cache`: last-known snapshot plus the event bus
//!
//! The web layer talks to this crate only through [`RconEngine`].

pub mod config;
pub mod engine;
pub mod error;

mod cache;
mod connection;
mod dispatcher;
mod poller;
mod session;

pub use config::{BackoffConfig, Credentials, EngineConfig, PollCommand, PollConfig};
pub use engine::RconEngine;
pub use error::RconError;

// Re-export the domain vocabulary callers need to consume results.
pub use rcon_core::map_names;
pub use rcon_core::{
    ConnectionState, Event, GameSnapshot, GameState, LogKind, LogLine, PlayerId, PlayerInfo,
    PlayerScore, Team, TeamScore,
};
