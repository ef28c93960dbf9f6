//! rcon-core
//!
//! Pure domain logic for the RCON engine:
//! - connection state machine vocabulary
//! - player, score and game-state models with their text parsers
//! - log line parsing
//! - game snapshots and snapshot diffing into events
//!
//! No networking and no async I/O lives here; the wire codec is in
//! `rcon-protocol` and the tokio machinery in `rcon-client`.

pub mod event;
pub mod gamestate;
pub mod logline;
pub mod map_names;
pub mod player;
pub mod snapshot;
pub mod state;

pub use event::Event;
pub use gamestate::GameState;
pub use logline::{LogKind, LogLine};
pub use player::{PlayerId, PlayerInfo, PlayerScore, Team};
pub use snapshot::{diff_snapshots, GameSnapshot, TeamScore};
pub use state::ConnectionState;
