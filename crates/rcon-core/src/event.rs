//! Events emitted to subscribers as polled state changes.

use serde::{Deserialize, Serialize};

use crate::logline::LogLine;
use crate::player::PlayerInfo;
use crate::snapshot::TeamScore;
use crate::state::ConnectionState;

/// One observed change between two poll ticks, or a session state
/// transition. Subscribers receive these in tick order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A player id appeared that was absent last tick.
    PlayerJoined(PlayerInfo),

    /// A player id from last tick is gone.
    PlayerLeft(PlayerInfo),

    /// The team score moved.
    ScoreChanged { old: TeamScore, new: TeamScore },

    /// The server rotated to a different map.
    MapChanged { old: String, new: String },

    /// A log line not seen before this tick.
    LogLine(LogLine),

    /// The session moved to a new connection state.
    ConnectionStateChanged(ConnectionState),
}
