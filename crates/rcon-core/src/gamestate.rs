//! `get gamestate` response model.
//!
//! The server answers with a small line-oriented block:
//!
//! ```text
//! Players: Allied: 38 - Axis: 42
//! Score: Allied: 2 - Axis: 3
//! Remaining Time: 0:27:12
//! Map: foy_warfare
//! Next Map: stmereeglise_warfare
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub allied_players: u32,
    pub axis_players: u32,
    pub allied_score: u32,
    pub axis_score: u32,
    pub remaining: Option<Duration>,
    pub map: String,
    pub next_map: String,
}

impl GameState {
    /// Parse a full `get gamestate` response.
    ///
    /// Missing lines leave their fields at defaults rather than
    /// failing the whole block; `None` is returned only when nothing
    /// recognizable was present.
    pub fn parse(text: &str) -> Option<GameState> {
        let mut state = GameState::default();
        let mut matched = false;

        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Players" => {
                    if let Some((allied, axis)) = parse_pair(value) {
                        state.allied_players = allied;
                        state.axis_players = axis;
                        matched = true;
                    }
                }
                "Score" => {
                    if let Some((allied, axis)) = parse_pair(value) {
                        state.allied_score = allied;
                        state.axis_score = axis;
                        matched = true;
                    }
                }
                "Remaining Time" => {
                    state.remaining = parse_clock(value);
                    matched = true;
                }
                "Map" => {
                    state.map = value.to_string();
                    matched = true;
                }
                "Next Map" => {
                    state.next_map = value.to_string();
                    matched = true;
                }
                _ => {}
            }
        }

        matched.then_some(state)
    }
}

/// Parse `Allied: 38 - Axis: 42` into `(38, 42)`.
fn parse_pair(value: &str) -> Option<(u32, u32)> {
    let (allied, axis) = value.split_once('-')?;
    let allied = allied.trim().strip_prefix("Allied:")?.trim().parse().ok()?;
    let axis = axis.trim().strip_prefix("Axis:")?.trim().parse().ok()?;
    Some((allied, axis))
}

/// Parse `h:mm:ss` into a duration.
fn parse_clock(value: &str) -> Option<Duration> {
    let mut parts = value.split(':');
    let h: u64 = parts.next()?.trim().parse().ok()?;
    let m: u64 = parts.next()?.trim().parse().ok()?;
    let s: u64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Duration::from_secs(h * 3600 + m * 60 + s))
}
