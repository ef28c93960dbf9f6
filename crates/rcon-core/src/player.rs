//! Player models and the parsers for the two player-facing queries.
//!
//! `get playerids` answers with a tab array of `Name : id` entries;
//! `playerinfo <name>` answers with one `Key: Value` block per player.
//! Identity is the game-assigned id; players can rename mid-session
//! without becoming a different player.

use serde::{Deserialize, Serialize};

/// Game-assigned player identifier (a steamID64 or platform UID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Allies,
    Axis,
}

impl Team {
    fn parse(s: &str) -> Option<Team> {
        match s.trim() {
            "Allies" | "Allied" => Some(Team::Allies),
            "Axis" => Some(Team::Axis),
            _ => None,
        }
    }
}

/// Per-player score breakdown from the `Score:` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub combat: u32,
    pub offense: u32,
    pub defense: u32,
    pub support: u32,
}

/// One connected player.
///
/// The id/name pair always comes from the player list; the remaining
/// fields are only present once a `playerinfo` detail query has run
/// for this player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub team: Option<Team>,
    pub role: Option<String>,
    pub unit: Option<String>,
    pub level: Option<u32>,
    pub score: Option<PlayerScore>,
}

impl PlayerInfo {
    /// Parse one `Name : id` entry from the `get playerids` array.
    ///
    /// Player names may themselves contain " : ", so the id is taken
    /// from the last separator.
    pub fn from_list_entry(entry: &str) -> Option<PlayerInfo> {
        let (name, id) = entry.rsplit_once(" : ")?;
        let id = id.trim();
        if name.is_empty() || id.is_empty() {
            return None;
        }
        Some(PlayerInfo {
            id: PlayerId(id.to_string()),
            name: name.to_string(),
            team: None,
            role: None,
            unit: None,
            level: None,
            score: None,
        })
    }

    /// Fold a `playerinfo <name>` response block into this player.
    ///
    /// Unknown keys are skipped; the game adds lines between patches
    /// and old ones must keep parsing.
    pub fn apply_details(&mut self, block: &str) {
        for line in block.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Name" => {
                    if !value.is_empty() {
                        self.name = value.to_string();
                    }
                }
                "Team" => self.team = Team::parse(value),
                "Role" => self.role = Some(value.to_string()),
                "Unit" => {
                    // "0 - ABLE"; the squad name is what matters.
                    let unit = value.rsplit_once(" - ").map(|(_, n)| n).unwrap_or(value);
                    self.unit = Some(unit.to_string());
                }
                "Level" => self.level = value.parse().ok(),
                "Score" => self.score = parse_score(value),
                _ => {}
            }
        }
    }
}

/// Parse `C 50, O 120, D 40, S 30`.
fn parse_score(value: &str) -> Option<PlayerScore> {
    let mut score = PlayerScore::default();
    for part in value.split(',') {
        let mut it = part.trim().splitn(2, ' ');
        let tag = it.next()?;
        let n: u32 = it.next()?.trim().parse().ok()?;
        match tag {
            "C" => score.combat = n,
            "O" => score.offense = n,
            "D" => score.defense = n,
            "S" => score.support = n,
            _ => return None,
        }
    }
    Some(score)
}
