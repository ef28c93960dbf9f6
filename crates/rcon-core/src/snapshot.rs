//! The last-known picture of live game state, and the diff between
//! two of them.
//!
//! Snapshots are replaced wholesale each poll tick and never mutated
//! in place, so concurrent readers can hold an `Arc` to one without
//! ever observing a torn update.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::player::{PlayerId, PlayerInfo};

/// Match score per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub allied: u32,
    pub axis: u32,
}

/// Fully decoded live state as of one poll tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Connected players, unique by [`PlayerId`].
    pub players: Vec<PlayerInfo>,
    pub map_name: String,
    pub score: TeamScore,
    pub last_updated: DateTime<Utc>,
}

impl GameSnapshot {
    /// The empty pre-first-tick snapshot.
    pub fn empty() -> GameSnapshot {
        GameSnapshot {
            players: Vec::new(),
            map_name: String::new(),
            score: TeamScore::default(),
            last_updated: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerInfo> {
        self.players.iter().find(|p| &p.id == id)
    }
}

/// Compute the element-wise difference between two consecutive
/// snapshots as subscriber events.
///
/// Pure; identical snapshots yield no events. `last_updated` is
/// bookkeeping, not state, and never contributes a diff.
pub fn diff_snapshots(old: &GameSnapshot, new: &GameSnapshot) -> Vec<Event> {
    let mut events = Vec::new();

    let old_ids: HashMap<&PlayerId, &PlayerInfo> =
        old.players.iter().map(|p| (&p.id, p)).collect();
    let new_ids: HashMap<&PlayerId, &PlayerInfo> =
        new.players.iter().map(|p| (&p.id, p)).collect();

    for player in &new.players {
        if !old_ids.contains_key(&player.id) {
            events.push(Event::PlayerJoined(player.clone()));
        }
    }
    for player in &old.players {
        if !new_ids.contains_key(&player.id) {
            events.push(Event::PlayerLeft(player.clone()));
        }
    }

    if old.score != new.score {
        events.push(Event::ScoreChanged {
            old: old.score,
            new: new.score,
        });
    }

    if old.map_name != new.map_name && !new.map_name.is_empty() {
        events.push(Event::MapChanged {
            old: old.map_name.clone(),
            new: new.map_name.clone(),
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerInfo;

    fn player(id: &str, name: &str) -> PlayerInfo {
        PlayerInfo::from_list_entry(&format!("{} : {}", name, id)).unwrap()
    }

    fn snapshot(players: Vec<PlayerInfo>, map: &str, score: TeamScore) -> GameSnapshot {
        GameSnapshot {
            players,
            map_name: map.to_string(),
            score,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn identical_snapshots_no_events() {
        let a = snapshot(vec![player("1", "Fish")], "foy_warfare", TeamScore::default());
        let mut b = a.clone();
        b.last_updated = Utc::now();
        assert!(diff_snapshots(&a, &b).is_empty());
    }

    #[test]
    fn join_and_leave_by_id() {
        let old = snapshot(
            vec![player("1", "Fish"), player("2", "Chips")],
            "foy_warfare",
            TeamScore::default(),
        );
        let new = snapshot(
            vec![player("2", "Chips"), player("3", "Vinegar")],
            "foy_warfare",
            TeamScore::default(),
        );
        let events = diff_snapshots(&old, &new);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::PlayerJoined(p) if p.id.0 == "3"));
        assert!(matches!(&events[1], Event::PlayerLeft(p) if p.id.0 == "1"));
    }

    #[test]
    fn rename_is_not_a_join() {
        let old = snapshot(vec![player("1", "Fish")], "foy_warfare", TeamScore::default());
        let new = snapshot(vec![player("1", "Trout")], "foy_warfare", TeamScore::default());
        assert!(diff_snapshots(&old, &new).is_empty());
    }

    #[test]
    fn score_and_map_changes() {
        let old = snapshot(Vec::new(), "foy_warfare", TeamScore { allied: 2, axis: 2 });
        let new = snapshot(Vec::new(), "kursk_warfare", TeamScore { allied: 3, axis: 2 });
        let events = diff_snapshots(&old, &new);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Event::ScoreChanged {
                old: TeamScore { allied: 2, axis: 2 },
                new: TeamScore { allied: 3, axis: 2 },
            }
        ));
        assert!(matches!(&events[1], Event::MapChanged { new, .. } if new == "kursk_warfare"));
    }

    #[test]
    fn first_tick_from_empty_emits_joins_only() {
        let old = GameSnapshot::empty();
        let new = snapshot(
            vec![player("1", "Fish")],
            "foy_warfare",
            TeamScore::default(),
        );
        let events = diff_snapshots(&old, &new);
        assert!(matches!(&events[0], Event::PlayerJoined(_)));
        // Map going from empty to a real name is a rotation event too.
        assert!(matches!(&events[1], Event::MapChanged { .. }));
    }
}
