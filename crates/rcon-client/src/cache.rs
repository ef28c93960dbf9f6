//! Last-known snapshot and the subscriber event bus.
//!
//! The snapshot is swapped atomically behind an `Arc`, never mutated
//! in place, so `read()` is cheap and readers can never observe a
//! torn update. Events go out over a broadcast channel in the order
//! ticks occurred.

use std::sync::{Arc, RwLock};

use rcon_core::{diff_snapshots, ConnectionState, Event, GameSnapshot, LogLine};
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered events per subscriber before a slow one starts lagging.
const EVENT_CAPACITY: usize = 256;

pub(crate) struct StateCache {
    snapshot: RwLock<Arc<GameSnapshot>>,
    events: broadcast::Sender<Event>,
}

impl StateCache {
    pub fn new() -> StateCache {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        StateCache {
            snapshot: RwLock::new(Arc::new(GameSnapshot::empty())),
            events,
        }
    }

    /// The latest snapshot, without touching the network.
    pub fn read(&self) -> Arc<GameSnapshot> {
        self.snapshot.read().expect("snapshot lock poisoned").clone()
    }

    /// Register a subscriber. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Diff `new` against the stored snapshot, emit one event per
    /// detected change plus one per new log line, then replace the
    /// stored snapshot. A no-op tick emits nothing.
    pub fn update(&self, new: GameSnapshot, new_logs: Vec<LogLine>) {
        let old = self.read();
        let changes = diff_snapshots(&old, &new);
        trace!(changes = changes.len(), logs = new_logs.len(), "cache update");

        for event in changes {
            self.emit(event);
        }
        for line in new_logs {
            self.emit(Event::LogLine(line));
        }

        *self.snapshot.write().expect("snapshot lock poisoned") = Arc::new(new);
    }

    /// Surface a session state transition on the same bus, so the
    /// web layer sees connectivity changes interleaved with game
    /// events in real order.
    pub fn emit_state(&self, state: ConnectionState) {
        self.emit(Event::ConnectionStateChanged(state));
    }

    fn emit(&self, event: Event) {
        // Err just means nobody is subscribed right now.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rcon_core::{PlayerInfo, TeamScore};

    fn snapshot(names_ids: &[(&str, &str)]) -> GameSnapshot {
        GameSnapshot {
            players: names_ids
                .iter()
                .map(|(name, id)| {
                    PlayerInfo::from_list_entry(&format!("{} : {}", name, id)).unwrap()
                })
                .collect(),
            map_name: "foy_warfare".to_string(),
            score: TeamScore::default(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn update_replaces_snapshot() {
        let cache = StateCache::new();
        assert!(cache.read().players.is_empty());
        cache.update(snapshot(&[("Fish", "1")]), Vec::new());
        assert_eq!(cache.read().players.len(), 1);
    }

    #[test]
    fn events_delivered_in_tick_order() {
        let cache = StateCache::new();
        let mut rx = cache.subscribe();

        cache.update(snapshot(&[("Fish", "1")]), Vec::new());
        cache.update(snapshot(&[("Fish", "1"), ("Chips", "2")]), Vec::new());

        // Tick 1: Fish joined (and the map appeared).
        let mut joins = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Event::PlayerJoined(p) = event {
                joins.push(p.id.0);
            }
        }
        assert_eq!(joins, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn no_events_without_subscribers_is_fine() {
        let cache = StateCache::new();
        cache.update(snapshot(&[("Fish", "1")]), Vec::new());
        cache.emit_state(ConnectionState::Ready);
    }
}
