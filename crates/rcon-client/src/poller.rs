//! Cadenced read-only status polling.
//!
//! The protocol has no server push; all live data comes from running
//! read commands on an interval. Poll requests go through the same
//! dispatcher FIFO as ad-hoc commands (plain arrival order, no
//! priority), so neither interactive commands nor the live feed can
//! starve the other.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rcon_core::{ConnectionState, GameSnapshot, GameState, LogLine, PlayerInfo, TeamScore};
use rcon_protocol::{unpack_array, STATUS_FAIL};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

use crate::cache::StateCache;
use crate::config::{EngineConfig, PollCommand};
use crate::dispatcher::{submit, CommandTx};
use crate::error::RconError;

pub(crate) async fn run(
    cfg: Arc<EngineConfig>,
    state: watch::Receiver<ConnectionState>,
    tx: CommandTx,
    cache: Arc<StateCache>,
    mut shutdown: watch::Receiver<bool>,
) {
    if cfg.poll.commands.is_empty() {
        debug!("polling disabled (no commands configured)");
        return;
    }

    let mut ticker = interval(cfg.poll.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Dedup keys of log lines from the previous tick's window;
    // `showlog` windows overlap between ticks.
    let mut seen_logs: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            _ = shutdown.wait_for(|stop| *stop) => return,
            _ = ticker.tick() => {}
        }

        // Absence of data while disconnected is expected, not an
        // error: skip the tick silently.
        if !state.borrow().is_ready() {
            trace!("skipping poll tick, session not ready");
            continue;
        }

        if let Err(err) = poll_once(&cfg, &tx, &cache, &mut seen_logs).await {
            // A tick dying mid-disconnect is routine; the session
            // manager is already handling the connection.
            debug!(%err, "poll tick failed");
        }
    }
}

/// Run the configured commands in order and hand the resulting
/// snapshot (plus any new log lines) to the cache.
async fn poll_once(
    cfg: &EngineConfig,
    tx: &CommandTx,
    cache: &StateCache,
    seen_logs: &mut HashSet<String>,
) -> Result<(), RconError> {
    let prev = cache.read();

    let mut players: Option<Vec<PlayerInfo>> = None;
    let mut map_name = prev.map_name.clone();
    let mut score = prev.score;
    let mut new_logs: Vec<LogLine> = Vec::new();

    for command in &cfg.poll.commands {
        match command {
            PollCommand::PlayerIds => {
                let text = submit(tx, "get playerids".to_string(), true).await?;
                let entries = unpack_array(&text)?;
                players = Some(
                    entries
                        .iter()
                        .filter_map(|entry| PlayerInfo::from_list_entry(entry))
                        .collect(),
                );
            }
            PollCommand::PlayerDetails => {
                // Enrich this tick's list, or last tick's if the list
                // command is not configured ahead of this one.
                let list = players.get_or_insert_with(|| prev.players.clone());
                for player in list.iter_mut() {
                    let text = submit(tx, format!("playerinfo {}", player.name), false).await?;
                    if text != STATUS_FAIL {
                        player.apply_details(&text);
                    }
                }
            }
            PollCommand::GameState => {
                let text = submit(tx, "get gamestate".to_string(), false).await?;
                if let Some(gs) = GameState::parse(&text) {
                    map_name = gs.map;
                    score = TeamScore {
                        allied: gs.allied_score,
                        axis: gs.axis_score,
                    };
                }
            }
            PollCommand::Logs => {
                let text = submit(
                    tx,
                    format!("showlog {}", cfg.poll.log_window_minutes),
                    false,
                )
                .await?;
                new_logs = extract_new_logs(&text, seen_logs);
            }
        }
    }

    let snapshot = GameSnapshot {
        players: players.unwrap_or_else(|| prev.players.clone()),
        map_name,
        score,
        last_updated: Utc::now(),
    };
    cache.update(snapshot, new_logs);
    Ok(())
}

/// Keep only lines whose dedup key was absent from the previous
/// window, then remember the current window's keys.
fn extract_new_logs(text: &str, seen: &mut HashSet<String>) -> Vec<LogLine> {
    let lines: Vec<LogLine> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && *line != "EMPTY")
        .map(LogLine::parse)
        .collect();

    let new: Vec<LogLine> = lines
        .iter()
        .filter(|line| !seen.contains(&line.dedup_key()))
        .cloned()
        .collect();

    seen.clear();
    seen.extend(lines.iter().map(|line| line.dedup_key()));
    new
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcon_core::LogKind;

    #[test]
    fn new_logs_deduped_across_overlapping_windows() {
        let mut seen = HashSet::new();

        let first = extract_new_logs(
            "[10 sec (1639106300)] CONNECTED A (1)\n\
             [5 sec (1639106305)] KILL: A(Allies/1) -> B(Axis/2) with K98",
            &mut seen,
        );
        assert_eq!(first.len(), 2);

        // The second window repeats the kill (with a different
        // relative age) and adds a disconnect.
        let second = extract_new_logs(
            "[15 sec (1639106305)] KILL: A(Allies/1) -> B(Axis/2) with K98\n\
             [2 sec (1639106318)] DISCONNECTED B (2)",
            &mut seen,
        );
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].kind, LogKind::Disconnected);
    }

    #[test]
    fn empty_window_yields_nothing() {
        let mut seen = HashSet::new();
        assert!(extract_new_logs("EMPTY", &mut seen).is_empty());
        assert!(extract_new_logs("", &mut seen).is_empty());
    }
}
