//! Engine configuration.
//!
//! Backoff bounds and poll cadence are deliberately configuration,
//! not constants. Structures deserialize from TOML:
//!
//! ```toml
//! connect_timeout_ms = 10000
//! response_timeout_ms = 10000
//!
//! [backoff]
//! initial_ms = 1000
//! max_ms = 30000
//!
//! [poll]
//! interval_secs = 5
//! commands = ["player_ids", "game_state", "logs"]
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Where and how to log in. Immutable for the lifetime of an engine
/// instance; changing the password means building a new engine.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// TCP connect deadline.
    pub connect_timeout_ms: u64,

    /// Per-command response deadline.
    pub response_timeout_ms: u64,

    /// How long to wait for continuation frames of a multi-frame
    /// array response before treating it as complete.
    pub array_grace_ms: u64,

    pub backoff: BackoffConfig,
    pub poll: PollConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            connect_timeout_ms: 10_000,
            response_timeout_ms: 10_000,
            array_grace_ms: 2_000,
            backoff: BackoffConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn array_grace(&self) -> Duration {
        Duration::from_millis(self.array_grace_ms)
    }
}

/// Exponential reconnect backoff bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        BackoffConfig {
            initial_ms: 1_000,
            max_ms: 30_000,
        }
    }
}

impl BackoffConfig {
    pub fn initial(&self) -> Duration {
        Duration::from_millis(self.initial_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

/// One read-only status query the poller runs each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollCommand {
    /// `get playerids`: the connected player list.
    PlayerIds,
    /// `playerinfo <name>` per known player: team, role, level,
    /// score. Expensive; one round-trip per player.
    PlayerDetails,
    /// `get gamestate`: map, score, remaining time.
    GameState,
    /// `showlog <minutes>`: the recent log window.
    Logs,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Poll cadence. An empty `commands` list disables polling.
    pub interval_secs: u64,

    /// Ordered queries to run each tick.
    pub commands: Vec<PollCommand>,

    /// Window passed to `showlog`.
    pub log_window_minutes: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval_secs: 5,
            commands: vec![
                PollCommand::PlayerIds,
                PollCommand::GameState,
                PollCommand::Logs,
            ],
            log_window_minutes: 1,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert!(cfg.backoff.initial() <= cfg.backoff.max());
        assert!(!cfg.poll.commands.is_empty());
    }

    #[test]
    fn toml_round_trip() {
        let cfg = EngineConfig::from_toml(
            "response_timeout_ms = 2500\n\
             [backoff]\n\
             initial_ms = 100\n\
             max_ms = 800\n\
             [poll]\n\
             interval_secs = 2\n\
             commands = [\"player_ids\", \"player_details\", \"game_state\"]\n",
        )
        .unwrap();
        assert_eq!(cfg.response_timeout(), Duration::from_millis(2500));
        assert_eq!(cfg.backoff.max(), Duration::from_millis(800));
        assert_eq!(cfg.poll.commands.len(), 3);
        assert_eq!(cfg.poll.commands[1], PollCommand::PlayerDetails);
        // Unspecified sections keep their defaults.
        assert_eq!(cfg.connect_timeout_ms, 10_000);
    }

    #[test]
    fn zero_interval_clamped() {
        let cfg = PollConfig {
            interval_secs: 0,
            ..PollConfig::default()
        };
        assert_eq!(cfg.interval(), Duration::from_secs(1));
    }
}
