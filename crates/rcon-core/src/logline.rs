//! `showlog` line parsing.
//!
//! Each line starts with a relative-age bracket that embeds a unix
//! timestamp, followed by an upper-case event tag:
//!
//! ```text
//! [29:40 min (1639106251)] KILL: A(Allies/765611...) -> B(Axis/765611...) with M1 GARAND
//! [5.1 sec (1639106303)] CHAT[Team][A(Allies/765611...)]: push left
//! [1:02 min (1639106251)] CONNECTED A (765611...)
//! ```
//!
//! Only the timestamp and the coarse kind are lifted out; the full
//! line is kept verbatim for subscribers that want to do their own
//! parsing.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    Kill,
    TeamKill,
    Chat,
    Connected,
    Disconnected,
    MatchStart,
    MatchEnd,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Absolute event time recovered from the bracket, when present.
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: LogKind,
    /// The line as received, bracket included.
    pub raw: String,
}

impl LogLine {
    pub fn parse(line: &str) -> LogLine {
        let (timestamp, rest) = split_bracket(line);
        LogLine {
            timestamp,
            kind: classify(rest),
            raw: line.to_string(),
        }
    }

    /// Identity of this event independent of the bracket's relative
    /// age, which moves every time `showlog` is queried. Two queries
    /// report the same event with the same unix timestamp and body.
    pub fn dedup_key(&self) -> String {
        let (timestamp, rest) = split_bracket(&self.raw);
        match timestamp {
            Some(t) => format!("{}|{}", t.timestamp(), rest),
            None => self.raw.clone(),
        }
    }
}

/// Pull the unix timestamp out of `[29:40 min (1639106251)] ...` and
/// return it with the text after the bracket.
fn split_bracket(line: &str) -> (Option<DateTime<Utc>>, &str) {
    let Some(stripped) = line.strip_prefix('[') else {
        return (None, line);
    };
    let Some(close) = stripped.find(']') else {
        return (None, line);
    };
    let (bracket, rest) = stripped.split_at(close);
    let rest = rest[1..].trim_start();

    let timestamp = bracket
        .rsplit_once('(')
        .and_then(|(_, t)| t.strip_suffix(')'))
        .and_then(|t| t.trim().parse::<i64>().ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

    (timestamp, rest)
}

fn classify(rest: &str) -> LogKind {
    if rest.starts_with("KILL:") {
        LogKind::Kill
    } else if rest.starts_with("TEAM KILL:") {
        LogKind::TeamKill
    } else if rest.starts_with("CHAT") {
        LogKind::Chat
    } else if rest.starts_with("CONNECTED") {
        LogKind::Connected
    } else if rest.starts_with("DISCONNECTED") {
        LogKind::Disconnected
    } else if rest.starts_with("MATCH START") {
        LogKind::MatchStart
    } else if rest.starts_with("MATCH ENDED") {
        LogKind::MatchEnd
    } else {
        LogKind::Other
    }
}
