//! Session lifecycle: connect, authenticate, detect failure,
//! reconnect with backoff.
//!
//! State machine:
//!
//! ```text
//! Disconnected → Connecting → Authenticating → Ready
//!      ↑                                         │ I/O failure
//!      └─────────────── backoff ─────────────────┘
//! ```
//!
//! Auth rejection is terminal (`Failed`): hammering a game server
//! with bad passwords risks a lockout, so new credentials require a
//! new engine instance. Everything else reconnects forever with
//! bounded exponential backoff, since the game server is expected to
//! eventually come back.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rcon_core::ConnectionState;
use rcon_protocol::{XorKey, STATUS_SUCCESS};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::cache::StateCache;
use crate::config::{BackoffConfig, Credentials, EngineConfig};
use crate::connection::Connection;
use crate::dispatcher::{self, CommandRx};
use crate::error::RconError;

/// Supervisor loop. Owns the connection state and the command queue
/// receiver for the lifetime of the engine; every successful
/// authentication re-arms a fresh dispatcher loop bound to the new
/// connection.
pub(crate) async fn run(
    creds: Credentials,
    cfg: Arc<EngineConfig>,
    state: watch::Sender<ConnectionState>,
    mut rx: CommandRx,
    mut shutdown: watch::Receiver<bool>,
    cache: Arc<StateCache>,
) {
    let mut backoff = Backoff::new(cfg.backoff.clone());

    loop {
        set_state(&state, &cache, ConnectionState::Connecting);

        let opened = tokio::select! {
            _ = shutdown.wait_for(|stop| *stop) => break,
            opened = Connection::open(&creds.host, creds.port, cfg.connect_timeout()) => opened,
        };

        let mut conn = match opened {
            Ok(conn) => conn,
            Err(err) => {
                warn!(host = %creds.host, port = creds.port, %err, "connect failed");
                set_state(&state, &cache, ConnectionState::Disconnected);
                if !backoff.sleep_or_shutdown(&mut shutdown).await {
                    break;
                }
                continue;
            }
        };

        set_state(&state, &cache, ConnectionState::Authenticating);
        let key = match authenticate(&mut conn, &creds, &cfg).await {
            Ok(key) => key,
            Err(RconError::AuthRejected) => {
                error!(host = %creds.host, "authentication rejected, giving up");
                conn.close().await;
                set_state(&state, &cache, ConnectionState::Failed);
                // Terminal: no reconnect with credentials the server
                // already refused.
                return;
            }
            Err(err) => {
                warn!(%err, "handshake failed");
                conn.close().await;
                set_state(&state, &cache, ConnectionState::Disconnected);
                if !backoff.sleep_or_shutdown(&mut shutdown).await {
                    break;
                }
                continue;
            }
        };

        info!(host = %creds.host, port = creds.port, "session ready");
        backoff.reset();
        set_state(&state, &cache, ConnectionState::Ready);

        let err = dispatcher::serve(&mut conn, &key, &mut rx, &mut shutdown, &cfg).await;
        conn.close().await;

        if matches!(err, RconError::Shutdown) {
            break;
        }

        warn!(%err, "session ended, will reconnect");
        set_state(&state, &cache, ConnectionState::Disconnected);
        if !backoff.sleep_or_shutdown(&mut shutdown).await {
            break;
        }
    }

    set_state(&state, &cache, ConnectionState::Disconnected);
    debug!("session supervisor stopped");
}

/// The handshake: the server's first frame is the XOR key, then a
/// `login <password>` exchange answered by `SUCCESS` or `FAIL`.
async fn authenticate(
    conn: &mut Connection,
    creds: &Credentials,
    cfg: &EngineConfig,
) -> Result<XorKey, RconError> {
    let key = conn.recv_key(cfg.response_timeout()).await?;
    debug!(key_len = key.len(), "received XOR key");

    let login = format!("login {}", creds.password);
    conn.send_frame(&key.apply(login.as_bytes())).await?;

    let response = conn.recv_frame(cfg.response_timeout()).await?;
    let text = key.apply_str(&response)?;
    if text == STATUS_SUCCESS {
        Ok(key)
    } else {
        Err(RconError::AuthRejected)
    }
}

fn set_state(
    state: &watch::Sender<ConnectionState>,
    cache: &StateCache,
    new: ConnectionState,
) {
    let changed = state.send_if_modified(|current| {
        if *current == new {
            false
        } else {
            *current = new;
            true
        }
    });
    if changed {
        info!(state = %new, "connection state");
        cache.emit_state(new);
    }
}

/// Exponential backoff with jitter and a bounded maximum.
struct Backoff {
    cfg: BackoffConfig,
    next: Duration,
}

impl Backoff {
    fn new(cfg: BackoffConfig) -> Backoff {
        let next = cfg.initial();
        Backoff { cfg, next }
    }

    fn reset(&mut self) {
        self.next = self.cfg.initial();
    }

    /// Current delay plus up to 25% jitter, doubling the base for
    /// next time. Jitter keeps a fleet of engines from reconnecting
    /// in lockstep after a server restart.
    fn delay(&mut self) -> Duration {
        let base = self.next;
        self.next = (base * 2).min(self.cfg.max());

        let jitter_ms = base.as_millis() as u64 / 4;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        base + jitter
    }

    /// Sleep out the backoff delay. Returns `false` when shutdown was
    /// requested mid-sleep.
    async fn sleep_or_shutdown(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let delay = self.delay();
        debug!(?delay, "reconnect backoff");
        tokio::select! {
            _ = shutdown.wait_for(|stop| *stop) => false,
            _ = sleep(delay) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_to_bound() {
        let mut backoff = Backoff::new(BackoffConfig {
            initial_ms: 100,
            max_ms: 400,
        });
        let first = backoff.delay();
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(125));
        let second = backoff.delay();
        assert!(second >= Duration::from_millis(200) && second <= Duration::from_millis(250));
        // Bounded: base never exceeds the configured max.
        for _ in 0..10 {
            assert!(backoff.delay() <= Duration::from_millis(500));
        }
    }

    #[test]
    fn backoff_reset_restarts_sequence() {
        let mut backoff = Backoff::new(BackoffConfig {
            initial_ms: 100,
            max_ms: 10_000,
        });
        backoff.delay();
        backoff.delay();
        backoff.reset();
        assert!(backoff.delay() <= Duration::from_millis(125));
    }
}
