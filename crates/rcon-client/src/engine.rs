//! The boundary contract exposed to the web layer.
//!
//! One [`RconEngine`] == one game server. The web layer instantiates
//! one engine per managed server and shares it (behind an `Arc`)
//! among its request handlers; every method here takes `&self` and
//! is safe to call concurrently.

use std::sync::Arc;

use rcon_core::{ConnectionState, Event, GameSnapshot};
use rcon_protocol::{unpack_array, STATUS_FAIL};
use tokio::sync::{broadcast, mpsc, watch};

use crate::cache::StateCache;
use crate::config::{Credentials, EngineConfig};
use crate::dispatcher::{self, CommandTx};
use crate::error::RconError;
use crate::{poller, session};

pub struct RconEngine {
    state: watch::Receiver<ConnectionState>,
    commands: CommandTx,
    cache: Arc<StateCache>,
    shutdown: watch::Sender<bool>,
}

impl RconEngine {
    /// Build the engine and start connecting in the background.
    ///
    /// Returns immediately; watch [`RconEngine::state`] (or subscribe
    /// to `ConnectionStateChanged` events) to learn when the session
    /// is ready. Credentials are fixed for the engine's lifetime.
    pub fn connect(credentials: Credentials, config: EngineConfig) -> RconEngine {
        let config = Arc::new(config);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let cache = Arc::new(StateCache::new());

        tokio::spawn(session::run(
            credentials,
            config.clone(),
            state_tx,
            cmd_rx,
            shutdown_rx.clone(),
            cache.clone(),
        ));
        tokio::spawn(poller::run(
            config,
            state_rx.clone(),
            cmd_tx.clone(),
            cache.clone(),
            shutdown_rx,
        ));

        RconEngine {
            state: state_rx,
            commands: cmd_tx,
            cache,
            shutdown: shutdown_tx,
        }
    }

    /// Stop the session and the poller. Terminal; queued commands
    /// fail and no reconnection follows.
    pub fn disconnect(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A watch on state transitions, for callers that want to await
    /// readiness rather than poll.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Run one command and wait for its response text.
    ///
    /// Safe to call from many tasks at once; submissions are served
    /// strictly in arrival order over the single wire connection, and
    /// this call blocks (asynchronously) until its turn resolves;
    /// intentional backpressure against a slow or absent server.
    /// Fails fast with [`RconError::NotReady`] outside the `Ready`
    /// state.
    pub async fn execute(&self, command: &str) -> Result<String, RconError> {
        if !self.state().is_ready() {
            return Err(RconError::NotReady);
        }
        dispatcher::submit(&self.commands, command.to_string(), false).await
    }

    /// Like [`RconEngine::execute`], but unpack a tab-array response,
    /// following continuation frames until the declared entry count
    /// is satisfied.
    pub async fn execute_array(&self, command: &str) -> Result<Vec<String>, RconError> {
        if !self.state().is_ready() {
            return Err(RconError::NotReady);
        }
        let text = dispatcher::submit(&self.commands, command.to_string(), true).await?;
        if text == STATUS_FAIL {
            return Err(RconError::CommandFailed);
        }
        Ok(unpack_array(&text)?)
    }

    /// Register for state-change and game events. Dropping the
    /// receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.cache.subscribe()
    }

    /// The latest polled snapshot; never touches the network.
    pub fn snapshot(&self) -> Arc<GameSnapshot> {
        self.cache.read()
    }
}

impl Drop for RconEngine {
    fn drop(&mut self) {
        // Background tasks must not outlive the engine.
        let _ = self.shutdown.send(true);
    }
}
