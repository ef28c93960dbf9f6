//! In-process mock game server for integration tests.
//!
//! Speaks the real wire protocol: sends the XOR key frame on accept,
//! answers `login <password>` with SUCCESS/FAIL, then delegates every
//! other command to a test-supplied responder. Connections are served
//! one at a time; the engine under test only ever holds one.

// Each test binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rcon_client::{BackoffConfig, ConnectionState, Credentials, EngineConfig, PollConfig, RconEngine};
use rcon_protocol::{encode_frame, XorKey};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

pub const KEY: &[u8; 4] = &[0x11, 0x57, 0x99, 0x22];

/// What the mock answers to one decoded command.
pub enum Reply {
    /// One frame carrying this text.
    Text(String),
    /// The same response split across several frames.
    Frames(Vec<String>),
    /// No reply at all; provokes a command timeout.
    Silence,
    /// Wait this long, then drop the connection without replying.
    DelayedClose(Duration),
}

pub type Responder = Arc<dyn Fn(&str) -> Reply + Send + Sync>;

pub struct MockServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
}

impl MockServer {
    pub async fn spawn(password: &str, responder: Responder) -> MockServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));

        let conns = connections.clone();
        let password = password.to_string();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                conns.fetch_add(1, Ordering::SeqCst);
                let _ = handle_connection(stream, &password, &responder).await;
            }
        });

        MockServer { addr, connections }
    }

    /// How many TCP connections have been accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn credentials(&self, password: &str) -> Credentials {
        Credentials {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            password: password.to_string(),
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    password: &str,
    responder: &Responder,
) -> std::io::Result<()> {
    let key = XorKey::new(KEY.to_vec()).unwrap();
    stream.write_all(&encode_frame(KEY)).await?;

    loop {
        let payload = read_frame(&mut stream).await?;
        let text = key.apply_str(&payload).expect("mock received invalid utf8");

        if let Some(supplied) = text.strip_prefix("login ") {
            let status = if supplied == password { "SUCCESS" } else { "FAIL" };
            write_frame(&mut stream, &key, status).await?;
            continue;
        }

        match responder.as_ref()(&text) {
            Reply::Text(body) => write_frame(&mut stream, &key, &body).await?,
            Reply::Frames(parts) => {
                for part in parts {
                    write_frame(&mut stream, &key, &part).await?;
                }
            }
            Reply::Silence => {}
            Reply::DelayedClose(delay) => {
                tokio::time::sleep(delay).await;
                return Ok(());
            }
        }
    }
}

async fn read_frame(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}

async fn write_frame(stream: &mut TcpStream, key: &XorKey, text: &str) -> std::io::Result<()> {
    stream
        .write_all(&encode_frame(&key.apply(text.as_bytes())))
        .await
}

/// Tight timings so tests run in milliseconds; polling disabled
/// unless a test configures it explicitly.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        connect_timeout_ms: 1_000,
        response_timeout_ms: 500,
        array_grace_ms: 100,
        backoff: BackoffConfig {
            initial_ms: 50,
            max_ms: 200,
        },
        poll: PollConfig {
            interval_secs: 1,
            commands: Vec::new(),
            log_window_minutes: 1,
        },
    }
}

/// Await a state the engine is expected to reach shortly.
pub async fn wait_for_state(engine: &RconEngine, target: ConnectionState) {
    let mut rx = engine.state_changes();
    let _ = timeout(Duration::from_secs(5), rx.wait_for(|state| *state == target))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for state {}", target))
        .expect("state channel closed");
}
