//! Minimal live console against a real game server.
//!
//! ```sh
//! RCON_HOST=1.2.3.4 RCON_PORT=27015 RCON_PASSWORD=secret \
//!     cargo run --example admin_console
//! ```
//!
//! Connects, tails the event feed, and runs a couple of read
//! commands once the session is ready.

use std::time::Duration;

use anyhow::{Context, Result};
use rcon_client::{ConnectionState, Credentials, EngineConfig, Event, RconEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let credentials = Credentials {
        host: std::env::var("RCON_HOST").context("RCON_HOST not set")?,
        port: std::env::var("RCON_PORT")
            .context("RCON_PORT not set")?
            .parse()
            .context("RCON_PORT is not a port number")?,
        password: std::env::var("RCON_PASSWORD").context("RCON_PASSWORD not set")?,
    };

    let engine = RconEngine::connect(credentials, EngineConfig::default());

    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::ConnectionStateChanged(state) => println!("state: {}", state),
                Event::PlayerJoined(p) => println!("+ {} ({})", p.name, p.id),
                Event::PlayerLeft(p) => println!("- {} ({})", p.name, p.id),
                Event::ScoreChanged { new, .. } => {
                    println!("score: allied {} - axis {}", new.allied, new.axis)
                }
                Event::MapChanged { new, .. } => {
                    println!("map: {}", rcon_client::map_names::pretty(&new))
                }
                Event::LogLine(line) => println!("log: {}", line.raw),
            }
        }
    });

    let mut state = engine.state_changes();
    state
        .wait_for(|s| *s == ConnectionState::Ready)
        .await
        .context("engine stopped before becoming ready")?;

    let name = engine.execute("get name").await?;
    println!("server: {}", name);

    let players = engine.execute_array("get playerids").await?;
    println!("{} players online", players.len());

    // Tail events until interrupted.
    loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        let snapshot = engine.snapshot();
        println!(
            "snapshot: {} players on {}",
            snapshot.players.len(),
            snapshot.map_name
        );
    }
}
