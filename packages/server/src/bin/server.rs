//! Tagged chat relay server.
//!
//! Broadcasts every received message to all connected WebSocket clients and
//! periodically catches connections up on tagged messages.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tagrelay-server
//! cargo run --bin tagrelay-server -- --host 0.0.0.0 --port 3000
//! THROTTLE=10 OPENSEARCH_URL=https://localhost:9200 cargo run --bin tagrelay-server
//! ```

use std::sync::Arc;

use clap::Parser;
use tagrelay_server::{
    config::RelayConfig,
    startup::{build, open_store},
    ui::Server,
};
use tagrelay_shared::{
    logger::setup_logger,
    time::{MonotonicClock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "tagrelay-server")]
#[command(about = "Tagged chat relay with WebSocket broadcast and periodic tag sync", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8001")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = RelayConfig::from_env();
    tracing::info!(
        "Tag-sync interval: {}s",
        config.sync_interval.as_secs()
    );

    // Initialize dependencies in order:
    // 1. Store (schema + tag catalog are fatal on failure)
    // 2. Registry, UseCases, AppState
    // 3. Tag-sync scheduler
    // 4. Server
    let store = match open_store(&config.storage) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let clock = Arc::new(MonotonicClock::new(SystemClock));
    let relay = match build(store, clock, config.sync_interval).await {
        Ok(relay) => relay,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let _scheduler = relay.scheduler.clone().spawn();

    let server = Server::new(relay.state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
