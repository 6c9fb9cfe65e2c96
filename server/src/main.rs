use clap::Parser;
use log::{error, info};
use server::config::ServerConfig;
use server::network::Server;
use shared::{CLIENT_TIMEOUT_MS, MAX_PLAYERS, SERVER_PORT, TICK_RATE};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// UDP port to listen on
    #[arg(short, long, default_value_t = SERVER_PORT)]
    port: u16,

    /// Simulation ticks per second
    #[arg(short, long, default_value_t = TICK_RATE)]
    tick_rate: u32,

    /// Players required before the match starts
    #[arg(short, long, default_value_t = MAX_PLAYERS)]
    max_players: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        tick_rate: args.tick_rate,
        max_players: args.max_players.max(1),
        client_timeout: Duration::from_millis(CLIENT_TIMEOUT_MS),
    };

    info!(
        "Starting server on {} ({} Hz, {} players)",
        config.bind_addr(),
        config.tick_rate,
        config.max_players
    );

    let mut server = match Server::new(&config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server on {}: {}", config.bind_addr(), e);
            return Err(e);
        }
    };

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server loop failed: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
