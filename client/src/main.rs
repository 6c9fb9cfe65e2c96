use clap::Parser;
use client::config::ClientConfig;
use client::input::{parse_placement, InputManager, ScriptedPlacement};
use client::local::run_singleplayer;
use client::network::Client;
use client::presenter::LogPresenter;
use log::{error, info};
use shared::SERVER_PORT;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1")]
    server: String,

    /// Server UDP port
    #[arg(short, long, default_value_t = SERVER_PORT)]
    port: u16,

    /// Play locally without a server
    #[arg(long)]
    singleplayer: bool,

    /// Tower to place once the match runs, as SLOT:X:Y (repeatable)
    #[arg(long = "place", value_parser = parse_placement)]
    placements: Vec<ScriptedPlacement>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let mut input = InputManager::with_script(&args.placements);
    if !args.placements.is_empty() {
        info!("{} scripted placements queued", args.placements.len());
    }

    if args.singleplayer {
        info!("Starting singleplayer game");
        let mut presenter = LogPresenter::new();
        tokio::select! {
            result = run_singleplayer(&mut presenter, &mut input) => result?,
            _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
        }
        return Ok(());
    }

    let config = ClientConfig {
        host: args.server,
        port: args.port,
        ..ClientConfig::default()
    };
    info!("Starting client, server at {}", config.server_addr());

    let mut client = match Client::connect(&config, LogPresenter::new(), input).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to connect to {}: {}", config.server_addr(), e);
            return Err(e);
        }
    };

    tokio::select! {
        result = client.run() => {
            if let Err(e) = result {
                error!("Client loop failed: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
