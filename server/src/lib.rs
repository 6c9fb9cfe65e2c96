//! # Tower Defense Server Library
//!
//! Authoritative server for the two-lane tower defense game. It owns the
//! only simulated copy of the match, validates tower placements and sends
//! every client a full snapshot of the board each tick.
//!
//! ## Core Responsibilities
//!
//! ### Lobby
//! Clients announce themselves with `READY`. Each new address claims the
//! next player index and is told so with `ASSIGN_INDEX`. While the roster is
//! incomplete the server broadcasts the connected count once per second.
//! The match starts only when every slot is claimed and ready.
//!
//! ### Authoritative Simulation
//! Once running, the server advances [`shared::sim::step`] once per tick
//! with a delta time capped at 100ms. All datagrams that arrived since the
//! previous tick are applied first.
//!
//! ### State Broadcasting
//! Every tick each client receives a `STATE_UPDATE` carrying a snapshot
//! with its own team's balance. When a lane falls the server sends one
//! `GAME_OVER` snapshot per client and stops advancing.
//!
//! ## Module Organization
//!
//! - `client_manager`: player slots, ready flags and liveness timestamps
//! - `config`: bind address, tick rate and roster size
//! - `session`: the lobby/match state machine, free of I/O
//! - `network`: the UDP socket and the tick loop driving the session
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         max_players: 2,
//!         ..ServerConfig::default()
//!     };
//!     let mut server = Server::new(&config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod network;
pub mod session;
