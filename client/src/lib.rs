//! # Tower Defense Client Library
//!
//! Client side of the two-lane tower defense game. A networked client never
//! simulates: it keeps a mirror of the server's match, overwritten by every
//! snapshot, and only sends placement requests and keep-alives. The same
//! crate also hosts the singleplayer driver, which runs the shared
//! simulation locally.
//!
//! ## Module Organization
//!
//! - `config`: server address and frame pacing
//! - `session`: connection state machine, free of I/O
//! - `game`: the snapshot-fed mirror and tower facings
//! - `input`: player intents and client-side placement rules
//! - `presenter`: the output seam, plus a `log`-backed implementation
//! - `network`: the UDP socket and the frame loop
//! - `local`: singleplayer
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::ClientConfig;
//! use client::input::InputManager;
//! use client::network::Client;
//! use client::presenter::LogPresenter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let mut client = Client::connect(&config, LogPresenter::new(), InputManager::new()).await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod game;
pub mod input;
pub mod local;
pub mod network;
pub mod presenter;
pub mod session;
