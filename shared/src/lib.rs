//! # Shared game core
//!
//! Everything the server and the client must agree on: board constants,
//! the lane paths, entity pools, team economy, the fixed-step simulation
//! and the datagram formats used to keep clients in sync.
//!
//! The server runs [`sim::step`] on its authoritative [`state::GameState`]
//! and sends each client a [`snapshot::GameSnapshot`]. Clients never
//! simulate in multiplayer; they apply snapshots to a local mirror.

pub mod economy;
pub mod entities;
pub mod geometry;
pub mod path;
pub mod pool;
pub mod protocol;
pub mod sim;
pub mod snapshot;
pub mod state;

use serde::{Deserialize, Serialize};

pub const WINDOW_WIDTH: i32 = 1500;
pub const WINDOW_HEIGHT: i32 = 900;

pub const MAX_ENEMIES: usize = 100;
pub const MAX_TOWERS: usize = 20;
pub const MAX_PROJECTILES: usize = 100;

pub const NUM_TEAMS: usize = 2;
pub const START_LANE_HP: i32 = 100;
pub const START_MONEY: i32 = 200;
/// Seconds between passive income payouts.
pub const MONEY_INTERVAL: f32 = 14.0;
pub const MONEY_GAIN: i32 = 150;

pub const ENEMY_SPEED: f32 = 150.0;
pub const ENEMY_SPAWN_INTERVAL: f32 = 2.5;
pub const NEW_WAVE_BY_ENEMY_SPAWN: u32 = 12;
pub const WAVE_PAUSE_LENGTH: f32 = 5.0;
pub const FIRST_WAVE_DELAY: f32 = 4.0;

pub const PROJECTILE_SPEED: f32 = 3500.0;
pub const HIT_RADIUS_SQUARED: f32 = 100.0;
pub const ATTACK_ANIMATION_TIME: f32 = 0.15;

pub const SERVER_PORT: u16 = 9999;
pub const MAX_PLAYERS: usize = 4;
pub const PACKET_BUFFER_SIZE: usize = 8192;
pub const TICK_RATE: u32 = 60;
/// Upper bound for a single simulation step, in seconds.
pub const MAX_DELTA_TIME: f32 = 0.1;

pub const HEARTBEAT_INTERVAL_MS: u64 = 2000;
pub const READY_RETRY_INTERVAL_MS: u64 = 500;
pub const CLIENT_TIMEOUT_MS: u64 = 10_000;

/// One of the two lanes, and the team defending it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; NUM_TEAMS] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn from_index(index: i32) -> Option<Side> {
        match index {
            0 => Some(Side::Left),
            1 => Some(Side::Right),
            _ => None,
        }
    }

    /// Players 0 and 2 defend the left lane, everyone else the right one.
    pub fn of_player(player_index: i32) -> Side {
        match player_index {
            0 | 2 => Side::Left,
            _ => Side::Right,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
