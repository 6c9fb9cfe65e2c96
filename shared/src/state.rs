use crate::economy::TeamEconomy;
use crate::entities::{tower_prototype, Enemy, Projectile, Tower};
use crate::geometry::Vector2;
use crate::path::Path;
use crate::pool::Pool;
use crate::{
    Side, FIRST_WAVE_DELAY, MAX_ENEMIES, MAX_PROJECTILES, MAX_TOWERS, NUM_TEAMS, START_LANE_HP,
    WINDOW_WIDTH,
};
use log::{debug, info};
use std::sync::Arc;

/// Complete state of one match.
///
/// The server owns the authoritative copy and advances it with
/// [`crate::sim::step`]. Clients keep a mirror that is overwritten by every
/// snapshot they receive.
#[derive(Debug, Clone)]
pub struct GameState {
    pub path: Arc<Path>,
    pub enemies: Pool<Enemy>,
    pub towers: Pool<Tower>,
    pub projectiles: Pool<Projectile>,
    pub economy: [TeamEconomy; NUM_TEAMS],
    pub lane_hp: [i32; NUM_TEAMS],
    pub game_over: bool,
    pub winner: Option<Side>,
    pub current_wave: u32,
    pub spawn_timer: f32,
    pub spawn_counter: u32,
    pub in_wave_delay: bool,
    pub spawn_cooldown: f32,
    /// Tower prototype picked in the placement UI. Never set on a server.
    pub selection: Option<usize>,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_path(Arc::new(Path::new()))
    }

    pub fn with_path(path: Arc<Path>) -> Self {
        Self {
            path,
            enemies: Pool::with_capacity(MAX_ENEMIES),
            towers: Pool::with_capacity(MAX_TOWERS),
            projectiles: Pool::with_capacity(MAX_PROJECTILES),
            economy: [TeamEconomy::new(), TeamEconomy::new()],
            lane_hp: [START_LANE_HP; NUM_TEAMS],
            game_over: false,
            winner: None,
            current_wave: 0,
            spawn_timer: 0.0,
            spawn_counter: 0,
            in_wave_delay: true,
            spawn_cooldown: FIRST_WAVE_DELAY,
            selection: None,
        }
    }

    pub fn economy(&self, side: Side) -> &TeamEconomy {
        &self.economy[side.index()]
    }

    pub fn economy_mut(&mut self, side: Side) -> &mut TeamEconomy {
        &mut self.economy[side.index()]
    }

    pub fn lane_hp(&self, side: Side) -> i32 {
        self.lane_hp[side.index()]
    }

    /// True for x positions inside the central band where nothing may be
    /// built.
    pub fn in_no_build_band(x: i32) -> bool {
        let left = (WINDOW_WIDTH as f64 * 0.45) as i32;
        let right = (WINDOW_WIDTH as f64 * 0.55) as i32;
        x >= left && x <= right
    }

    /// Buys and places a tower for `owner`'s team.
    ///
    /// Returns false without touching the state when the prototype is
    /// unknown, the tower pool is full, the team cannot afford it, or the
    /// position is inside the no-build band.
    pub fn place_tower(&mut self, prototype_index: usize, x: i32, y: i32, owner: i32) -> bool {
        let Some(prototype) = tower_prototype(prototype_index) else {
            debug!("Unknown tower type {}", prototype_index);
            return false;
        };

        if self.towers.is_full() {
            debug!("Tower limit reached, rejecting placement at ({}, {})", x, y);
            return false;
        }

        let team = Side::of_player(owner);
        if !self.economy(team).can_afford(prototype.cost) {
            debug!(
                "Team {:?} cannot afford tower {} (cost {}, balance {})",
                team,
                prototype_index,
                prototype.cost,
                self.economy(team).balance()
            );
            return false;
        }

        if Self::in_no_build_band(x) {
            debug!("Rejecting placement inside the no-build band at x={}", x);
            return false;
        }

        if !self.economy_mut(team).try_debit(prototype.cost) {
            return false;
        }

        let position = Vector2::new(x as f32, y as f32);
        let tower = Tower::from_prototype(prototype_index, prototype, position, owner);
        if self.towers.push(tower).is_none() {
            // Capacity was checked above.
            self.economy_mut(team).credit(prototype.cost);
            return false;
        }

        info!(
            "Placed tower type {} at ({}, {}) for player {}. Team {:?} balance: {}",
            prototype_index,
            x,
            y,
            owner,
            team,
            self.economy(team).balance()
        );
        true
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
