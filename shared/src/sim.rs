//! Fixed-step simulation.
//!
//! [`step`] advances a [`GameState`] by `dt` seconds. It is deterministic:
//! two states that compare equal stay equal when stepped with the same `dt`.
//! Nothing here touches sockets, sprites or sounds. Anything a presenter
//! should react to is reported through [`TickEvents`].

use crate::entities::{Enemy, Projectile, Tower, ENEMY_BASE_HP};
use crate::geometry::Vector2;
use crate::state::GameState;
use crate::{
    Side, ENEMY_SPAWN_INTERVAL, HIT_RADIUS_SQUARED, NEW_WAVE_BY_ENEMY_SPAWN, NUM_TEAMS,
    PROJECTILE_SPEED, WAVE_PAUSE_LENGTH, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use log::{debug, info};
use std::sync::Arc;

/// Audio cues for whoever presents the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Pop,
    LevelUp,
    MusicStart,
    MusicStop,
}

/// What happened during one [`step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    pub cues: Vec<Cue>,
    pub shots_fired: u32,
    pub projectile_hits: u32,
    pub enemies_killed: u32,
    /// Set when a wave began during this step.
    pub wave_started: Option<u32>,
    /// Hit points of enemies that reached the end of each lane.
    pub leaked_hp: [i32; NUM_TEAMS],
    /// True only on the step that ended the game.
    pub game_over: bool,
}

/// Outcome of one spawn event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned,
    WaveDelay,
    Dropped,
}

/// Advances the match by `dt` seconds.
///
/// Order: economy, wave scheduling, enemy movement, tower attacks,
/// projectiles, win condition. A finished game and a non-positive `dt` are
/// left untouched.
pub fn step(state: &mut GameState, dt: f32) -> TickEvents {
    let mut events = TickEvents::default();
    if state.game_over || dt <= 0.0 {
        return events;
    }

    for economy in state.economy.iter_mut() {
        economy.tick(dt);
    }
    schedule_waves(state, dt, &mut events);
    update_enemies(state, dt, &mut events);
    update_towers(state, dt, &mut events);
    update_projectiles(state, dt, &mut events);
    check_win_condition(state, &mut events);

    events
}

/// Hit points for an enemy of `type_slot` spawned during `wave`.
pub fn enemy_hp_for_wave(type_slot: u8, wave: u32) -> i32 {
    let base = ENEMY_BASE_HP[type_slot as usize % ENEMY_BASE_HP.len()];
    let mut scaling = 1.0f32;
    for k in 1..=wave {
        scaling *= 1.0 + 0.2 + 0.04 * (k - 1) as f32;
    }
    (base as f32 * scaling).ceil() as i32
}

pub fn schedule_waves(state: &mut GameState, dt: f32, events: &mut TickEvents) {
    if state.in_wave_delay {
        state.spawn_cooldown -= dt;
        if state.spawn_cooldown <= 0.0 {
            state.in_wave_delay = false;
            if state.current_wave > 0 {
                events.cues.push(Cue::LevelUp);
                // Next scheduling step spawns right away.
                state.spawn_timer = ENEMY_SPAWN_INTERVAL;
            }
            state.current_wave += 1;
            events.wave_started = Some(state.current_wave);
            info!("Wave {} started", state.current_wave);
        }
        return;
    }

    state.spawn_timer += dt;
    if state.spawn_timer >= ENEMY_SPAWN_INTERVAL {
        state.spawn_timer -= ENEMY_SPAWN_INTERVAL;
        spawn_enemy_pair(state);
    }
}

/// One spawn event: a mirrored pair of enemies, or the start of a wave pause
/// on every `NEW_WAVE_BY_ENEMY_SPAWN`th event.
pub fn spawn_enemy_pair(state: &mut GameState) -> SpawnOutcome {
    if state.enemies.remaining() < 2 {
        debug!("Enemy pool nearly full, skipping spawn");
        return SpawnOutcome::Dropped;
    }

    state.spawn_counter += 1;
    if state.spawn_counter % NEW_WAVE_BY_ENEMY_SPAWN == 0 {
        state.in_wave_delay = true;
        state.spawn_cooldown = WAVE_PAUSE_LENGTH;
        debug!("Wave {} finished spawning", state.current_wave);
        return SpawnOutcome::WaveDelay;
    }

    let type_slot = (state.spawn_counter % 3) as u8;
    let hp = enemy_hp_for_wave(type_slot, state.current_wave);
    for side in Side::BOTH {
        let start = state.path.point_at(side, 0);
        state.enemies.push(Enemy::spawn(side, type_slot, hp, start));
    }
    SpawnOutcome::Spawned
}

pub fn update_enemies(state: &mut GameState, dt: f32, events: &mut TickEvents) {
    let path = Arc::clone(&state.path);
    let last_segment = path.num_points() - 1;

    let mut i = 0;
    while i < state.enemies.len() {
        let leaked = {
            let Some(enemy) = state.enemies.get_mut(i) else {
                break;
            };
            if !enemy.active {
                state.enemies.swap_remove(i);
                continue;
            }
            if enemy.segment >= last_segment {
                i += 1;
                continue;
            }

            let Some((start, end)) = path.segment(enemy.side, enemy.segment) else {
                i += 1;
                continue;
            };
            let length = start.distance_to(&end);
            if length > f32::EPSILON {
                enemy.progress += enemy.speed * dt / length;
            } else {
                enemy.progress = 1.0;
            }

            if enemy.progress >= 1.0 {
                enemy.segment += 1;
                if enemy.segment >= last_segment {
                    enemy.active = false;
                    Some((enemy.side, enemy.hp))
                } else {
                    enemy.progress = 0.0;
                    None
                }
            } else {
                None
            }
        };

        if let Some((side, hp)) = leaked {
            let lane = &mut state.lane_hp[side.index()];
            *lane = (*lane - hp).max(0);
            events.leaked_hp[side.index()] += hp;
            debug!("Enemy leaked on {:?} lane for {} hp", side, hp);
            // Removed on the next pass over this slot.
            continue;
        }

        if let Some(enemy) = state.enemies.get_mut(i) {
            if let Some((start, end)) = path.segment(enemy.side, enemy.segment) {
                enemy.position = start.lerp(&end, enemy.progress);
                enemy.angle = end.sub(&start).heading_degrees();
            }
        }
        i += 1;
    }
}

/// Index of the most advanced enemy `tower` can reach, if any.
pub fn find_target(tower: &Tower, enemies: &[Enemy]) -> Option<usize> {
    let affinity = tower.affinity();
    let mut best_progress = -1.0f32;
    let mut target = None;

    for (index, enemy) in enemies.iter().enumerate() {
        if !enemy.active || !affinity.accepts(enemy.side) {
            continue;
        }
        if tower.position.distance_to(&enemy.position) <= tower.range {
            let progress = enemy.path_progress();
            if progress > best_progress {
                best_progress = progress;
                target = Some(index);
            }
        }
    }

    target
}

pub fn update_towers(state: &mut GameState, dt: f32, events: &mut TickEvents) {
    let GameState {
        towers,
        enemies,
        projectiles,
        ..
    } = state;

    for tower in towers.iter_mut() {
        if !tower.active {
            continue;
        }
        tower.advance_timers(dt);

        let Some(target_index) = find_target(tower, enemies.as_slice()) else {
            continue;
        };
        if !tower.ready_to_fire() {
            continue;
        }
        let Some(target) = enemies.get_mut(target_index) else {
            continue;
        };

        tower.begin_attack();
        events.cues.push(Cue::Pop);
        events.shots_fired += 1;

        if target.take_damage(tower.damage) {
            events.enemies_killed += 1;
        }

        let projectile = Projectile::aimed(tower.position, target.position, tower.projectile_kind);
        if projectiles.push(projectile).is_none() {
            debug!("Projectile pool full, shot not drawn");
        }
    }
}

/// Facing angle of every live tower toward its current target, 0 when it
/// has none. Indexed like `state.towers`.
pub fn tower_rotations(state: &GameState) -> Vec<f32> {
    let enemies = state.enemies.as_slice();
    state
        .towers
        .iter()
        .map(|tower| {
            if !tower.active {
                return 0.0;
            }
            find_target(tower, enemies)
                .map(|index| enemies[index].position.sub(&tower.position).heading_degrees())
                .unwrap_or(0.0)
        })
        .collect()
}

fn in_play_area(position: Vector2) -> bool {
    position.x >= 0.0
        && position.x <= WINDOW_WIDTH as f32
        && position.y >= 0.0
        && position.y <= WINDOW_HEIGHT as f32
}

pub fn update_projectiles(state: &mut GameState, dt: f32, events: &mut TickEvents) {
    let GameState {
        projectiles,
        enemies,
        ..
    } = state;

    let mut i = 0;
    while i < projectiles.len() {
        let Some(projectile) = projectiles.get_mut(i) else {
            break;
        };
        projectile.position = projectile
            .position
            .add(&projectile.velocity.scale(PROJECTILE_SPEED * dt));
        let position = projectile.position;

        if !in_play_area(position) {
            projectiles.swap_remove(i);
            continue;
        }

        let hit = enemies.iter().any(|enemy| {
            enemy.active && enemy.position.distance_squared_to(&position) < HIT_RADIUS_SQUARED
        });
        if hit {
            events.projectile_hits += 1;
            projectiles.swap_remove(i);
            continue;
        }

        i += 1;
    }
}

pub fn check_win_condition(state: &mut GameState, events: &mut TickEvents) {
    if state.game_over {
        return;
    }
    let left = state.lane_hp(Side::Left);
    let right = state.lane_hp(Side::Right);
    if left > 0 && right > 0 {
        return;
    }

    state.game_over = true;
    state.winner = Some(if left <= 0 { Side::Right } else { Side::Left });
    events.game_over = true;
    info!(
        "Game over: left lane {} hp, right lane {} hp, winner {:?}",
        left, right, state.winner
    );
}
