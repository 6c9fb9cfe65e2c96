use crate::entities::{damage_tier, tower_prototype, Enemy, Projectile, ProjectileKind, Tower};
use crate::geometry::Vector2;
use crate::state::GameState;
use crate::{Side, ENEMY_SPEED, MAX_ENEMIES, MAX_PROJECTILES, MAX_TOWERS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub type_slot: u8,
    pub hp: i32,
    pub active: bool,
    pub side: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    pub x: f32,
    pub y: f32,
    pub type_index: u8,
    pub attack_anim_timer: f32,
    pub active: bool,
    pub owner: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub kind: u8,
    pub active: bool,
}

/// Per-recipient view of a [`GameState`] sent with every server packet.
///
/// Entity lists are always padded to pool capacity so that every encoded
/// snapshot has the same size. The `num_*` fields say how many leading
/// entries are live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub enemies: Vec<EnemySnapshot>,
    pub num_enemies: u32,
    pub towers: Vec<TowerSnapshot>,
    pub num_towers: u32,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub num_projectiles: u32,
    /// Balance of the recipient's team.
    pub money: i32,
    pub left_hp: i32,
    pub right_hp: i32,
    pub current_wave: u32,
    pub game_over: bool,
    /// Winning side index, -1 while nobody has won.
    pub winner: i32,
}

impl GameSnapshot {
    pub fn empty() -> Self {
        Self {
            enemies: vec![EnemySnapshot::default(); MAX_ENEMIES],
            num_enemies: 0,
            towers: vec![TowerSnapshot::default(); MAX_TOWERS],
            num_towers: 0,
            projectiles: vec![ProjectileSnapshot::default(); MAX_PROJECTILES],
            num_projectiles: 0,
            money: 0,
            left_hp: 0,
            right_hp: 0,
            current_wave: 0,
            game_over: false,
            winner: -1,
        }
    }

    /// Projects `state` for `recipient`. Only the money of the recipient's
    /// team is included.
    pub fn capture(state: &GameState, recipient: i32) -> Self {
        let mut snapshot = Self::empty();

        for (slot, enemy) in snapshot.enemies.iter_mut().zip(state.enemies.iter()) {
            *slot = EnemySnapshot {
                x: enemy.position.x,
                y: enemy.position.y,
                angle: enemy.angle,
                type_slot: enemy.type_slot,
                hp: enemy.hp,
                active: enemy.active,
                side: enemy.side.index() as u8,
            };
        }
        snapshot.num_enemies = state.enemies.len() as u32;

        for (slot, tower) in snapshot.towers.iter_mut().zip(state.towers.iter()) {
            *slot = TowerSnapshot {
                x: tower.position.x,
                y: tower.position.y,
                type_index: tower.prototype_index as u8,
                attack_anim_timer: tower.attack_anim_timer,
                active: tower.active,
                owner: tower.owner,
            };
        }
        snapshot.num_towers = state.towers.len() as u32;

        for (slot, projectile) in snapshot
            .projectiles
            .iter_mut()
            .zip(state.projectiles.iter())
        {
            *slot = ProjectileSnapshot {
                x: projectile.position.x,
                y: projectile.position.y,
                angle: projectile.angle,
                kind: projectile.kind.index(),
                active: projectile.active,
            };
        }
        snapshot.num_projectiles = state.projectiles.len() as u32;

        snapshot.money = state.economy(Side::of_player(recipient)).balance();
        snapshot.left_hp = state.lane_hp(Side::Left);
        snapshot.right_hp = state.lane_hp(Side::Right);
        snapshot.current_wave = state.current_wave;
        snapshot.game_over = state.game_over;
        snapshot.winner = state.winner.map_or(-1, |side| side.index() as i32);
        snapshot
    }

    /// Pads or trims the entity lists back to pool capacity.
    pub fn normalize(&mut self) {
        self.enemies.resize(MAX_ENEMIES, EnemySnapshot::default());
        self.towers.resize(MAX_TOWERS, TowerSnapshot::default());
        self.projectiles
            .resize(MAX_PROJECTILES, ProjectileSnapshot::default());
    }

    pub fn is_padded(&self) -> bool {
        self.enemies.len() == MAX_ENEMIES
            && self.towers.len() == MAX_TOWERS
            && self.projectiles.len() == MAX_PROJECTILES
    }

    pub fn winner_side(&self) -> Option<Side> {
        Side::from_index(self.winner)
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl Enemy {
    fn mirrored(snapshot: &EnemySnapshot) -> Self {
        Self {
            position: Vector2::new(snapshot.x, snapshot.y),
            angle: snapshot.angle,
            hp: snapshot.hp,
            speed: ENEMY_SPEED,
            type_slot: snapshot.type_slot,
            tier: if snapshot.hp > 0 { damage_tier(snapshot.hp) } else { 0 },
            side: Side::from_index(snapshot.side as i32).unwrap_or_default(),
            segment: 0,
            progress: 0.0,
            active: snapshot.active,
        }
    }
}

impl Tower {
    fn mirrored(snapshot: &TowerSnapshot) -> Self {
        let prototype_index = snapshot.type_index as usize;
        let mut tower = match tower_prototype(prototype_index) {
            Some(prototype) => Tower::from_prototype(
                prototype_index,
                prototype,
                Vector2::new(snapshot.x, snapshot.y),
                snapshot.owner,
            ),
            None => Tower {
                prototype_index,
                position: Vector2::new(snapshot.x, snapshot.y),
                owner: snapshot.owner,
                ..Tower::default()
            },
        };
        tower.attack_anim_timer = snapshot.attack_anim_timer;
        tower.active = snapshot.active;
        tower
    }
}

impl Projectile {
    fn mirrored(snapshot: &ProjectileSnapshot) -> Self {
        Self {
            position: Vector2::new(snapshot.x, snapshot.y),
            velocity: Vector2::default(),
            angle: snapshot.angle,
            kind: ProjectileKind::from_index(snapshot.kind).unwrap_or_default(),
            active: snapshot.active,
        }
    }
}

/// Result of [`apply_snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    /// The projectile count grew. Used as a stand-in for "a tower fired", so
    /// simultaneous despawns and spawns can hide a shot.
    pub fired: bool,
}

/// Overwrites the client mirror `local` with `snapshot`.
///
/// The snapshot's counts are authoritative. Everything past them is left
/// inactive. The money lands on the team `player_index` belongs to.
pub fn apply_snapshot(
    local: &mut GameState,
    snapshot: &GameSnapshot,
    player_index: i32,
) -> ApplyOutcome {
    let previous_projectiles = local.projectiles.len();

    local
        .economy_mut(Side::of_player(player_index))
        .set_balance(snapshot.money);
    local.lane_hp = [snapshot.left_hp, snapshot.right_hp];
    local.current_wave = snapshot.current_wave;
    local.game_over = snapshot.game_over;
    local.winner = snapshot.winner_side();

    local.enemies.clear();
    for enemy in snapshot.enemies.iter().take(snapshot.num_enemies as usize) {
        if local.enemies.push(Enemy::mirrored(enemy)).is_none() {
            break;
        }
    }

    local.towers.clear();
    for tower in snapshot.towers.iter().take(snapshot.num_towers as usize) {
        if local.towers.push(Tower::mirrored(tower)).is_none() {
            break;
        }
    }

    local.projectiles.clear();
    for projectile in snapshot
        .projectiles
        .iter()
        .take(snapshot.num_projectiles as usize)
    {
        if local.projectiles.push(Projectile::mirrored(projectile)).is_none() {
            break;
        }
    }

    ApplyOutcome {
        fired: local.projectiles.len() > previous_projectiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim;

    fn populated_state() -> GameState {
        let mut state = GameState::new();
        state.economy_mut(Side::Left).set_balance(5_000);
        assert!(state.place_tower(2, 300, 300, 0));
        assert!(state.place_tower(1, 400, 500, 2));
        state.in_wave_delay = false;
        state.current_wave = 1;
        for _ in 0..3 {
            sim::spawn_enemy_pair(&mut state);
        }
        state.projectiles.push(Projectile::aimed(
            Vector2::new(300.0, 300.0),
            Vector2::new(300.0, 200.0),
            ProjectileKind::Dart,
        ));
        state
    }

    #[test]
    fn test_capture_is_padded() {
        let snapshot = GameSnapshot::capture(&GameState::new(), 0);
        assert!(snapshot.is_padded());
        assert_eq!(snapshot.num_enemies, 0);
        assert_eq!(snapshot.winner, -1);
        assert_eq!(snapshot.money, 200);
    }

    #[test]
    fn test_capture_uses_recipient_team_money() {
        let state = populated_state();
        let left = GameSnapshot::capture(&state, 2);
        let right = GameSnapshot::capture(&state, 3);
        assert_eq!(left.money, 5_000 - 200 - 400);
        assert_eq!(right.money, 200);
    }

    #[test]
    fn test_round_trip_counts_and_fields() {
        let state = populated_state();
        let snapshot = GameSnapshot::capture(&state, 0);

        let mut mirror = GameState::new();
        let outcome = apply_snapshot(&mut mirror, &snapshot, 0);
        assert!(outcome.fired);

        assert_eq!(mirror.enemies.len(), 6);
        assert_eq!(mirror.enemies.active_count(), 6);
        assert!(mirror.enemies.slots()[6..].iter().all(|e| !e.active));
        for (local, remote) in mirror.enemies.iter().zip(state.enemies.iter()) {
            assert_eq!(local.position, remote.position);
            assert_eq!(local.hp, remote.hp);
            assert_eq!(local.side, remote.side);
        }

        assert_eq!(mirror.towers.len(), 2);
        let tower = mirror.towers.get(1).unwrap();
        assert_eq!(tower.prototype_index, 1);
        assert_eq!(tower.range, 150.0);
        assert_eq!(tower.owner, 2);

        assert_eq!(mirror.projectiles.len(), 1);
        assert_eq!(mirror.projectiles.get(0).unwrap().kind, ProjectileKind::Dart);
        assert_eq!(mirror.economy(Side::Left).balance(), 4_400);
        assert_eq!(mirror.current_wave, 1);
    }

    #[test]
    fn test_apply_shrinks_mirror() {
        let state = populated_state();
        let mut mirror = GameState::new();
        apply_snapshot(&mut mirror, &GameSnapshot::capture(&state, 0), 0);

        let empty = GameSnapshot::capture(&GameState::new(), 0);
        let outcome = apply_snapshot(&mut mirror, &empty, 0);
        assert!(!outcome.fired);
        assert!(mirror.enemies.is_empty());
        assert!(mirror.towers.slots().iter().all(|t| !t.active));
        assert!(mirror.projectiles.is_empty());
    }

    #[test]
    fn test_apply_clamps_counts() {
        let mut snapshot = GameSnapshot::empty();
        snapshot.num_enemies = 10_000;
        snapshot.num_towers = 10_000;

        let mut mirror = GameState::new();
        apply_snapshot(&mut mirror, &snapshot, 1);
        assert_eq!(mirror.enemies.len(), MAX_ENEMIES);
        assert_eq!(mirror.towers.len(), MAX_TOWERS);
        assert_eq!(mirror.enemies.active_count(), 0);
    }

    #[test]
    fn test_apply_game_over() {
        let mut state = GameState::new();
        state.lane_hp = [0, 40];
        state.game_over = true;
        state.winner = Some(Side::Right);

        let mut mirror = GameState::new();
        apply_snapshot(&mut mirror, &GameSnapshot::capture(&state, 1), 1);
        assert!(mirror.game_over);
        assert_eq!(mirror.winner, Some(Side::Right));
        assert_eq!(mirror.lane_hp, [0, 40]);
    }
}
