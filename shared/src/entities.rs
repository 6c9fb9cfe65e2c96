use crate::geometry::Vector2;
use crate::pool::Slot;
use crate::{Side, ATTACK_ANIMATION_TIME, ENEMY_SPEED, WINDOW_WIDTH};
use serde::{Deserialize, Serialize};

/// Base hit points per enemy type slot, before wave scaling.
pub const ENEMY_BASE_HP: [i32; 3] = [1, 3, 5];

/// Sprite family fired by a tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    #[default]
    Dart,
    Bullet,
}

impl ProjectileKind {
    pub fn index(self) -> u8 {
        match self {
            ProjectileKind::Dart => 0,
            ProjectileKind::Bullet => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ProjectileKind::Dart),
            1 => Some(ProjectileKind::Bullet),
            _ => None,
        }
    }
}

/// Stats a placed tower copies from its prototype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerPrototype {
    pub damage: i32,
    pub range: f32,
    /// Attacks per second.
    pub attack_rate: f32,
    pub cost: i32,
    pub projectile_kind: ProjectileKind,
}

pub const TOWER_PROTOTYPES: [TowerPrototype; 3] = [
    TowerPrototype {
        damage: 1,
        range: 150.0,
        attack_rate: 5.0,
        cost: 1000,
        projectile_kind: ProjectileKind::Bullet,
    },
    TowerPrototype {
        damage: 10,
        range: 150.0,
        attack_rate: 0.5,
        cost: 400,
        projectile_kind: ProjectileKind::Dart,
    },
    TowerPrototype {
        damage: 3,
        range: 240.0,
        attack_rate: 1.2,
        cost: 200,
        projectile_kind: ProjectileKind::Dart,
    },
];

pub fn tower_prototype(index: usize) -> Option<&'static TowerPrototype> {
    TOWER_PROTOTYPES.get(index)
}

///Sprite tier for a freshly spawned enemy.
pub fn spawn_tier(hp: i32) -> u8 {
    if hp <= 4 {
        0
    } else if hp <= 8 {
        1
    } else {
        2
    }
}

///Sprite tier for an enemy that survived a hit.
pub fn damage_tier(hp: i32) -> u8 {
    if hp <= 1 {
        0
    } else if hp <= 3 {
        1
    } else {
        2
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enemy {
    pub position: Vector2,
    /// Heading in degrees.
    pub angle: f32,
    pub hp: i32,
    pub speed: f32,
    pub type_slot: u8,
    pub tier: u8,
    pub side: Side,
    pub segment: usize,
    /// Fraction of the current segment covered, `0.0..1.0`.
    pub progress: f32,
    pub active: bool,
}

impl Enemy {
    pub fn spawn(side: Side, type_slot: u8, hp: i32, start: Vector2) -> Self {
        Self {
            position: start,
            angle: 0.0,
            hp,
            speed: ENEMY_SPEED,
            type_slot,
            tier: spawn_tier(hp),
            side,
            segment: 0,
            progress: 0.0,
            active: true,
        }
    }

    /// How far along its lane the enemy is. Larger is closer to leaking.
    pub fn path_progress(&self) -> f32 {
        self.segment as f32 + self.progress
    }

    /// Applies a hit. Returns true when the hit was lethal.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        self.hp -= damage;
        if self.hp <= 0 {
            self.active = false;
            return true;
        }
        self.tier = damage_tier(self.hp);
        false
    }
}

impl Slot for Enemy {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Which lanes a tower may shoot at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Left,
    Right,
    Both,
}

impl Affinity {
    pub fn for_x(x: f32) -> Self {
        let width = WINDOW_WIDTH as f32;
        if x < width * 0.48 {
            Affinity::Left
        } else if x > width * 0.52 {
            Affinity::Right
        } else {
            Affinity::Both
        }
    }

    pub fn accepts(self, side: Side) -> bool {
        match self {
            Affinity::Left => side == Side::Left,
            Affinity::Right => side == Side::Right,
            Affinity::Both => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tower {
    pub prototype_index: usize,
    pub damage: i32,
    pub range: f32,
    pub attack_rate: f32,
    pub cost: i32,
    pub projectile_kind: ProjectileKind,
    pub position: Vector2,
    /// Player index of whoever paid for the tower.
    pub owner: i32,
    pub attack_timer: f32,
    pub attack_anim_timer: f32,
    pub active: bool,
}

impl Tower {
    pub fn from_prototype(
        prototype_index: usize,
        prototype: &TowerPrototype,
        position: Vector2,
        owner: i32,
    ) -> Self {
        Self {
            prototype_index,
            damage: prototype.damage,
            range: prototype.range,
            attack_rate: prototype.attack_rate,
            cost: prototype.cost,
            projectile_kind: prototype.projectile_kind,
            position,
            owner,
            attack_timer: 0.0,
            attack_anim_timer: 0.0,
            active: true,
        }
    }

    pub fn affinity(&self) -> Affinity {
        Affinity::for_x(self.position.x)
    }

    /// Seconds between attacks.
    pub fn attack_interval(&self) -> f32 {
        if self.attack_rate <= 0.0 {
            return f32::INFINITY;
        }
        1.0 / self.attack_rate
    }

    /// True while the attack sprite should be shown.
    pub fn is_attacking(&self) -> bool {
        self.attack_anim_timer > 0.0
    }

    pub fn advance_timers(&mut self, dt: f32) {
        if self.attack_anim_timer > 0.0 {
            self.attack_anim_timer -= dt;
            if self.attack_anim_timer <= 0.0 {
                self.attack_anim_timer = 0.0;
            }
        }
        self.attack_timer += dt;
    }

    pub fn ready_to_fire(&self) -> bool {
        self.attack_timer >= self.attack_interval()
    }

    pub fn begin_attack(&mut self) {
        self.attack_timer = 0.0;
        self.attack_anim_timer = ATTACK_ANIMATION_TIME;
    }
}

impl Slot for Tower {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projectile {
    pub position: Vector2,
    /// Unit direction of travel.
    pub velocity: Vector2,
    pub angle: f32,
    pub kind: ProjectileKind,
    pub active: bool,
}

impl Projectile {
    /// A projectile leaving `from` toward `to`. Coincident points fire
    /// straight up.
    pub fn aimed(from: Vector2, to: Vector2, kind: ProjectileKind) -> Self {
        let delta = to.sub(&from);
        let magnitude = delta.magnitude();
        let (velocity, angle) = if magnitude > 0.01 {
            (delta.scale(1.0 / magnitude), delta.heading_degrees())
        } else {
            (Vector2::new(0.0, -1.0), 0.0)
        };

        Self {
            position: from,
            velocity,
            angle,
            kind,
            active: true,
        }
    }
}

impl Slot for Projectile {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_prototype_table() {
        assert_eq!(TOWER_PROTOTYPES.len(), 3);
        assert_eq!(tower_prototype(0).unwrap().cost, 1000);
        assert_eq!(tower_prototype(1).unwrap().damage, 10);
        assert_eq!(tower_prototype(2).unwrap().range, 240.0);
        assert!(tower_prototype(3).is_none());
    }

    #[test]
    fn test_tiers() {
        assert_eq!(spawn_tier(4), 0);
        assert_eq!(spawn_tier(5), 1);
        assert_eq!(spawn_tier(9), 2);
        assert_eq!(damage_tier(1), 0);
        assert_eq!(damage_tier(3), 1);
        assert_eq!(damage_tier(4), 2);
    }

    #[test]
    fn test_take_damage() {
        let mut enemy = Enemy::spawn(Side::Left, 2, 6, Vector2::default());
        assert_eq!(enemy.tier, 1);

        assert!(!enemy.take_damage(3));
        assert_eq!(enemy.hp, 3);
        assert_eq!(enemy.tier, 1);
        assert!(enemy.active);

        assert!(enemy.take_damage(10));
        assert!(!enemy.active);
    }

    #[test]
    fn test_affinity() {
        assert_eq!(Affinity::for_x(100.0), Affinity::Left);
        assert_eq!(Affinity::for_x(1400.0), Affinity::Right);
        assert_eq!(Affinity::for_x(750.0), Affinity::Both);
        assert!(Affinity::Both.accepts(Side::Right));
        assert!(!Affinity::Left.accepts(Side::Right));
    }

    #[test]
    fn test_tower_timers() {
        let prototype = tower_prototype(2).unwrap();
        let mut tower = Tower::from_prototype(2, prototype, Vector2::new(300.0, 300.0), 0);
        assert!(!tower.ready_to_fire());

        tower.advance_timers(1.0);
        assert!(tower.ready_to_fire());

        tower.begin_attack();
        assert!(tower.is_attacking());
        assert_eq!(tower.attack_timer, 0.0);

        tower.advance_timers(0.2);
        assert!(!tower.is_attacking());
        assert_eq!(tower.attack_anim_timer, 0.0);
    }

    #[test]
    fn test_projectile_aim() {
        let p = Projectile::aimed(
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            ProjectileKind::Dart,
        );
        assert_approx_eq!(p.velocity.x, 1.0);
        assert_approx_eq!(p.velocity.y, 0.0);
        assert_approx_eq!(p.angle, 90.0, 1e-3);

        let stuck = Projectile::aimed(
            Vector2::new(5.0, 5.0),
            Vector2::new(5.0, 5.0),
            ProjectileKind::Bullet,
        );
        assert_eq!(stuck.velocity, Vector2::new(0.0, -1.0));
        assert_eq!(stuck.angle, 0.0);
    }
}
