use std::collections::HashSet;

use rand::Rng;

use crate::domain::enemy::EnemyId;

pub const PROJECTILE_BASE_SPEED: f64 = 7.0;
pub const PROJECTILE_BASE_SIZE: f64 = 5.0;
pub const PROJECTILE_DAMAGE: f64 = 3.0;
pub const PROJECTILE_CRIT_DAMAGE: f64 = 9.0;
pub const PROJECTILE_CRIT_CHANCE: f64 = 1.0 / 15.0;
/// Launch kick applied on top of the nominal muzzle speed.
const LAUNCH_BOOST: f64 = 1.7;
/// Aim jitter, plus/minus three degrees.
const ANGLE_JITTER: f64 = 6.0 * std::f64::consts::PI / 180.0;

/// A player's ranged shot. Velocity decays by a random per-shot rate over the
/// first second of flight, then holds.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub damage: f64,
    pub angle: f64,
    pub critical: bool,
    /// Shooter handle; `None` once the owner has disconnected.
    pub owner: Option<u64>,
    initial_vx: f64,
    initial_vy: f64,
    decay_rate: f64,
    age: f64,
}

impl Projectile {
    pub fn new(x: f64, y: f64, angle: f64, critical: bool, owner: u64, rng: &mut impl Rng) -> Self {
        let speed = if critical {
            PROJECTILE_BASE_SPEED * 2.0
        } else {
            PROJECTILE_BASE_SPEED
        };
        let size = if critical {
            PROJECTILE_BASE_SIZE * 2.0
        } else {
            PROJECTILE_BASE_SIZE
        };
        let damage = if critical {
            PROJECTILE_CRIT_DAMAGE
        } else {
            PROJECTILE_DAMAGE
        };
        let angle = angle + (rng.random::<f64>() - 0.5) * ANGLE_JITTER;
        let launch_speed = speed * LAUNCH_BOOST;
        let initial_vx = angle.cos() * launch_speed;
        let initial_vy = angle.sin() * launch_speed;
        Self {
            x,
            y,
            vx: initial_vx,
            vy: initial_vy,
            size,
            damage,
            angle,
            critical,
            owner: Some(owner),
            initial_vx,
            initial_vy,
            decay_rate: rng.random::<f64>() * 0.19 + 0.01,
            age: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.age += dt;
        let factor = if self.age < 1.0 {
            1.0 - self.decay_rate * self.age
        } else {
            1.0 - self.decay_rate
        };
        self.vx = self.initial_vx * factor;
        self.vy = self.initial_vy * factor;
        self.x += self.vx;
        self.y += self.vy;
    }

    /// Removal convention is exclusive: `x < 0 || x > width` despawns.
    pub fn in_bounds(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.x <= width && self.y >= 0.0 && self.y <= height
    }
}

pub const MELEE_RANGE: f64 = 50.0;
pub const MELEE_DURATION: f64 = 0.05;
/// Half-width of the swing arc (60 degrees either side of facing).
pub const MELEE_ARC: f64 = std::f64::consts::PI / 3.0;
/// Shield chip dealt to a shielded elite instead of a kill.
pub const MELEE_SHIELD_CHIP: f64 = 10.0;

/// A short-lived arc swing in front of the player. Tracks enemies already
/// struck so one swing cannot hit the same target twice.
#[derive(Debug, Clone)]
pub struct Melee {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub range: f64,
    pub duration: f64,
    pub age: f64,
    pub critical: bool,
    pub owner: Option<u64>,
    pub already_hit: HashSet<EnemyId>,
}

impl Melee {
    pub fn new(x: f64, y: f64, angle: f64, critical: bool, owner: u64) -> Self {
        Self {
            x,
            y,
            angle,
            // Critical swings reach twice as far.
            range: if critical { MELEE_RANGE * 2.0 } else { MELEE_RANGE },
            duration: MELEE_DURATION,
            age: 0.0,
            critical,
            owner: Some(owner),
            already_hit: HashSet::new(),
        }
    }

    pub fn expired(&self) -> bool {
        self.age > self.duration
    }

    pub fn progress(&self) -> f64 {
        (self.age / self.duration).clamp(0.0, 1.0)
    }
}

pub const BOMB_EXPAND_DURATION: f64 = 0.2;
pub const BOMB_FADE_DURATION: f64 = 0.5;
pub const BOMB_RADIUS: f64 = 100.0;
pub const BOMB_CRIT_RADIUS: f64 = 200.0;
pub const BOMB_DAMAGE: f64 = 20.0;
pub const BOMB_CRIT_DAMAGE: f64 = 100.0;
pub const BOMB_CRIT_CHANCE: f64 = 1.0 / 6.0;

/// Two-phase blast: the radius expands, then the cloud fades with an outer
/// ring. Damage lands once per enemy over the whole animation.
#[derive(Debug, Clone)]
pub struct Bomb {
    pub x: f64,
    pub y: f64,
    pub age: f64,
    pub max_radius: f64,
    pub current_radius: f64,
    pub opacity: f64,
    pub ring_radius: f64,
    pub ring_opacity: f64,
    pub damage: f64,
    pub critical: bool,
    pub owner: Option<u64>,
    pub hit_enemies: HashSet<EnemyId>,
    done: bool,
}

impl Bomb {
    pub fn new(x: f64, y: f64, critical: bool, owner: u64) -> Self {
        Self {
            x,
            y,
            age: 0.0,
            max_radius: if critical { BOMB_CRIT_RADIUS } else { BOMB_RADIUS },
            current_radius: 0.0,
            opacity: 1.0,
            ring_radius: 0.0,
            ring_opacity: 0.0,
            damage: if critical { BOMB_CRIT_DAMAGE } else { BOMB_DAMAGE },
            critical,
            owner: Some(owner),
            hit_enemies: HashSet::new(),
            done: false,
        }
    }

    /// Advance the blast animation. Returns false once fully faded.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.age += dt;
        let ring_max = self.max_radius + 30.0;
        if self.age < BOMB_EXPAND_DURATION {
            self.current_radius = (self.age / BOMB_EXPAND_DURATION) * self.max_radius;
            self.opacity = 1.0;
            self.ring_opacity = 0.0;
        } else if self.age < BOMB_EXPAND_DURATION + BOMB_FADE_DURATION {
            let progress = (self.age - BOMB_EXPAND_DURATION) / BOMB_FADE_DURATION;
            self.current_radius = self.max_radius;
            self.opacity = 1.0 - progress;
            self.ring_radius = self.max_radius + (ring_max - self.max_radius) * progress;
            self.ring_opacity = 1.0 - progress;
        } else {
            self.done = true;
        }
        !self.done
    }
}

pub const ENEMY_PROJECTILE_SPEED: f64 = 2.0;
pub const ENEMY_PROJECTILE_SIZE: f64 = 3.0;
pub const ENEMY_PROJECTILE_DAMAGE: f64 = 3.0;

/// Straight-line shot fired by orbitals; hurts players and enemies alike.
#[derive(Debug, Clone)]
pub struct EnemyProjectile {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub damage: f64,
}

impl EnemyProjectile {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self {
            x,
            y,
            vx: angle.cos() * ENEMY_PROJECTILE_SPEED,
            vy: angle.sin() * ENEMY_PROJECTILE_SPEED,
            size: ENEMY_PROJECTILE_SIZE,
            damage: ENEMY_PROJECTILE_DAMAGE,
        }
    }

    pub fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
    }

    pub fn in_bounds(&self, width: f64, height: f64) -> bool {
        self.x >= -self.size
            && self.x <= width + self.size
            && self.y >= -self.size
            && self.y <= height + self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn projectile_leaving_bounds_is_out() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut p = Projectile::new(799.0, 100.0, 0.0, false, 1, &mut rng);
        assert!(p.in_bounds(800.0, 600.0));
        // Fast enough to cross the right edge in one step.
        p.advance(1.0 / 30.0);
        assert!(!p.in_bounds(800.0, 600.0));
    }

    #[test]
    fn projectile_speed_decays_over_first_second() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut p = Projectile::new(0.0, 0.0, 0.0, false, 1, &mut rng);
        let v0 = p.vx.hypot(p.vy);
        for _ in 0..30 {
            p.advance(1.0 / 30.0);
        }
        let v1 = p.vx.hypot(p.vy);
        assert!(v1 < v0);
    }

    #[test]
    fn bomb_expands_then_fades() {
        let mut b = Bomb::new(0.0, 0.0, false, 1);
        assert!(b.advance(0.1));
        assert!(b.current_radius > 0.0 && b.current_radius < b.max_radius);
        assert!(b.advance(0.2));
        assert_eq!(b.current_radius, b.max_radius);
        assert!(b.opacity < 1.0);
        assert!(!b.advance(0.5));
    }

    #[test]
    fn melee_progress_clamps() {
        let mut m = Melee::new(0.0, 0.0, 0.0, false, 1);
        assert_eq!(m.progress(), 0.0);
        m.age = 1.0;
        assert_eq!(m.progress(), 1.0);
        assert!(m.expired());
    }
}
