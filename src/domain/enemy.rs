/// Enemy family: one arena of `Enemy` values with stable integer ids.
///
/// Variants carry their own data (Elite its shield, Orbital its parent
/// handle) so collision and scoring code dispatches on the closed enum
/// instead of string tags. Parent/child links are ids, never references; a
/// dead parent is detected by a failed lookup.

/// Stable handle into the enemy arena. Ids are never reused within a match.
pub type EnemyId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareStage {
    Small,
    Medium,
    Large,
}

impl SquareStage {
    /// The stage children shrink to when this square dies.
    pub fn split_into(self) -> Option<SquareStage> {
        match self {
            SquareStage::Large => Some(SquareStage::Medium),
            SquareStage::Medium => Some(SquareStage::Small),
            SquareStage::Small => None,
        }
    }

    /// (size, hp, damage, base speed)
    pub fn stats(self) -> (f64, f64, f64, f64) {
        match self {
            SquareStage::Large => (50.0, 16.0, 12.0, 0.8),
            SquareStage::Medium => (30.0, 8.0, 6.0, 1.2),
            SquareStage::Small => (18.0, 3.0, 3.0, 1.8),
        }
    }
}

#[derive(Debug, Clone)]
pub enum EnemyKind {
    Basic(Tier),
    Square(SquareStage),
    Charging {
        trigger_radius: f64,
        base_speed: f64,
    },
    Elite {
        shield: f64,
        shield_max: f64,
    },
    Orbital {
        parent: EnemyId,
        angle: f64,
        radius: f64,
        last_shot: f64,
    },
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub hp: f64,
    pub damage: f64,

    // World bonus modifiers.
    pub speed_multiplier: f64,
    pub frozen: bool,
    pub fire_dot: f64,
}

pub const ELITE_SIZE: f64 = 84.0;
pub const ORBITAL_COUNT: usize = 16;
pub const ORBITAL_ROTATION_SPEED: f64 = 0.03;
pub const ORBITAL_SHOT_COOLDOWN: f64 = 0.5;
pub const ORBITAL_VOLLEY: usize = 8;
pub const CHARGE_TRIGGER_RADIUS: f64 = 150.0;
pub const CHARGE_SPEED_FACTOR: f64 = 2.5;

/// Difficulty scaling applies half-strength to speed.
pub fn scaled_speed(speed: f64, scale: f64) -> f64 {
    speed * (1.0 + (scale - 1.0) * 0.5)
}

impl Enemy {
    fn base(id: EnemyId, kind: EnemyKind, x: f64, y: f64, size: f64, hp: f64, damage: f64) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            size,
            hp,
            damage,
            speed_multiplier: 1.0,
            frozen: false,
            fire_dot: 0.0,
        }
    }

    pub fn basic(id: EnemyId, tier: Tier, x: f64, y: f64, angle: f64, speed: f64, scale: f64) -> Self {
        let (size, hp, damage) = match tier {
            Tier::Small => (10.0, 4.0, 3.0),
            Tier::Medium => (30.0, 12.0, 11.0),
            Tier::Large => (70.0, 26.0, 25.0),
        };
        let speed = scaled_speed(speed, scale);
        let mut e = Self::base(
            id,
            EnemyKind::Basic(tier),
            x,
            y,
            size,
            (hp * scale).ceil(),
            (damage * scale).ceil(),
        );
        e.vx = angle.cos() * speed;
        e.vy = angle.sin() * speed;
        e
    }

    pub fn square(id: EnemyId, stage: SquareStage, x: f64, y: f64, vx: f64, vy: f64) -> Self {
        let (size, hp, damage, _) = stage.stats();
        let mut e = Self::base(id, EnemyKind::Square(stage), x, y, size, hp, damage);
        e.vx = vx;
        e.vy = vy;
        e
    }

    pub fn charging(id: EnemyId, x: f64, y: f64, angle: f64, speed: f64, scale: f64) -> Self {
        let speed = scaled_speed(speed, scale);
        let mut e = Self::base(
            id,
            EnemyKind::Charging {
                trigger_radius: CHARGE_TRIGGER_RADIUS,
                base_speed: speed,
            },
            x,
            y,
            25.0,
            (10.0 * scale).ceil(),
            (8.0 * scale).ceil(),
        );
        e.vx = angle.cos() * speed;
        e.vy = angle.sin() * speed;
        e
    }

    pub fn elite(id: EnemyId, x: f64, y: f64, angle: f64, speed: f64, scale: f64) -> Self {
        let speed = scaled_speed(speed, scale);
        let mut e = Self::base(
            id,
            EnemyKind::Elite {
                shield: 40.0,
                shield_max: 40.0,
            },
            x,
            y,
            ELITE_SIZE,
            (52.0 * scale).ceil(),
            (30.0 * scale).ceil(),
        );
        e.vx = angle.cos() * speed;
        e.vy = angle.sin() * speed;
        e
    }

    pub fn orbital(id: EnemyId, parent: &Enemy, angle: f64, now: f64) -> Self {
        let radius = parent.size + 20.0;
        Self::base(
            id,
            EnemyKind::Orbital {
                parent: parent.id,
                angle,
                radius,
                last_shot: now,
            },
            parent.x + angle.cos() * radius,
            parent.y + angle.sin() * radius,
            10.0,
            3.0,
            1.0,
        )
    }

    /// Rendering/scoring tag matching the client's sprite table.
    pub fn type_tag(&self) -> &'static str {
        match &self.kind {
            EnemyKind::Basic(Tier::Small) => "small",
            EnemyKind::Basic(Tier::Medium) => "medium",
            EnemyKind::Basic(Tier::Large) => "large",
            EnemyKind::Square(SquareStage::Small) => "square_small",
            EnemyKind::Square(SquareStage::Medium) => "square_medium",
            EnemyKind::Square(SquareStage::Large) => "square_large",
            EnemyKind::Charging { .. } => "charging",
            EnemyKind::Elite { .. } => "elite",
            EnemyKind::Orbital { .. } => "orbital",
        }
    }

    pub fn shape(&self) -> &'static str {
        match &self.kind {
            EnemyKind::Square(_) => "square",
            EnemyKind::Charging { .. } => "triangle",
            _ => "circle",
        }
    }

    pub fn base_score(&self) -> u32 {
        match &self.kind {
            EnemyKind::Basic(Tier::Small) | EnemyKind::Square(SquareStage::Small) => 10,
            EnemyKind::Basic(Tier::Medium) | EnemyKind::Square(SquareStage::Medium) => 30,
            EnemyKind::Basic(Tier::Large) | EnemyKind::Square(SquareStage::Large) => 50,
            EnemyKind::Charging { .. } => 0,
            EnemyKind::Elite { .. } => 100,
            EnemyKind::Orbital { .. } => 5,
        }
    }

    pub fn shield(&self) -> f64 {
        match &self.kind {
            EnemyKind::Elite { shield, .. } => *shield,
            _ => 0.0,
        }
    }

    pub fn shield_max(&self) -> f64 {
        match &self.kind {
            EnemyKind::Elite { shield_max, .. } => *shield_max,
            _ => 0.0,
        }
    }

    /// Shield-first damage: an Elite's shield absorbs the hit and negative
    /// overflow carries into hp. Everything else takes it on hp directly.
    pub fn apply_damage(&mut self, damage: f64) {
        if let EnemyKind::Elite { shield, .. } = &mut self.kind {
            if *shield > 0.0 {
                *shield -= damage;
                if *shield < 0.0 {
                    self.hp += *shield;
                    *shield = 0.0;
                }
                return;
            }
        }
        self.hp -= damage;
    }

    /// Bomb blasts ignore shields entirely.
    pub fn apply_damage_piercing(&mut self, damage: f64) {
        self.hp -= damage;
    }

    /// Per-tick movement; frozen enemies hold still, slowed ones crawl.
    pub fn integrate(&mut self) {
        if !self.frozen {
            self.x += self.vx * self.speed_multiplier;
            self.y += self.vy * self.speed_multiplier;
        }
    }

    pub fn apply_fire_dot(&mut self, dt: f64) {
        if self.fire_dot > 0.0 {
            self.hp -= self.fire_dot * dt;
        }
    }

    /// Enemies are culled once fully outside the world plus their own size.
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

    #[test]
    fn shield_absorbs_before_hp() {
        let mut e = Enemy::elite(1, 0.0, 0.0, 0.0, 1.0, 1.0);
        let hp = e.hp;
        e.apply_damage(10.0);
        assert_eq!(e.hp, hp);
        assert_eq!(e.shield(), 30.0);
    }

    #[test]
    fn shield_overflow_carries_into_hp() {
        let mut e = Enemy::elite(1, 0.0, 0.0, 0.0, 1.0, 1.0);
        let hp = e.hp;
        e.apply_damage(50.0);
        assert_eq!(e.shield(), 0.0);
        assert_eq!(e.hp, hp - 10.0);
        // Once the shield is gone, damage lands on hp in full.
        e.apply_damage(7.0);
        assert_eq!(e.hp, hp - 17.0);
    }

    #[test]
    fn piercing_damage_ignores_shield() {
        let mut e = Enemy::elite(1, 0.0, 0.0, 0.0, 1.0, 1.0);
        let hp = e.hp;
        e.apply_damage_piercing(20.0);
        assert_eq!(e.hp, hp - 20.0);
        assert_eq!(e.shield(), 40.0);
    }

    #[test]
    fn frozen_enemy_does_not_move() {
        let mut e = Enemy::basic(1, Tier::Small, 0.0, 0.0, 0.0, 2.0, 1.0);
        e.frozen = true;
        e.integrate();
        assert_eq!((e.x, e.y), (0.0, 0.0));
        e.frozen = false;
        e.integrate();
        assert!(e.x > 0.0);
    }

    #[test]
    fn difficulty_scale_rounds_stats_up() {
        let e = Enemy::basic(1, Tier::Medium, 0.0, 0.0, 0.0, 1.0, 1.25);
        assert_eq!(e.hp, 15.0);
        assert_eq!(e.damage, 14.0);
    }
}
