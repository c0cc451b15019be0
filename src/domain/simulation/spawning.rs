use std::f64::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::domain::effects::{Obstacle, PowerUp, PowerUpKind, Scenery, Star, is_clear_of_obstacles};
use crate::domain::enemy::{ELITE_SIZE, Enemy, EnemyId, ORBITAL_COUNT, SquareStage, Tier};
use crate::domain::tuning;

use super::GameSimulation;

impl GameSimulation {
    pub(super) fn alloc_enemy_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        id
    }

    pub(super) fn alloc_obstacle_id(&mut self) -> u32 {
        let id = self.next_obstacle_id;
        self.next_obstacle_id += 1;
        id
    }

    /// Per-tick spawn probability: grows with elapsed time up to a cap, and
    /// drops to a fraction during the periodic breather at the start of each
    /// cycle.
    pub(super) fn current_spawn_chance(&self) -> f64 {
        let elapsed = self.difficulty_elapsed();
        let d = self.difficulty;
        let mut chance =
            (d.base_spawn_chance + elapsed * d.spawn_chance_growth).min(d.max_spawn_chance);
        if elapsed % d.breather_interval < d.breather_duration {
            chance *= d.breather_factor;
        }
        chance
    }

    pub(super) fn spawn_enemies(&mut self) {
        if self.now >= self.next_elite_spawn {
            self.spawn_elite_with_orbitals();
            self.next_elite_spawn = self.now + 60.0 + self.rng.random::<f64>() * 120.0;
        }

        if self.rng.random::<f64>() < self.current_spawn_chance() {
            let scale = self.enemy_scale();
            let roll = self.rng.random::<f64>();
            let enemy = if roll < 0.4 {
                self.create_basic(Tier::Small, scale)
            } else if roll < 0.65 {
                self.create_basic(Tier::Medium, scale)
            } else if roll < 0.8 {
                self.create_basic(Tier::Large, scale)
            } else if roll < 0.9 {
                self.create_square(scale)
            } else {
                self.create_charging(scale)
            };
            self.enemies.push(enemy);
        }
    }

    fn create_basic(&mut self, tier: Tier, scale: f64) -> Enemy {
        let (size, speed) = match tier {
            Tier::Small => (10.0, 2.0 + self.rng.random::<f64>()),
            Tier::Medium => (30.0, 1.0 + self.rng.random::<f64>()),
            Tier::Large => (70.0, 0.5 + self.rng.random::<f64>()),
        };
        let (x, y) = self.random_spawn_point(size);
        let angle = self.angle_toward_players(x, y);
        Enemy::basic(self.alloc_enemy_id(), tier, x, y, angle, speed, scale)
    }

    /// Squares always enter at the large stage and split downward on death.
    fn create_square(&mut self, scale: f64) -> Enemy {
        let stage = SquareStage::Large;
        let (size, _, _, base_speed) = stage.stats();
        let speed = crate::domain::enemy::scaled_speed(base_speed, scale);
        let (x, y) = self.random_spawn_point(size);
        let angle = self.angle_toward_players(x, y);
        Enemy::square(
            self.alloc_enemy_id(),
            stage,
            x,
            y,
            angle.cos() * speed,
            angle.sin() * speed,
        )
    }

    fn create_charging(&mut self, scale: f64) -> Enemy {
        let speed = 1.0 + self.rng.random::<f64>();
        let (x, y) = self.random_spawn_point(25.0);
        let angle = self.angle_toward_players(x, y);
        Enemy::charging(self.alloc_enemy_id(), x, y, angle, speed, scale)
    }

    /// An elite plus its ring of sixteen orbitals, all entering together.
    pub(super) fn spawn_elite_with_orbitals(&mut self) {
        let scale = self.enemy_scale();
        let speed = 0.5 + self.rng.random::<f64>();
        let (x, y) = self.random_spawn_point(ELITE_SIZE);
        let angle = self.angle_toward_players(x, y);
        let elite = Enemy::elite(self.alloc_enemy_id(), x, y, angle, speed, scale);
        debug!(id = elite.id, "elite spawned");

        let mut ring = Vec::with_capacity(ORBITAL_COUNT);
        for i in 0..ORBITAL_COUNT {
            let orbit_angle = i as f64 / ORBITAL_COUNT as f64 * TAU;
            let id = self.alloc_enemy_id();
            ring.push(Enemy::orbital(id, &elite, orbit_angle, self.now));
        }
        self.enemies.push(elite);
        self.enemies.extend(ring);
    }

    /// A point just outside a uniformly chosen world edge.
    fn random_spawn_point(&mut self, size: f64) -> (f64, f64) {
        match self.rng.random_range(0..4) {
            0 => (self.rng.random::<f64>() * self.width, -size),
            1 => (self.width + size, self.rng.random::<f64>() * self.height),
            2 => (self.rng.random::<f64>() * self.width, self.height + size),
            _ => (-size, self.rng.random::<f64>() * self.height),
        }
    }

    /// Initial heading: straight at a random standing player, or anywhere
    /// when nobody is.
    fn angle_toward_players(&mut self, x: f64, y: f64) -> f64 {
        let targets: Vec<(f64, f64)> = self
            .players
            .iter()
            .filter(|e| e.player.is_playing())
            .map(|e| (e.player.x, e.player.y))
            .collect();
        if targets.is_empty() {
            return self.rng.random::<f64>() * TAU;
        }
        let (tx, ty) = targets[self.rng.random_range(0..targets.len())];
        (ty - y).atan2(tx - x)
    }

    pub(super) fn spawn_stars(&mut self) {
        if self.rng.random::<f64>() >= tuning::STAR_SPAWN_CHANCE {
            return;
        }
        for _ in 0..10 {
            let x = self.rng.random::<f64>() * self.width;
            let y = self.rng.random::<f64>() * self.height;
            if is_clear_of_obstacles(x, y, 8.0, 3.0, &self.obstacles) {
                let life =
                    tuning::PICKUP_LIFE_MIN + self.rng.random::<f64>() * tuning::PICKUP_LIFE_SPAN;
                self.stars.push(Star::new(x, y, life));
                break;
            }
        }
    }

    pub(super) fn spawn_power_ups(&mut self) {
        if self.rng.random::<f64>() >= tuning::POWER_UP_SPAWN_CHANCE {
            return;
        }
        for _ in 0..10 {
            let x = self.rng.random::<f64>() * self.width;
            let y = self.rng.random::<f64>() * self.height;
            if is_clear_of_obstacles(x, y, 8.0, 3.0, &self.obstacles) {
                let roll = self.rng.random::<f64>();
                let kind = if roll < 0.33 {
                    PowerUpKind::Shield
                } else if roll < 0.66 {
                    PowerUpKind::RapidFire
                } else {
                    PowerUpKind::SpeedBoost
                };
                let life =
                    tuning::PICKUP_LIFE_MIN + self.rng.random::<f64>() * tuning::PICKUP_LIFE_SPAN;
                self.power_ups.push(PowerUp::new(kind, x, y, life));
                break;
            }
        }
    }

    /// Fifty bushes scattered at match start, kept off the central spawn
    /// area.
    pub(super) fn spawn_obstacles(&mut self) {
        for _ in 0..tuning::OBSTACLE_COUNT {
            let id = self.alloc_obstacle_id();
            let mut obstacle = Obstacle {
                id,
                x: 0.0,
                y: 0.0,
                size: 0.0,
            };
            for _ in 0..20 {
                obstacle.x = self.rng.random::<f64>() * self.width;
                obstacle.y = self.rng.random::<f64>() * self.height;
                obstacle.size = self.rng.random::<f64>() * 20.0 + 10.0;
                let center_dist =
                    (obstacle.x - self.width / 2.0).hypot(obstacle.y - self.height / 2.0);
                if center_dist >= obstacle.size + 25.0 {
                    break;
                }
            }
            self.obstacles.push(obstacle);
        }
    }

    pub(super) fn spawn_scenery(&mut self) {
        for _ in 0..tuning::SCENERY_COUNT {
            let base_size = self.rng.random::<f64>() * 15.0 + 5.0;
            self.scenery.push(Scenery {
                x: self.rng.random::<f64>() * self.width,
                y: self.rng.random::<f64>() * self.height,
                vx: (self.rng.random::<f64>() - 0.5) * 0.1,
                vy: (self.rng.random::<f64>() - 0.5) * 0.1,
                base_size,
                size: base_size,
                scale_range: base_size * 0.25,
                scale_speed: self.rng.random::<f64>() * 0.02 + 0.01,
                scale_phase: self.rng.random::<f64>() * TAU,
                kind: if self.rng.random::<f64>() < 0.6 {
                    "tree"
                } else {
                    "rock"
                },
            });
        }
    }
}
