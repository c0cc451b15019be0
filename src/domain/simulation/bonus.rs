use rand::Rng;
use tracing::debug;

use crate::domain::effects::{Bonfire, Obstacle, Particle};
use crate::domain::tuning;
use crate::domain::world_bonus::Bonus;

use super::GameSimulation;

const SHRAPNEL_COLORS: [&str; 5] = ["#8B4513", "#A0522D", "#D2691E", "#CD853F", "#6B3A2A"];

impl GameSimulation {
    pub(super) fn activate_world_bonus(&mut self, bonus: Bonus) {
        debug!(bonus = bonus.id(), "world bonus activated");
        match bonus {
            Bonus::Wind => {
                for entry in &mut self.players {
                    if entry.player.is_playing() {
                        entry.player.wind_bonus_active = true;
                    }
                }
            }
            Bonus::Earth => {
                for entry in &mut self.players {
                    if entry.player.is_playing() {
                        entry.player.earth_bonus_active = true;
                        entry.player.hiding_in_obstacle = None;
                    }
                }
            }
            Bonus::Freeze => {
                for entry in &mut self.players {
                    if entry.player.is_playing() {
                        entry.player.freeze_bonus_active = true;
                    }
                }
                self.apply_freeze_to_enemies();
            }
            Bonus::Fire => {
                for entry in &mut self.players {
                    if entry.player.is_playing() {
                        entry.player.fire_bonus_active = true;
                        entry.player.fire_immune = true;
                    }
                }
                for enemy in &mut self.enemies {
                    enemy.fire_dot = tuning::FIRE_DOT_RATE;
                }
                self.spawn_bonfires();
            }
            Bonus::Boss => {
                self.spawn_elite_with_orbitals();
            }
        }
    }

    /// Clears the bonus from everyone, dead players included, so no flag
    /// outlives the bonus window through a respawn.
    pub(super) fn deactivate_world_bonus(&mut self, bonus: Bonus) {
        debug!(bonus = bonus.id(), "world bonus ended");
        match bonus {
            Bonus::Wind => {
                for entry in &mut self.players {
                    entry.player.wind_bonus_active = false;
                }
            }
            Bonus::Earth => {
                for entry in &mut self.players {
                    entry.player.earth_bonus_active = false;
                    entry.player.hiding_in_obstacle = None;
                }
            }
            Bonus::Freeze => {
                for entry in &mut self.players {
                    entry.player.freeze_bonus_active = false;
                }
                for enemy in &mut self.enemies {
                    enemy.speed_multiplier = 1.0;
                    enemy.frozen = false;
                }
            }
            Bonus::Fire => {
                for entry in &mut self.players {
                    entry.player.fire_bonus_active = false;
                    entry.player.fire_immune = false;
                }
                for enemy in &mut self.enemies {
                    enemy.fire_dot = 0.0;
                }
                self.bonfires.clear();
            }
            Bonus::Boss => {}
        }
    }

    /// Recurring per-tick effects while a bonus is live. Freeze and fire
    /// restamp their modifiers so enemies spawned mid-bonus are covered.
    pub(super) fn apply_world_bonus_effects(&mut self) {
        match self.world_bonus.active_bonus {
            Some(Bonus::Wind) => self.apply_wind_push(),
            Some(Bonus::Freeze) => {
                for enemy in &mut self.enemies {
                    if enemy.speed_multiplier == 1.0 && !enemy.frozen {
                        enemy.speed_multiplier = tuning::FREEZE_SPEED_MULTIPLIER;
                        if self.rng.random::<f64>() < tuning::FREEZE_SOLID_CHANCE {
                            enemy.frozen = true;
                        }
                    }
                }
            }
            Some(Bonus::Fire) => {
                for enemy in &mut self.enemies {
                    if enemy.fire_dot == 0.0 {
                        enemy.fire_dot = tuning::FIRE_DOT_RATE;
                    }
                }
            }
            _ => {}
        }
    }

    /// Wind shoves enemies radially away from whichever player is nearest,
    /// harder the closer they are, and swirls dust around the players.
    fn apply_wind_push(&mut self) {
        let targets: Vec<(f64, f64)> = self
            .players
            .iter()
            .filter(|e| e.player.is_playing())
            .map(|e| (e.player.x, e.player.y))
            .collect();

        for enemy in &mut self.enemies {
            let nearest = targets
                .iter()
                .map(|&(tx, ty)| (tx, ty, (enemy.x - tx).hypot(enemy.y - ty)))
                .min_by(|a, b| a.2.total_cmp(&b.2));
            let Some((px, py, dist)) = nearest else {
                continue;
            };
            if dist < tuning::WIND_PUSH_RADIUS && dist > 0.0 {
                let proximity = 1.0 - dist / tuning::WIND_PUSH_RADIUS;
                enemy.x += (enemy.x - px) / dist * tuning::WIND_PUSH_FORCE * proximity;
                enemy.y += (enemy.y - py) / dist * tuning::WIND_PUSH_FORCE * proximity;
            }
        }

        for &(px, py) in &targets {
            if self.rng.random::<f64>() < 0.5 {
                let angle = self.rng.random::<f64>() * std::f64::consts::TAU;
                let r = self.rng.random::<f64>() * tuning::WIND_PUSH_RADIUS * 0.9;
                let speed = 1.0 + self.rng.random::<f64>() * 2.0;
                self.particles.push(Particle::new(
                    px + angle.cos() * r,
                    py + angle.sin() * r,
                    (angle + 0.5).cos() * speed,
                    (angle + 0.5).sin() * speed,
                    1.5,
                    0.5 + self.rng.random::<f64>() * 0.3,
                    "rgba(200, 230, 255, 0.6)",
                ));
            }
        }
    }

    pub(super) fn apply_freeze_to_enemies(&mut self) {
        for enemy in &mut self.enemies {
            enemy.speed_multiplier = tuning::FREEZE_SPEED_MULTIPLIER;
            if self.rng.random::<f64>() < tuning::FREEZE_SOLID_CHANCE {
                enemy.frozen = true;
            }
        }
    }

    fn spawn_bonfires(&mut self) {
        let count = self.rng.random_range(5..9);
        let players: Vec<(f64, f64)> = self
            .players
            .iter()
            .filter(|e| e.player.is_playing())
            .map(|e| (e.player.x, e.player.y))
            .collect();
        for _ in 0..count {
            let mut x = 0.0;
            let mut y = 0.0;
            // Best-effort placement away from players.
            for _ in 0..20 {
                x = self.rng.random::<f64>() * self.width;
                y = self.rng.random::<f64>() * self.height;
                let clear = players
                    .iter()
                    .all(|&(px, py)| (x - px).hypot(y - py) >= tuning::BONFIRE_MIN_PLAYER_DIST);
                if clear {
                    break;
                }
            }
            self.bonfires.push(Bonfire::new(
                x,
                y,
                tuning::BONFIRE_RADIUS,
                tuning::BONFIRE_MAX_DOT,
            ));
        }
    }

    /// Detonate the bush at `obstacle_id`: shrapnel damages nearby enemies
    /// and a replacement bush grows somewhere away from the triggering
    /// player.
    pub(super) fn earth_explode_obstacle(&mut self, obstacle_id: u32, px: f64, py: f64) {
        let Some(index) = self.obstacles.iter().position(|o| o.id == obstacle_id) else {
            return;
        };
        let obstacle = self.obstacles.remove(index);

        let burst = self.rng.random_range(12..21);
        for _ in 0..burst {
            let angle = self.rng.random::<f64>() * std::f64::consts::TAU;
            let speed = 2.0 + self.rng.random::<f64>() * 4.0;
            let color = SHRAPNEL_COLORS[self.rng.random_range(0..SHRAPNEL_COLORS.len())];
            self.particles.push(Particle::new(
                obstacle.x,
                obstacle.y,
                angle.cos() * speed,
                angle.sin() * speed,
                2.0 + self.rng.random::<f64>() * 3.0,
                0.6 + self.rng.random::<f64>() * 0.4,
                color,
            ));
        }

        for enemy in &mut self.enemies {
            let dist = (enemy.x - obstacle.x).hypot(enemy.y - obstacle.y);
            if dist < tuning::EARTH_SHRAPNEL_RADIUS + enemy.size {
                enemy.apply_damage(tuning::EARTH_SHRAPNEL_DAMAGE);
            }
        }

        let id = self.alloc_obstacle_id();
        let mut replacement = Obstacle {
            id,
            x: 0.0,
            y: 0.0,
            size: 0.0,
        };
        for _ in 0..50 {
            replacement.x = self.rng.random::<f64>() * self.width;
            replacement.y = self.rng.random::<f64>() * self.height;
            replacement.size = self.rng.random::<f64>() * 20.0 + 10.0;
            if (replacement.x - px).hypot(replacement.y - py) >= tuning::EARTH_RESPAWN_MIN_DIST {
                break;
            }
        }
        self.obstacles.push(replacement);
    }
}
