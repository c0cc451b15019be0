use std::mem;

use rand::Rng;

use crate::domain::effects::{Particle, PowerUpKind};
use crate::domain::tuning;

use super::GameSimulation;

const BONFIRE_COLORS: [&str; 5] = ["#ff4500", "#ff6600", "#ff8800", "#ffaa00", "#ffcc00"];

impl GameSimulation {
    pub(super) fn update_particles(&mut self, dt: f64) {
        self.particles.retain_mut(|p| p.advance(dt));
    }

    pub(super) fn update_messages(&mut self, dt: f64) {
        self.messages.retain_mut(|m| m.advance(dt));
    }

    pub(super) fn update_stars(&mut self, dt: f64) {
        let mut stars = mem::take(&mut self.stars);
        stars.retain_mut(|star| {
            star.life -= dt;
            for entry in &mut self.players {
                let player = &mut entry.player;
                if !player.is_playing() {
                    continue;
                }
                let dist = (player.x - star.x).hypot(player.y - star.y);
                if dist < star.size + player.size {
                    player.acorns = (player.acorns + tuning::STAR_ACORNS).min(tuning::ACORN_CAP);
                    star.life = 0.0;
                    break;
                }
            }
            star.life > 0.0
        });
        self.stars = stars;
    }

    pub(super) fn update_power_ups(&mut self, dt: f64) {
        let mut power_ups = mem::take(&mut self.power_ups);
        power_ups.retain_mut(|pu| {
            pu.life -= dt;
            for entry in &mut self.players {
                let player = &mut entry.player;
                if !player.is_playing() {
                    continue;
                }
                let dist = (player.x - pu.x).hypot(player.y - pu.y);
                if dist < pu.size + player.size {
                    match pu.kind {
                        PowerUpKind::Shield => player.shield_timer = tuning::POWER_UP_DURATION,
                        PowerUpKind::RapidFire => {
                            player.rapid_fire_timer = tuning::POWER_UP_DURATION
                        }
                        PowerUpKind::SpeedBoost => {
                            player.speed_boost_timer = tuning::POWER_UP_DURATION
                        }
                    }
                    pu.life = 0.0;
                    break;
                }
            }
            pu.life > 0.0
        });
        self.power_ups = power_ups;
    }

    /// Bonfires burn nearby enemies with proximity-scaled damage over time
    /// and sputter embers. They persist until the fire bonus ends.
    pub(super) fn update_bonfires(&mut self, dt: f64) {
        let mut bonfires = mem::take(&mut self.bonfires);
        for bonfire in &mut bonfires {
            bonfire.time += dt;

            for enemy in &mut self.enemies {
                let dist = (enemy.x - bonfire.x).hypot(enemy.y - bonfire.y);
                if dist < bonfire.radius + enemy.size {
                    enemy.hp -= bonfire.dot_at(dist) * dt;
                }
            }

            if self.rng.random::<f64>() < 0.4 {
                let angle = self.rng.random::<f64>() * std::f64::consts::TAU;
                let speed = self.rng.random::<f64>() * 1.5 + 0.5;
                let size = self.rng.random::<f64>() * 3.0 + 2.0;
                let life = 0.4 + self.rng.random::<f64>() * 0.4;
                let color = BONFIRE_COLORS[self.rng.random_range(0..BONFIRE_COLORS.len())];
                self.particles.push(Particle::new(
                    bonfire.x + (self.rng.random::<f64>() - 0.5) * bonfire.size,
                    bonfire.y + (self.rng.random::<f64>() - 0.5) * bonfire.size,
                    angle.cos() * speed * 0.3,
                    // Embers rise.
                    -speed,
                    size,
                    life,
                    color,
                ));
            }
        }
        self.bonfires = bonfires;
    }
}
