use std::collections::HashMap;
use std::f64::consts::TAU;
use std::mem;

use rand::Rng;

use crate::domain::enemy::{
    CHARGE_SPEED_FACTOR, EnemyId, EnemyKind, ORBITAL_ROTATION_SPEED, ORBITAL_SHOT_COOLDOWN,
    ORBITAL_VOLLEY,
};
use crate::domain::player::{InputIntent, Player};
use crate::domain::tuning::{self, PlayerTuning};
use crate::domain::weapons::{
    BOMB_CRIT_CHANCE, Bomb, EnemyProjectile, Melee, PROJECTILE_CRIT_CHANCE, Projectile,
};

use super::GameSimulation;

impl GameSimulation {
    pub(super) fn update_players(&mut self, dt: f64) {
        let tune = PlayerTuning::default();
        let mut players = mem::take(&mut self.players);
        for entry in &mut players {
            if entry.player.is_playing() {
                let input = entry.input;
                self.update_single_player(&mut entry.player, input, dt, &tune);
            }
        }
        self.players = players;
    }

    fn update_single_player(
        &mut self,
        player: &mut Player,
        input: InputIntent,
        dt: f64,
        tune: &PlayerTuning,
    ) {
        let mut dx: f64 = 0.0;
        let mut dy: f64 = 0.0;
        if input.up {
            dy -= 1.0;
        }
        if input.down {
            dy += 1.0;
        }
        if input.left {
            dx -= 1.0;
        }
        if input.right {
            dx += 1.0;
        }

        let speed_mult = if player.speed_boost_timer > 0.0 {
            tuning::SPEED_BOOST_MULTIPLIER
        } else {
            1.0
        };
        if dx != 0.0 || dy != 0.0 {
            let direction = dy.atan2(dx);
            player.angle = direction;
            player.vx += direction.cos() * tune.acceleration * speed_mult;
            player.vy += direction.sin() * tune.acceleration * speed_mult;
            let speed = player.vx.hypot(player.vy);
            let cap = tune.max_speed * speed_mult;
            if speed > cap {
                player.vx *= cap / speed;
                player.vy *= cap / speed;
            }
        } else {
            player.vx *= 1.0 - tune.deceleration;
            player.vy *= 1.0 - tune.deceleration;
        }

        player.x += player.vx;
        player.y += player.vy;

        // The world is toroidal for players: stepping off one edge re-enters
        // from the opposite one.
        if player.x < 0.0 {
            player.x = self.width;
        }
        if player.x > self.width {
            player.x = 0.0;
        }
        if player.y < 0.0 {
            player.y = self.height;
        }
        if player.y > self.height {
            player.y = 0.0;
        }

        if input.shoot {
            self.player_shoot(player);
        }
        if input.melee {
            self.player_melee(player);
        }
        if input.bomb {
            self.player_bomb(player);
        }

        player.tick_timers(dt);
    }

    fn player_shoot(&mut self, player: &mut Player) {
        if player.shoot_cooldown > 0.0 || player.acorns == 0 {
            return;
        }
        let critical = self.rng.random::<f64>() < PROJECTILE_CRIT_CHANCE;
        let projectile = Projectile::new(
            player.x,
            player.y,
            player.angle,
            critical,
            player.id,
            &mut self.rng,
        );
        self.projectiles.push(projectile);

        let rate = if player.rapid_fire_timer > 0.0 {
            tuning::RAPID_FIRE_RATE
        } else {
            1.0
        };
        player.shoot_cooldown = tuning::SHOOT_COOLDOWN / rate;
        player.acorns -= 1;
        player.shots_fired += 1;
    }

    fn player_melee(&mut self, player: &mut Player) {
        if player.melee_cooldown > 0.0 {
            return;
        }
        let critical = self.rng.random::<f64>() < player.melee_crit_chance();
        if critical {
            // The streak buys the crit and is spent by it.
            player.melee_hit_streak = 0;
        }
        self.melees
            .push(Melee::new(player.x, player.y, player.angle, critical, player.id));
        player.melee_cooldown = tuning::MELEE_COOLDOWN;
    }

    fn player_bomb(&mut self, player: &mut Player) {
        if player.bomb_cooldown > 0.0 || player.bombs == 0 {
            return;
        }
        let critical = self.rng.random::<f64>() < BOMB_CRIT_CHANCE;
        // Dropped behind the player so a moving thrower escapes the blast.
        let x = player.x - player.angle.cos() * player.size;
        let y = player.y - player.angle.sin() * player.size;
        self.bombs.push(Bomb::new(x, y, critical, player.id));
        player.bomb_cooldown = tuning::BOMB_COOLDOWN;
        player.bombs -= 1;
    }

    pub(super) fn update_enemies(&mut self, dt: f64) {
        let targets: Vec<(f64, f64)> = self
            .players
            .iter()
            .filter(|e| e.player.is_playing() && !e.player.is_hiding())
            .map(|e| (e.player.x, e.player.y))
            .collect();

        let mut enemies = mem::take(&mut self.enemies);

        // Movers first; orbitals follow in a second pass so they track their
        // parent's position from this tick.
        for enemy in &mut enemies {
            enemy.apply_fire_dot(dt);
            match &mut enemy.kind {
                EnemyKind::Orbital { .. } => continue,
                EnemyKind::Charging {
                    trigger_radius,
                    base_speed,
                } => {
                    let trigger = *trigger_radius;
                    let charge_speed = *base_speed * CHARGE_SPEED_FACTOR;
                    if let Some((tx, ty, dist)) = nearest_target(&targets, enemy.x, enemy.y) {
                        if dist < trigger {
                            let angle = (ty - enemy.y).atan2(tx - enemy.x);
                            enemy.vx = angle.cos() * charge_speed;
                            enemy.vy = angle.sin() * charge_speed;
                        }
                    }
                }
                _ => {}
            }
            enemy.integrate();
        }

        let parents: HashMap<EnemyId, (f64, f64, f64)> = enemies
            .iter()
            .filter(|e| !matches!(e.kind, EnemyKind::Orbital { .. }))
            .map(|e| (e.id, (e.x, e.y, e.hp)))
            .collect();

        let mut i = enemies.len();
        while i > 0 {
            i -= 1;
            let keep = {
                let enemy = &mut enemies[i];
                let EnemyKind::Orbital {
                    parent,
                    angle,
                    radius,
                    last_shot,
                } = &mut enemy.kind
                else {
                    continue;
                };
                match parents.get(parent) {
                    Some(&(px, py, parent_hp)) if parent_hp > 0.0 => {
                        *angle += ORBITAL_ROTATION_SPEED;
                        enemy.x = px + angle.cos() * *radius;
                        enemy.y = py + angle.sin() * *radius;
                        if self.now - *last_shot > ORBITAL_SHOT_COOLDOWN {
                            *last_shot = self.now;
                            let (ex, ey) = (enemy.x, enemy.y);
                            for k in 0..ORBITAL_VOLLEY {
                                let a = k as f64 / ORBITAL_VOLLEY as f64 * TAU;
                                self.enemy_projectiles.push(EnemyProjectile::new(ex, ey, a));
                            }
                        }
                        true
                    }
                    // Parent gone: the ring despawns quietly, no score.
                    _ => false,
                }
            };
            if !keep {
                enemies.remove(i);
            }
        }

        enemies.retain(|e| e.in_bounds(self.width, self.height));
        self.enemies = enemies;
    }

    /// Scenery drifts slowly and counter-scrolls against the average player
    /// velocity for a parallax feel, wrapping at the world edges.
    pub(super) fn update_scenery(&mut self) {
        let mut avg_vx = 0.0;
        let mut avg_vy = 0.0;
        let mut alive = 0usize;
        for entry in &self.players {
            if entry.player.is_playing() {
                avg_vx += entry.player.vx;
                avg_vy += entry.player.vy;
                alive += 1;
            }
        }
        if alive > 0 {
            avg_vx /= alive as f64;
            avg_vy /= alive as f64;
        }

        for obj in &mut self.scenery {
            obj.x -= avg_vx * 0.2;
            obj.y -= avg_vy * 0.2;
            obj.x += obj.vx;
            obj.y += obj.vy;
            obj.scale_phase += obj.scale_speed;
            obj.size = obj.base_size + obj.scale_phase.sin() * obj.scale_range;
            if obj.x < 0.0 {
                obj.x += self.width;
            }
            if obj.x > self.width {
                obj.x -= self.width;
            }
            if obj.y < 0.0 {
                obj.y += self.height;
            }
            if obj.y > self.height {
                obj.y -= self.height;
            }
        }
    }
}

fn nearest_target(targets: &[(f64, f64)], x: f64, y: f64) -> Option<(f64, f64, f64)> {
    targets
        .iter()
        .map(|&(tx, ty)| (tx, ty, (tx - x).hypot(ty - y)))
        .min_by(|a, b| a.2.total_cmp(&b.2))
}
