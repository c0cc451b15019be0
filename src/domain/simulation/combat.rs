use std::mem;

use rand::Rng;

use crate::domain::effects::{FloatingText, Particle};
use crate::domain::enemy::{Enemy, EnemyKind};
use crate::domain::normalize_angle;
use crate::domain::player::Player;
use crate::domain::tuning;
use crate::domain::weapons::{MELEE_ARC, MELEE_SHIELD_CHIP};

use super::GameSimulation;

impl GameSimulation {
    pub(super) fn update_projectiles(&mut self, dt: f64) {
        let mut projectiles = mem::take(&mut self.projectiles);
        let mut kept = Vec::with_capacity(projectiles.len());
        for mut proj in projectiles.drain(..) {
            proj.advance(dt);
            if !proj.in_bounds(self.width, self.height) {
                continue;
            }
            let hit = self
                .enemies
                .iter()
                .position(|e| (e.x - proj.x).hypot(e.y - proj.y) < e.size + proj.size);
            if let Some(i) = hit {
                self.enemies[i].apply_damage(proj.damage);
                if let Some(p) = self.player_mut(proj.owner) {
                    p.shots_hit += 1;
                }
                if self.enemies[i].hp <= 0.0 {
                    let dead = self.destroy_enemy(i, true);
                    self.award_kill_to(proj.owner, dead.base_score());
                }
                // One target per shot.
                continue;
            }
            kept.push(proj);
        }
        self.projectiles = kept;
    }

    pub(super) fn update_melees(&mut self, dt: f64) {
        let mut melees = mem::take(&mut self.melees);
        let mut kept = Vec::with_capacity(melees.len());
        for mut melee in melees.drain(..) {
            if melee.expired() {
                continue;
            }
            let mut i = self.enemies.len();
            while i > 0 {
                i -= 1;
                let (id, dist, angle_ok, shielded) = {
                    let enemy = &self.enemies[i];
                    let dx = enemy.x - melee.x;
                    let dy = enemy.y - melee.y;
                    let dist = dx.hypot(dy);
                    let angle_diff = normalize_angle(dy.atan2(dx) - melee.angle).abs();
                    (
                        enemy.id,
                        dist - enemy.size,
                        angle_diff <= MELEE_ARC,
                        enemy.shield() > 0.0,
                    )
                };
                if melee.already_hit.contains(&id) || dist > melee.range || !angle_ok {
                    continue;
                }
                melee.already_hit.insert(id);
                if shielded {
                    // A swing chips the shield instead of killing outright.
                    self.enemies[i].apply_damage(MELEE_SHIELD_CHIP);
                    if self.enemies[i].hp <= 0.0 {
                        let dead = self.destroy_enemy(i, false);
                        self.credit_melee_kill(melee.owner, dead.base_score());
                    }
                } else {
                    // Unshielded targets are cleaved in one hit, whole.
                    let dead = self.destroy_enemy(i, false);
                    self.credit_melee_kill(melee.owner, dead.base_score());
                }
            }
            melee.age += dt;
            kept.push(melee);
        }
        self.melees = kept;
    }

    pub(super) fn update_bombs(&mut self, dt: f64) {
        let mut bombs = mem::take(&mut self.bombs);
        let mut kept = Vec::with_capacity(bombs.len());
        for mut bomb in bombs.drain(..) {
            let alive = bomb.advance(dt);
            let mut i = self.enemies.len();
            while i > 0 {
                i -= 1;
                let (id, in_blast) = {
                    let enemy = &self.enemies[i];
                    let dist = (enemy.x - bomb.x).hypot(enemy.y - bomb.y);
                    (enemy.id, dist < bomb.current_radius + enemy.size)
                };
                if !in_blast || bomb.hit_enemies.contains(&id) {
                    continue;
                }
                bomb.hit_enemies.insert(id);
                // Blasts ignore elite shields.
                self.enemies[i].apply_damage_piercing(bomb.damage);
                if self.enemies[i].hp <= 0.0 {
                    let dead = self.destroy_enemy(i, true);
                    self.award_kill_to(bomb.owner, dead.base_score());
                }
            }
            if alive {
                kept.push(bomb);
            }
        }
        self.bombs = kept;
    }

    pub(super) fn update_enemy_projectiles(&mut self) {
        let mut shots = mem::take(&mut self.enemy_projectiles);
        let mut kept = Vec::with_capacity(shots.len());
        for mut shot in shots.drain(..) {
            shot.advance();
            if !shot.in_bounds(self.width, self.height) {
                continue;
            }

            // Players first. A blocked hit still consumes the shot.
            let mut players = mem::take(&mut self.players);
            let mut absorbed = false;
            for entry in &mut players {
                let player = &mut entry.player;
                if !player.is_playing() || player.is_hiding() {
                    continue;
                }
                let dist = (player.x - shot.x).hypot(player.y - shot.y);
                if dist < shot.size + player.size {
                    if !player.is_protected(self.now) {
                        player.hp -= shot.damage;
                        player.invulnerable_until = self.now + tuning::HIT_INVULN;
                        if player.hp <= 0.0 {
                            self.handle_player_death(player);
                        }
                    }
                    absorbed = true;
                    break;
                }
            }
            self.players = players;
            if absorbed {
                continue;
            }

            // Friendly fire: orbital volleys hurt other enemies too.
            let hit = self
                .enemies
                .iter()
                .position(|e| (e.x - shot.x).hypot(e.y - shot.y) < shot.size + e.size);
            if let Some(i) = hit {
                self.enemies[i].apply_damage(shot.damage);
                if self.enemies[i].hp <= 0.0 {
                    let dead = self.destroy_enemy(i, true);
                    self.award_team_kill(dead.base_score());
                }
                continue;
            }

            kept.push(shot);
        }
        self.enemy_projectiles = kept;
    }

    pub(super) fn check_collisions(&mut self) {
        let mut players = mem::take(&mut self.players);
        for entry in &mut players {
            let player = &mut entry.player;
            if !player.is_playing() {
                continue;
            }

            if !player.is_hiding() {
                self.collide_player_enemies(player);
            }

            if player.earth_bonus_active {
                self.update_hiding_state(player);
            } else {
                self.collide_player_obstacles(player);
            }
        }
        self.players = players;
    }

    /// Elastic bounce off enemy bodies plus symmetric contact damage: the
    /// enemy takes its own damage value, the player takes it too unless
    /// protected. Contact kills award no score.
    fn collide_player_enemies(&mut self, player: &mut Player) {
        let mut i = self.enemies.len();
        while i > 0 {
            i -= 1;
            let (dist, combined, damage) = {
                let enemy = &self.enemies[i];
                let dist = (player.x - enemy.x).hypot(player.y - enemy.y);
                (dist, enemy.size + player.size, enemy.damage)
            };
            if dist >= combined || dist <= 0.0 {
                continue;
            }

            let enemy = &self.enemies[i];
            let normal_x = (player.x - enemy.x) / dist;
            let normal_y = (player.y - enemy.y) / dist;
            let dot = player.vx * normal_x + player.vy * normal_y;
            player.vx -= 2.0 * dot * normal_x;
            player.vy -= 2.0 * dot * normal_y;
            let overlap = combined - dist;
            player.x += normal_x * overlap;
            player.y += normal_y * overlap;

            if !player.is_protected(self.now) {
                player.hp -= damage;
                self.enemies[i].hp -= damage;
                player.invulnerable_until = self.now + tuning::HIT_INVULN;

                if self.enemies[i].hp <= 0.0 {
                    self.destroy_enemy(i, true);
                }
                if player.hp <= 0.0 {
                    self.handle_player_death(player);
                }
            }
        }
    }

    fn collide_player_obstacles(&mut self, player: &mut Player) {
        for idx in 0..self.obstacles.len() {
            let obstacle = self.obstacles[idx];
            let dist = (player.x - obstacle.x).hypot(player.y - obstacle.y);
            if dist >= obstacle.size + player.size || dist <= 0.0 {
                continue;
            }

            let normal_x = (player.x - obstacle.x) / dist;
            let normal_y = (player.y - obstacle.y) / dist;
            let dot = player.vx * normal_x + player.vy * normal_y;
            player.vx -= 2.0 * dot * normal_x;
            player.vy -= 2.0 * dot * normal_y;
            let overlap = (obstacle.size + player.size) - dist;
            player.x += normal_x * overlap;
            player.y += normal_y * overlap;

            if !player.is_protected(self.now) {
                player.hp -= tuning::OBSTACLE_CONTACT_DAMAGE;
                player.invulnerable_until = self.now + tuning::HIT_INVULN;
                if player.hp <= 0.0 {
                    self.handle_player_death(player);
                }
            }
        }
    }

    /// Earth bonus: track which bush the player occupies. Leaving one (or
    /// hopping to another) detonates the one left behind.
    fn update_hiding_state(&mut self, player: &mut Player) {
        let inside = self
            .obstacles
            .iter()
            .find(|o| (player.x - o.x).hypot(player.y - o.y) < o.size)
            .map(|o| o.id);
        match (inside, player.hiding_in_obstacle) {
            (Some(id), None) => player.hiding_in_obstacle = Some(id),
            (Some(id), Some(current)) if id != current => {
                self.earth_explode_obstacle(current, player.x, player.y);
                player.hiding_in_obstacle = Some(id);
            }
            (None, Some(current)) => {
                self.earth_explode_obstacle(current, player.x, player.y);
                player.hiding_in_obstacle = None;
            }
            _ => {}
        }
    }

    /// Remove every enemy whose hp reached zero through indirect damage
    /// (burn, bonfires, shrapnel) this tick. These kills have no single
    /// owner, so every standing player shares the credit. Orphaned orbitals
    /// despawn without ceremony.
    pub(super) fn cull_dead_enemies(&mut self) {
        let mut i = self.enemies.len();
        while i > 0 {
            i -= 1;
            if self.enemies[i].hp > 0.0 {
                continue;
            }
            if matches!(self.enemies[i].kind, EnemyKind::Orbital { .. }) {
                self.enemies.remove(i);
                continue;
            }
            let dead = self.destroy_enemy(i, true);
            self.award_team_kill(dead.base_score());
        }
    }

    // ----------------------------------------------------------------
    // Kill bookkeeping
    // ----------------------------------------------------------------

    fn destroy_enemy(&mut self, index: usize, split: bool) -> Enemy {
        let dead = self.enemies.remove(index);
        if split {
            self.split_square(&dead);
        }
        self.death_burst(dead.x, dead.y);
        dead
    }

    /// Squares shatter into two of the next stage down; other kinds don't.
    fn split_square(&mut self, dead: &Enemy) {
        let EnemyKind::Square(stage) = dead.kind else {
            return;
        };
        let Some(next) = stage.split_into() else {
            return;
        };
        for _ in 0..2 {
            let a = self.rng.random::<f64>() * std::f64::consts::TAU;
            let id = self.alloc_enemy_id();
            self.enemies
                .push(Enemy::square(id, next, dead.x, dead.y, a.cos(), a.sin()));
        }
    }

    fn death_burst(&mut self, x: f64, y: f64) {
        for _ in 0..6 {
            let a = self.rng.random::<f64>() * std::f64::consts::TAU;
            let s = self.rng.random::<f64>() * 2.0 + 1.0;
            self.particles
                .push(Particle::new(x, y, a.cos() * s, a.sin() * s, 2.0, 0.5, "orange"));
        }
    }

    fn player_mut(&mut self, id: Option<u64>) -> Option<&mut Player> {
        let id = id?;
        self.players
            .iter_mut()
            .map(|e| &mut e.player)
            .find(|p| p.id == id)
    }

    /// Direct weapon kills credit the shooter. A zero-score kill still feeds
    /// the combo chain. No-op once the owner has left the room.
    fn award_kill_to(&mut self, owner: Option<u64>, base_score: u32) {
        let now = self.now;
        let Some(player) = self.player_mut(owner) else {
            return;
        };
        let multiplier = player.add_kill_score(now, base_score);
        let (x, y) = (player.x, player.y);
        if multiplier >= 2 {
            self.messages
                .push(FloatingText::new(x, y - 30.0, format!("x{multiplier}!"), 1.0));
        }
    }

    fn credit_melee_kill(&mut self, owner: Option<u64>, base_score: u32) {
        if let Some(player) = self.player_mut(owner) {
            player.melee_hit_streak += 1;
        }
        self.award_kill_to(owner, base_score);
    }

    /// Ownerless kills pay out to every standing player.
    fn award_team_kill(&mut self, base_score: u32) {
        let now = self.now;
        let mut callouts = Vec::new();
        for entry in &mut self.players {
            let player = &mut entry.player;
            if !player.is_playing() {
                continue;
            }
            let multiplier = player.add_kill_score(now, base_score);
            if multiplier >= 2 {
                callouts.push((player.x, player.y - 30.0, multiplier));
            }
        }
        for (x, y, multiplier) in callouts {
            self.messages
                .push(FloatingText::new(x, y, format!("x{multiplier}!"), 1.0));
        }
    }
}
