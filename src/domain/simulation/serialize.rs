use crate::domain::snapshot::{
    BombView, BonfireView, EnemyProjectileView, EnemyView, MeleeView, MessageView, ObstacleView,
    ParticleView, PlayerView, PowerUpView, ProjectileView, SceneryView, StarView, WorldBonusView,
    WorldSnapshot,
};
use crate::domain::world_bonus::Bonus;

use super::GameSimulation;

impl GameSimulation {
    /// Full world snapshot for broadcast. Scores are floored on the way out;
    /// the fractional passive accrual stays internal.
    pub fn serialize(&self) -> WorldSnapshot {
        let mut team_score = 0.0;
        let mut players = Vec::with_capacity(self.players.len());
        for entry in &self.players {
            let p = &entry.player;
            team_score += p.score;
            players.push(PlayerView {
                id: p.id,
                name: p.name.clone(),
                color: p.color.clone(),
                x: p.x,
                y: p.y,
                angle: p.angle,
                size: p.size,
                vx: p.vx,
                vy: p.vy,
                hp: p.hp,
                lives: p.lives,
                acorns: p.acorns,
                bombs: p.bombs,
                score: p.score.floor() as i64,
                combo_multiplier: p.combo_multiplier,
                alive: p.alive,
                shield_timer: p.shield_timer,
                rapid_fire_timer: p.rapid_fire_timer,
                speed_boost_timer: p.speed_boost_timer,
                wind_bonus_active: p.wind_bonus_active,
                earth_bonus_active: p.earth_bonus_active,
                freeze_bonus_active: p.freeze_bonus_active,
                fire_bonus_active: p.fire_bonus_active,
                fire_immune: p.fire_immune,
                hiding_in_obstacle: p.hiding_in_obstacle.is_some(),
                invulnerable: p.is_invulnerable(self.now),
                shots_fired: p.shots_fired,
                shots_hit: p.shots_hit,
                melee_hit_streak: p.melee_hit_streak,
            });
        }

        WorldSnapshot {
            players,
            team_score: team_score.floor() as i64,
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    type_tag: e.type_tag(),
                    x: e.x,
                    y: e.y,
                    size: e.size,
                    hp: e.hp,
                    shape: e.shape(),
                    frozen: e.frozen,
                    fire_dot: e.fire_dot,
                    shield: e.shield(),
                    shield_max: e.shield_max(),
                    vx: e.vx,
                    vy: e.vy,
                })
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    x: p.x,
                    y: p.y,
                    size: p.size,
                    angle: p.angle,
                    owner_id: p.owner,
                })
                .collect(),
            enemy_projectiles: self
                .enemy_projectiles
                .iter()
                .map(|p| EnemyProjectileView {
                    x: p.x,
                    y: p.y,
                    size: p.size,
                })
                .collect(),
            bombs: self
                .bombs
                .iter()
                .map(|b| BombView {
                    x: b.x,
                    y: b.y,
                    current_radius: b.current_radius,
                    opacity: b.opacity,
                    ring_radius: b.ring_radius,
                    ring_opacity: b.ring_opacity,
                    owner_id: b.owner,
                })
                .collect(),
            melees: self
                .melees
                .iter()
                .map(|m| MeleeView {
                    x: m.x,
                    y: m.y,
                    angle: m.angle,
                    range: m.range,
                    progress: m.progress(),
                    is_critical: m.critical,
                    owner_id: m.owner,
                })
                .collect(),
            particles: self
                .particles
                .iter()
                .map(|p| ParticleView {
                    x: p.x,
                    y: p.y,
                    size: p.size,
                    color: p.color,
                    life: p.life,
                })
                .collect(),
            stars: self
                .stars
                .iter()
                .map(|s| StarView {
                    x: s.x,
                    y: s.y,
                    size: s.size,
                })
                .collect(),
            power_ups: self
                .power_ups
                .iter()
                .map(|pu| PowerUpView {
                    x: pu.x,
                    y: pu.y,
                    size: pu.size,
                    type_tag: pu.kind.type_tag(),
                })
                .collect(),
            bonfires: self
                .bonfires
                .iter()
                .map(|b| BonfireView {
                    x: b.x,
                    y: b.y,
                    radius: b.radius,
                    size: b.size,
                    time: b.time,
                })
                .collect(),
            obstacles: self
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    x: o.x,
                    y: o.y,
                    size: o.size,
                })
                .collect(),
            scenery: self
                .scenery
                .iter()
                .map(|s| SceneryView {
                    x: s.x,
                    y: s.y,
                    size: s.size,
                    type_tag: s.kind,
                })
                .collect(),
            messages: self
                .messages
                .iter()
                .map(|m| MessageView {
                    x: m.x,
                    y: m.y,
                    text: m.text.clone(),
                    life: m.life,
                    duration: m.duration,
                })
                .collect(),
            world_bonus: WorldBonusView {
                phase: self.world_bonus.phase.id(),
                countdown_timer: self.world_bonus.countdown_timer,
                active_bonus: self.world_bonus.active_bonus.map(Bonus::id),
                bonus_timer: self.world_bonus.bonus_timer,
                spin_elapsed: self.world_bonus.spin_elapsed,
                spin_total_rotation: self.world_bonus.spin_total_rotation,
                spin_current_angle: self.world_bonus.spin_current_angle,
                selected_index: self.world_bonus.selected_index,
                reveal_elapsed: self.world_bonus.reveal_elapsed,
            },
            world_width: self.width,
            world_height: self.height,
            game_running: self.game_running,
            game_paused: self.game_paused,
            game_over_data: self.game_over.clone(),
        }
    }
}
