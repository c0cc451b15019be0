mod ambient;
mod bonus;
mod combat;
mod movement;
mod serialize;
mod spawning;

#[cfg(test)]
mod tests;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::domain::effects::{Bonfire, FloatingText, Obstacle, Particle, PowerUp, Scenery, Star};
use crate::domain::enemy::{Enemy, EnemyId};
use crate::domain::player::{InputIntent, Player};
use crate::domain::snapshot::{GameOverSummary, PlayerScore};
use crate::domain::tuning::{self, DifficultyTuning};
use crate::domain::weapons::{Bomb, EnemyProjectile, Melee, Projectile};
use crate::domain::world_bonus::{BonusEvent, WorldBonus};

/// One joined player: the avatar plus the most recent input intent.
#[derive(Debug, Clone)]
pub struct PlayerEntry {
    pub player: Player,
    pub input: InputIntent,
    pub color_index: usize,
}

/// The authoritative state of one match.
///
/// Exclusively owned by its room's tick task: `tick` mutates, `serialize`
/// reads, and the two are never interleaved. All timers run on the internal
/// simulation clock (`now`), which advances only while the match runs, so
/// multiple rooms never share timing state.
pub struct GameSimulation {
    pub(crate) width: f64,
    pub(crate) height: f64,

    pub(crate) players: Vec<PlayerEntry>,
    pub(crate) next_color_index: usize,

    pub(crate) enemies: Vec<Enemy>,
    pub(crate) next_enemy_id: EnemyId,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) next_obstacle_id: u32,
    pub(crate) scenery: Vec<Scenery>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) bombs: Vec<Bomb>,
    pub(crate) melees: Vec<Melee>,
    pub(crate) particles: Vec<Particle>,
    pub(crate) messages: Vec<FloatingText>,
    pub(crate) enemy_projectiles: Vec<EnemyProjectile>,
    pub(crate) stars: Vec<Star>,
    pub(crate) power_ups: Vec<PowerUp>,
    pub(crate) bonfires: Vec<Bonfire>,

    pub(crate) world_bonus: WorldBonus,
    pub(crate) difficulty: DifficultyTuning,

    /// Simulation clock in seconds since match start.
    pub(crate) now: f64,
    pub(crate) game_running: bool,
    pub(crate) game_paused: bool,
    pub(crate) next_elite_spawn: f64,
    pub(crate) game_over: Option<GameOverSummary>,

    pub(crate) rng: ChaCha8Rng,
}

impl GameSimulation {
    pub fn new() -> Self {
        Self::with_rng(
            tuning::WORLD_WIDTH,
            tuning::WORLD_HEIGHT,
            ChaCha8Rng::from_os_rng(),
        )
    }

    /// Deterministic construction for tests.
    pub fn with_seed(width: f64, height: f64, seed: u64) -> Self {
        Self::with_rng(width, height, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(width: f64, height: f64, mut rng: ChaCha8Rng) -> Self {
        let next_elite_spawn = 60.0 + rng.random::<f64>() * 120.0;
        let mut sim = Self {
            width,
            height,
            players: Vec::new(),
            next_color_index: 0,
            enemies: Vec::new(),
            next_enemy_id: 1,
            obstacles: Vec::new(),
            next_obstacle_id: 1,
            scenery: Vec::new(),
            projectiles: Vec::new(),
            bombs: Vec::new(),
            melees: Vec::new(),
            particles: Vec::new(),
            messages: Vec::new(),
            enemy_projectiles: Vec::new(),
            stars: Vec::new(),
            power_ups: Vec::new(),
            bonfires: Vec::new(),
            world_bonus: WorldBonus::new(),
            difficulty: DifficultyTuning::default(),
            now: 0.0,
            game_running: true,
            game_paused: false,
            next_elite_spawn,
            game_over: None,
            rng,
        };
        sim.spawn_obstacles();
        sim.spawn_scenery();
        sim
    }

    // ----------------------------------------------------------------
    // Player management
    // ----------------------------------------------------------------

    /// Add a player near the world centre; returns the assigned color.
    pub fn add_player(&mut self, id: u64, name: &str) -> (usize, String) {
        let color_index = self.next_color_index % tuning::PLAYER_COLORS.len();
        self.next_color_index += 1;
        let color = tuning::PLAYER_COLORS[color_index].to_string();

        let x = self.width / 2.0 + (self.rng.random::<f64>() - 0.5) * 100.0;
        let y = self.height / 2.0 + (self.rng.random::<f64>() - 0.5) * 100.0;
        let player = Player::new(x, y, id, name.to_string(), color.clone());
        self.players.push(PlayerEntry {
            player,
            input: InputIntent::default(),
            color_index,
        });
        (color_index, color)
    }

    pub fn remove_player(&mut self, id: u64) {
        self.players.retain(|entry| entry.player.id != id);
    }

    /// Last-write-wins: the stored intent is read once per tick.
    pub fn set_player_input(&mut self, id: u64, input: InputIntent) {
        if let Some(entry) = self.players.iter_mut().find(|e| e.player.id == id) {
            entry.input = input;
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_running(&self) -> bool {
        self.game_running
    }

    pub fn is_paused(&self) -> bool {
        self.game_paused
    }

    /// Cooperative pause; distinct from the roulette-induced pause.
    pub fn toggle_pause(&mut self) -> bool {
        self.game_paused = !self.game_paused;
        self.game_paused
    }

    pub fn game_over(&self) -> Option<&GameOverSummary> {
        self.game_over.as_ref()
    }

    // ----------------------------------------------------------------
    // Main tick
    // ----------------------------------------------------------------

    pub fn tick(&mut self, dt: f64) {
        if !self.game_running || self.game_paused {
            return;
        }
        self.now += dt;

        // The bonus machine runs first so activation effects precede the
        // per-frame effects and everything else this tick.
        let event = self.world_bonus.update(dt, &mut self.rng);
        match event {
            Some(BonusEvent::SpinStart) => debug!("world bonus spin started"),
            Some(BonusEvent::Activated(bonus)) => self.activate_world_bonus(bonus),
            Some(BonusEvent::Ended(bonus)) => self.deactivate_world_bonus(bonus),
            None => {}
        }

        // While the wheel spins or the result is revealed, the scene is
        // frozen; callers still serialize and broadcast the overlay state.
        if self.world_bonus.is_pausing() {
            return;
        }

        self.update_players(dt);
        self.update_enemies(dt);
        self.update_projectiles(dt);
        self.update_melees(dt);
        self.update_bombs(dt);
        self.update_enemy_projectiles();
        self.update_particles(dt);
        self.update_stars(dt);
        self.update_power_ups(dt);
        self.update_messages(dt);
        self.update_bonfires(dt);
        self.update_scenery();

        if self.world_bonus.is_bonus_active() {
            self.apply_world_bonus_effects();
        }

        // Indirect damage (burn, bonfires, shrapnel) resolves before
        // collisions so nothing at zero hp survives into the next tick.
        self.cull_dead_enemies();

        self.check_collisions();

        self.spawn_enemies();
        self.spawn_stars();
        self.spawn_power_ups();

        // Passive score accrual for everyone still standing.
        for entry in &mut self.players {
            if entry.player.is_playing() {
                entry.player.score += dt;
            }
        }

        if self.is_game_over() {
            self.end_game();
        }
    }

    // ----------------------------------------------------------------
    // Lifecycle
    // ----------------------------------------------------------------

    fn is_game_over(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|e| !e.player.is_playing())
    }

    fn end_game(&mut self) {
        self.game_running = false;
        if let Some(bonus) = self.world_bonus.active_bonus {
            self.deactivate_world_bonus(bonus);
        }
        self.world_bonus.reset();
        self.bonfires.clear();

        let mut player_scores = Vec::with_capacity(self.players.len());
        let mut team_score = 0.0;
        for entry in &mut self.players {
            let p = &mut entry.player;
            let accuracy = if p.shots_fired > 0 {
                f64::from(p.shots_hit) / f64::from(p.shots_fired)
            } else {
                0.0
            };
            // One-shot accuracy bonus, applied exactly once per match.
            p.score += (accuracy * 100.0).floor();
            team_score += p.score;
            player_scores.push(PlayerScore {
                id: p.id,
                name: p.name.clone(),
                color: p.color.clone(),
                score: p.score.floor() as i64,
                accuracy: (accuracy * 100.0).floor() as i64,
            });
        }

        self.game_over = Some(GameOverSummary {
            player_scores,
            team_score: team_score.floor() as i64,
        });
        debug!(players = self.players.len(), "match ended");
    }

    // ----------------------------------------------------------------
    // Shared helpers
    // ----------------------------------------------------------------

    pub(crate) fn difficulty_elapsed(&self) -> f64 {
        self.now
    }

    pub(crate) fn enemy_scale(&self) -> f64 {
        1.0 + self.difficulty_elapsed() / 120.0
    }

    /// Deduct a life and either respawn with fresh i-frames or mark dead.
    /// The player is passed in because callers iterate a taken-out roster.
    pub(crate) fn handle_player_death(&mut self, player: &mut Player) {
        player.lives = player.lives.saturating_sub(1);
        if player.lives > 0 {
            let x = self.width / 2.0 + (self.rng.random::<f64>() - 0.5) * 100.0;
            let y = self.height / 2.0 + (self.rng.random::<f64>() - 0.5) * 100.0;
            player.respawn(x, y, self.now);
        } else {
            player.alive = false;
        }
    }
}

impl Default for GameSimulation {
    fn default() -> Self {
        Self::new()
    }
}
