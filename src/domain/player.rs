use crate::domain::tuning::{self, PlayerTuning};

/// Latest movement/action intent received from a client.
///
/// Intents are unreliable and last-write-wins: the simulation reads whatever
/// value was most recently stored for the player each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    pub melee: bool,
    pub bomb: bool,
}

/// One player avatar, owned by the simulation for the lifetime of a room.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub color: String,

    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub angle: f64,
    pub size: f64,

    pub hp: f64,
    pub lives: u32,
    pub acorns: u32,
    pub bombs: u32,
    pub alive: bool,

    // Score is fractional because of passive per-second accrual; it is
    // floored at the serialization boundary.
    pub score: f64,
    pub combo_multiplier: u32,
    pub last_kill_time: f64,

    pub shoot_cooldown: f64,
    pub melee_cooldown: f64,
    pub bomb_cooldown: f64,

    pub shield_timer: f64,
    pub rapid_fire_timer: f64,
    pub speed_boost_timer: f64,
    /// Simulation timestamp until which incoming damage is ignored.
    pub invulnerable_until: f64,

    // World bonus state.
    pub wind_bonus_active: bool,
    pub earth_bonus_active: bool,
    pub freeze_bonus_active: bool,
    pub fire_bonus_active: bool,
    pub fire_immune: bool,
    /// Obstacle id the player is hiding inside during an Earth bonus.
    pub hiding_in_obstacle: Option<u32>,

    // Accuracy bookkeeping for the end-of-match bonus.
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub melee_hit_streak: u32,
}

impl Player {
    pub fn new(x: f64, y: f64, id: u64, name: String, color: String) -> Self {
        let t = PlayerTuning::default();
        Self {
            id,
            name,
            color,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            angle: 0.0,
            size: t.size,
            hp: t.hp,
            lives: t.lives,
            acorns: t.acorns,
            bombs: t.bombs,
            alive: true,
            score: 0.0,
            combo_multiplier: 1,
            last_kill_time: f64::NEG_INFINITY,
            shoot_cooldown: 0.0,
            melee_cooldown: 0.0,
            bomb_cooldown: 0.0,
            shield_timer: 0.0,
            rapid_fire_timer: 0.0,
            speed_boost_timer: 0.0,
            invulnerable_until: 0.0,
            wind_bonus_active: false,
            earth_bonus_active: false,
            freeze_bonus_active: false,
            fire_bonus_active: false,
            fire_immune: false,
            hiding_in_obstacle: None,
            shots_fired: 0,
            shots_hit: 0,
            melee_hit_streak: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.alive && self.lives > 0
    }

    pub fn is_invulnerable(&self, now: f64) -> bool {
        now < self.invulnerable_until
    }

    /// Whether the player currently shrugs off damage (shield or i-frames).
    pub fn is_protected(&self, now: f64) -> bool {
        self.is_invulnerable(now) || self.shield_timer > 0.0
    }

    /// Earth bonus: collisions and enemy fire are suppressed while hiding.
    pub fn is_hiding(&self) -> bool {
        self.earth_bonus_active && self.hiding_in_obstacle.is_some()
    }

    /// Award a kill, growing the combo when it lands inside the rolling
    /// window. Returns the multiplier applied so callers can surface combo
    /// feedback (floating text) for 2x and above.
    pub fn add_kill_score(&mut self, now: f64, base_score: u32) -> u32 {
        if now - self.last_kill_time <= tuning::COMBO_WINDOW {
            self.combo_multiplier += 1;
        } else {
            self.combo_multiplier = 1;
        }
        self.last_kill_time = now;
        self.score += f64::from(base_score * self.combo_multiplier);
        self.combo_multiplier
    }

    /// Critical melee chance grows with consecutive hits.
    pub fn melee_crit_chance(&self) -> f64 {
        (0.1 + 0.02 * f64::from(self.melee_hit_streak)).min(0.5)
    }

    pub fn tick_timers(&mut self, dt: f64) {
        self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);
        self.melee_cooldown = (self.melee_cooldown - dt).max(0.0);
        self.bomb_cooldown = (self.bomb_cooldown - dt).max(0.0);
        self.shield_timer = (self.shield_timer - dt).max(0.0);
        self.rapid_fire_timer = (self.rapid_fire_timer - dt).max(0.0);
        self.speed_boost_timer = (self.speed_boost_timer - dt).max(0.0);
    }

    /// Reset combat state after losing a life but with lives remaining.
    pub fn respawn(&mut self, x: f64, y: f64, now: f64) {
        let t = PlayerTuning::default();
        self.hp = t.hp;
        self.acorns = tuning::RESPAWN_ACORNS;
        self.bombs = tuning::RESPAWN_BOMBS;
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.combo_multiplier = 1;
        self.last_kill_time = f64::NEG_INFINITY;
        self.hiding_in_obstacle = None;
        self.invulnerable_until = now + tuning::RESPAWN_INVULN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_grows_inside_window() {
        let mut p = Player::new(0.0, 0.0, 1, "p".into(), "#fff".into());
        p.add_kill_score(10.0, 10);
        p.add_kill_score(11.0, 10);
        // Second kill lands at 2x, so the pair is worth strictly more than 20.
        assert_eq!(p.combo_multiplier, 2);
        assert!(p.score > 20.0);
        assert_eq!(p.score, 30.0);
    }

    #[test]
    fn combo_resets_outside_window() {
        let mut p = Player::new(0.0, 0.0, 1, "p".into(), "#fff".into());
        p.add_kill_score(10.0, 10);
        p.add_kill_score(14.0, 10);
        assert_eq!(p.combo_multiplier, 1);
        assert_eq!(p.score, 20.0);
    }

    #[test]
    fn respawn_restores_loadout_and_grants_iframes() {
        let mut p = Player::new(0.0, 0.0, 1, "p".into(), "#fff".into());
        p.hp = 0.0;
        p.acorns = 0;
        p.bombs = 0;
        p.respawn(100.0, 100.0, 42.0);
        assert_eq!(p.hp, 100.0);
        assert_eq!(p.acorns, tuning::RESPAWN_ACORNS);
        assert!(p.is_invulnerable(42.0 + 1.0));
        assert!(!p.is_invulnerable(42.0 + 4.0));
    }
}
