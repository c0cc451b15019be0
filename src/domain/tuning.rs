/// Gameplay tuning for the arena simulation.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer
/// sizes, etc.), which lives in `frameworks::config`.

pub const WORLD_WIDTH: f64 = 1600.0;
pub const WORLD_HEIGHT: f64 = 1200.0;

pub const MAX_PLAYERS: usize = 4;

/// Assigned round-robin as players join a room.
pub const PLAYER_COLORS: [&str; 4] = ["#ffa500", "#4fc3f7", "#81c784", "#e57373"];

/// Gameplay tuning for player avatars.
#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// World-space collision radius in pixels.
    pub size: f64,
    /// Speed cap in pixels per tick.
    pub max_speed: f64,
    /// Velocity gained per tick while a movement key is held.
    pub acceleration: f64,
    /// Fraction of velocity lost per tick while coasting.
    pub deceleration: f64,
    pub hp: f64,
    /// Ranged ammo granted at match start.
    pub acorns: u32,
    pub bombs: u32,
    pub lives: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: 20.0,
            max_speed: 4.0,
            acceleration: 0.2,
            deceleration: 0.05,
            hp: 100.0,
            acorns: 200,
            bombs: 5,
            lives: 3,
        }
    }
}

// Ammo restored on respawn is lower than the starting loadout.
pub const RESPAWN_ACORNS: u32 = 100;
pub const RESPAWN_BOMBS: u32 = 5;
pub const ACORN_CAP: u32 = 100;
pub const STAR_ACORNS: u32 = 10;

// Weapon cooldowns in seconds.
pub const SHOOT_COOLDOWN: f64 = 0.05;
pub const MELEE_COOLDOWN: f64 = 0.5;
pub const BOMB_COOLDOWN: f64 = 3.0;

// Post-hit invulnerability windows in seconds.
pub const HIT_INVULN: f64 = 0.12;
pub const RESPAWN_INVULN: f64 = 3.0;

/// Kills within this window of the previous kill grow the combo multiplier.
pub const COMBO_WINDOW: f64 = 3.0;

// Status effect durations in seconds (power-up pickups).
pub const POWER_UP_DURATION: f64 = 5.0;

/// Speed boost multiplies both acceleration and the speed cap.
pub const SPEED_BOOST_MULTIPLIER: f64 = 1.5;
/// Rapid fire divides the shoot cooldown.
pub const RAPID_FIRE_RATE: f64 = 2.0;

/// Contact with an obstacle chips one hp per i-frame window.
pub const OBSTACLE_CONTACT_DAMAGE: f64 = 1.0;

// Per-tick pickup spawn chances; pickups despawn after 5-8 seconds.
pub const STAR_SPAWN_CHANCE: f64 = 0.01;
pub const POWER_UP_SPAWN_CHANCE: f64 = 0.003;
pub const PICKUP_LIFE_MIN: f64 = 5.0;
pub const PICKUP_LIFE_SPAN: f64 = 3.0;

// Difficulty curve: per-tick spawn chance grows with elapsed match time and
// dips during periodic breathers.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyTuning {
    pub base_spawn_chance: f64,
    pub spawn_chance_growth: f64,
    pub max_spawn_chance: f64,
    pub breather_interval: f64,
    pub breather_duration: f64,
    pub breather_factor: f64,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            base_spawn_chance: 0.02,
            spawn_chance_growth: 0.000_04,
            max_spawn_chance: 0.08,
            breather_interval: 45.0,
            breather_duration: 5.0,
            breather_factor: 0.3,
        }
    }
}

// Wind bonus: radial push applied to enemies near the closest player.
pub const WIND_PUSH_RADIUS: f64 = 200.0;
pub const WIND_PUSH_FORCE: f64 = 3.0;

// Earth bonus: leaving a hiding spot detonates it.
pub const EARTH_SHRAPNEL_RADIUS: f64 = 100.0;
pub const EARTH_SHRAPNEL_DAMAGE: f64 = 15.0;
pub const EARTH_RESPAWN_MIN_DIST: f64 = 400.0;

// Freeze bonus modifiers stamped onto enemies.
pub const FREEZE_SPEED_MULTIPLIER: f64 = 0.1;
pub const FREEZE_SOLID_CHANCE: f64 = 0.3;

// Fire bonus: passive damage-over-time plus bonfire hazards.
pub const FIRE_DOT_RATE: f64 = 1.5;
pub const BONFIRE_RADIUS: f64 = 80.0;
pub const BONFIRE_MAX_DOT: f64 = 10.0;
pub const BONFIRE_MIN_PLAYER_DIST: f64 = 150.0;

pub const OBSTACLE_COUNT: usize = 50;
pub const SCENERY_COUNT: usize = 25;
