use serde::Serialize;

/// Complete per-tick world state broadcast to clients. Field names are
/// camelCase on the wire; every sub-record carries only what the renderer
/// needs to draw it.

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    pub players: Vec<PlayerView>,
    pub team_score: i64,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub enemy_projectiles: Vec<EnemyProjectileView>,
    pub bombs: Vec<BombView>,
    pub melees: Vec<MeleeView>,
    pub particles: Vec<ParticleView>,
    pub stars: Vec<StarView>,
    pub power_ups: Vec<PowerUpView>,
    pub bonfires: Vec<BonfireView>,
    pub obstacles: Vec<ObstacleView>,
    pub scenery: Vec<SceneryView>,
    pub messages: Vec<MessageView>,
    pub world_bonus: WorldBonusView,
    pub world_width: f64,
    pub world_height: f64,
    pub game_running: bool,
    pub game_paused: bool,
    pub game_over_data: Option<GameOverSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub size: f64,
    pub vx: f64,
    pub vy: f64,
    pub hp: f64,
    pub lives: u32,
    pub acorns: u32,
    pub bombs: u32,
    pub score: i64,
    pub combo_multiplier: u32,
    pub alive: bool,
    pub shield_timer: f64,
    pub rapid_fire_timer: f64,
    pub speed_boost_timer: f64,
    pub wind_bonus_active: bool,
    pub earth_bonus_active: bool,
    pub freeze_bonus_active: bool,
    pub fire_bonus_active: bool,
    pub fire_immune: bool,
    pub hiding_in_obstacle: bool,
    pub invulnerable: bool,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub melee_hit_streak: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyView {
    #[serde(rename = "type")]
    pub type_tag: &'static str,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub hp: f64,
    pub shape: &'static str,
    pub frozen: bool,
    pub fire_dot: f64,
    pub shield: f64,
    pub shield_max: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileView {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub angle: f64,
    pub owner_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyProjectileView {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BombView {
    pub x: f64,
    pub y: f64,
    pub current_radius: f64,
    pub opacity: f64,
    pub ring_radius: f64,
    pub ring_opacity: f64,
    pub owner_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeleeView {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub range: f64,
    pub progress: f64,
    pub is_critical: bool,
    pub owner_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleView {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: &'static str,
    pub life: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarView {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUpView {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    #[serde(rename = "type")]
    pub type_tag: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BonfireView {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub size: f64,
    pub time: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleView {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneryView {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    #[serde(rename = "type")]
    pub type_tag: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub life: f64,
    pub duration: f64,
}

/// Mirror of the roulette state machine's public fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldBonusView {
    pub phase: &'static str,
    pub countdown_timer: f64,
    pub active_bonus: Option<&'static str>,
    pub bonus_timer: f64,
    pub spin_elapsed: f64,
    pub spin_total_rotation: f64,
    pub spin_current_angle: f64,
    pub selected_index: Option<usize>,
    pub reveal_elapsed: f64,
}

/// One-shot end-of-match summary, recorded exactly once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverSummary {
    pub player_scores: Vec<PlayerScore>,
    pub team_score: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    pub id: u64,
    pub name: String,
    pub color: String,
    /// Final score including the accuracy bonus.
    pub score: i64,
    /// Hit percentage, floored to a whole number.
    pub accuracy: i64,
}
