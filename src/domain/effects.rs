/// Ambient entities: particles, floating combat text, pickups, hazards and
/// the static-ish world dressing (obstacles, scenery).

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub life: f64,
    pub color: &'static str,
}

impl Particle {
    pub fn new(x: f64, y: f64, vx: f64, vy: f64, size: f64, life: f64, color: &'static str) -> Self {
        Self { x, y, vx, vy, size, life, color }
    }

    /// Returns false once the particle has burned out.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.life -= dt;
        self.life > 0.0
    }
}

/// Combo callouts and similar one-line messages drifting upward.
#[derive(Debug, Clone)]
pub struct FloatingText {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub duration: f64,
    pub life: f64,
}

impl FloatingText {
    pub fn new(x: f64, y: f64, text: String, duration: f64) -> Self {
        Self { x, y, text, duration, life: duration }
    }

    pub fn advance(&mut self, dt: f64) -> bool {
        self.y -= 20.0 * dt;
        self.life -= dt;
        self.life > 0.0
    }
}

/// Ammo pickup.
#[derive(Debug, Clone)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub life: f64,
}

impl Star {
    pub fn new(x: f64, y: f64, life: f64) -> Self {
        Self { x, y, size: 8.0, life }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Shield,
    RapidFire,
    SpeedBoost,
}

impl PowerUpKind {
    pub fn type_tag(self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::RapidFire => "rapidFire",
            PowerUpKind::SpeedBoost => "speedBoost",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub life: f64,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, x: f64, y: f64, life: f64) -> Self {
        Self { kind, x, y, size: 8.0, life }
    }
}

/// Fire-bonus hazard: stationary damage-over-time zone with linear falloff
/// from the centre. Players are immune; only enemies burn.
#[derive(Debug, Clone)]
pub struct Bonfire {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub max_dot: f64,
    /// Visual core size.
    pub size: f64,
    /// Running clock for client-side flame animation.
    pub time: f64,
}

impl Bonfire {
    pub fn new(x: f64, y: f64, radius: f64, max_dot: f64) -> Self {
        Self { x, y, radius, max_dot, size: 14.0, time: 0.0 }
    }

    /// Damage per second applied to an enemy at `dist` from the centre.
    pub fn dot_at(&self, dist: f64) -> f64 {
        let proximity = (1.0 - dist / self.radius).max(0.0);
        self.max_dot * proximity
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    /// Stable handle; players hiding inside a bush reference it by id.
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// Returns true when (x, y) keeps `radius + buffer` clearance from every
/// obstacle; used to rejection-sample pickup spawn points.
pub fn is_clear_of_obstacles(x: f64, y: f64, radius: f64, buffer: f64, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .all(|o| (x - o.x).hypot(y - o.y) >= o.size + radius + buffer)
}

#[derive(Debug, Clone)]
pub struct Scenery {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub base_size: f64,
    pub size: f64,
    pub scale_range: f64,
    pub scale_speed: f64,
    pub scale_phase: f64,
    pub kind: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_expires_after_lifetime() {
        let mut p = Particle::new(0.0, 0.0, 1.0, 0.0, 2.0, 0.1, "orange");
        assert!(p.advance(0.05));
        assert!(!p.advance(0.06));
        assert_eq!(p.x, 2.0);
    }

    #[test]
    fn bonfire_falloff_is_linear() {
        let b = Bonfire::new(0.0, 0.0, 80.0, 10.0);
        assert_eq!(b.dot_at(0.0), 10.0);
        assert_eq!(b.dot_at(40.0), 5.0);
        assert_eq!(b.dot_at(120.0), 0.0);
    }

    #[test]
    fn obstacle_clearance_check() {
        let obstacles = [Obstacle { id: 1, x: 100.0, y: 100.0, size: 20.0 }];
        assert!(!is_clear_of_obstacles(110.0, 100.0, 8.0, 3.0, &obstacles));
        assert!(is_clear_of_obstacles(200.0, 200.0, 8.0, 3.0, &obstacles));
    }
}
