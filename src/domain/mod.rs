// Domain layer: the authoritative arena simulation and its rules.

pub mod effects;
pub mod enemy;
pub mod player;
pub mod simulation;
pub mod snapshot;
pub mod tuning;
pub mod weapons;
pub mod world_bonus;

pub use player::{InputIntent, Player};
pub use simulation::GameSimulation;
pub use snapshot::{GameOverSummary, WorldSnapshot};

/// Wrap an angle into [-PI, PI].
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::normalize_angle;
    use std::f64::consts::PI;

    #[test]
    fn normalize_angle_wraps_into_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-3.0 * PI) + PI).abs() < 1e-12);
        assert_eq!(normalize_angle(0.5), 0.5);
    }
}
