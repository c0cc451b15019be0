use rand::Rng;

/// Roulette state machine for the recurring world bonus event.
///
/// Phases: `countdown` (90 s) -> `spinning` (3.5 s, wheel eases out toward a
/// pre-committed wedge) -> `reveal` (3 s, frozen final angle) -> `active`.
/// The result is fixed the moment the spin starts; the animation and reveal
/// always agree with it. Boss is the odd wedge out: it has no timed effect
/// and drops straight back into countdown after triggering its spawn.

pub const COUNTDOWN_DURATION: f64 = 90.0;
pub const BONUS_DURATION: f64 = 15.0;
pub const SPIN_DURATION: f64 = 3.5;
pub const REVEAL_DURATION: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bonus {
    Wind,
    Earth,
    Freeze,
    Fire,
    Boss,
}

/// Wheel order; the pre-selected index points into this.
pub const WEDGES: [Bonus; 5] = [Bonus::Wind, Bonus::Earth, Bonus::Freeze, Bonus::Fire, Bonus::Boss];

const WEDGE_ANGLE: f64 = std::f64::consts::TAU / WEDGES.len() as f64;

impl Bonus {
    pub fn id(self) -> &'static str {
        match self {
            Bonus::Wind => "wind",
            Bonus::Earth => "earth",
            Bonus::Freeze => "freeze",
            Bonus::Fire => "fire",
            Bonus::Boss => "boss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusPhase {
    Countdown,
    Spinning,
    Reveal,
    Active,
}

impl BonusPhase {
    pub fn id(self) -> &'static str {
        match self {
            BonusPhase::Countdown => "countdown",
            BonusPhase::Spinning => "spinning",
            BonusPhase::Reveal => "reveal",
            BonusPhase::Active => "active",
        }
    }
}

/// What changed during this update, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusEvent {
    SpinStart,
    Activated(Bonus),
    Ended(Bonus),
}

#[derive(Debug, Clone)]
pub struct WorldBonus {
    pub phase: BonusPhase,
    pub countdown_timer: f64,
    pub active_bonus: Option<Bonus>,
    pub bonus_timer: f64,

    // Spin animation state, mirrored into the snapshot for the client wheel.
    pub spin_elapsed: f64,
    pub spin_total_rotation: f64,
    pub spin_current_angle: f64,
    pub selected_index: Option<usize>,
    pub reveal_elapsed: f64,
}

impl Default for WorldBonus {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldBonus {
    pub fn new() -> Self {
        Self {
            phase: BonusPhase::Countdown,
            countdown_timer: COUNTDOWN_DURATION,
            active_bonus: None,
            bonus_timer: 0.0,
            spin_elapsed: 0.0,
            spin_total_rotation: 0.0,
            spin_current_angle: 0.0,
            selected_index: None,
            reveal_elapsed: 0.0,
        }
    }

    /// Whether the normal simulation pipeline should be skipped this tick.
    pub fn is_pausing(&self) -> bool {
        matches!(self.phase, BonusPhase::Spinning | BonusPhase::Reveal)
    }

    /// Whether a non-boss bonus is currently live.
    pub fn is_bonus_active(&self) -> bool {
        self.phase == BonusPhase::Active && self.active_bonus != Some(Bonus::Boss)
    }

    /// Back to a fresh countdown (new game / game over).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn update(&mut self, dt: f64, rng: &mut impl Rng) -> Option<BonusEvent> {
        match self.phase {
            BonusPhase::Countdown => {
                self.countdown_timer -= dt;
                if self.countdown_timer <= 0.0 {
                    self.countdown_timer = 0.0;
                    self.start_spin(rng);
                    return Some(BonusEvent::SpinStart);
                }
            }
            BonusPhase::Spinning => {
                self.spin_elapsed += dt;
                if self.spin_elapsed >= SPIN_DURATION {
                    self.spin_elapsed = SPIN_DURATION;
                    self.phase = BonusPhase::Reveal;
                    self.reveal_elapsed = 0.0;
                }
                self.spin_current_angle = self.ease_out_angle();
            }
            BonusPhase::Reveal => {
                self.reveal_elapsed += dt;
                if self.reveal_elapsed >= REVEAL_DURATION {
                    let bonus = self.activate_selected();
                    return Some(BonusEvent::Activated(bonus));
                }
            }
            BonusPhase::Active => {
                if self.active_bonus == Some(Bonus::Boss) {
                    // Boss has no timed effect; resume the countdown at once.
                    self.phase = BonusPhase::Countdown;
                    self.countdown_timer = COUNTDOWN_DURATION;
                    self.active_bonus = None;
                } else {
                    self.bonus_timer -= dt;
                    if self.bonus_timer <= 0.0 {
                        let ended = self.active_bonus.take();
                        self.phase = BonusPhase::Countdown;
                        self.countdown_timer = COUNTDOWN_DURATION;
                        if let Some(bonus) = ended {
                            return Some(BonusEvent::Ended(bonus));
                        }
                    }
                }
            }
        }
        None
    }

    fn start_spin(&mut self, rng: &mut impl Rng) {
        self.phase = BonusPhase::Spinning;
        self.spin_elapsed = 0.0;

        // The result is decided here, before any animation runs.
        let selected = rng.random_range(0..WEDGES.len());
        self.selected_index = Some(selected);

        // The pointer sits at the top of the wheel (-PI/2). The wheel must
        // finish rotated so the selected wedge centre lands under it, after
        // 5-7 extra full rotations for drama.
        let wedge_center = selected as f64 * WEDGE_ANGLE + WEDGE_ANGLE / 2.0;
        let extra_rotations = rng.random_range(5..8) as f64;
        self.spin_total_rotation =
            -(std::f64::consts::FRAC_PI_2 + wedge_center) + extra_rotations * std::f64::consts::TAU;
    }

    fn ease_out_angle(&self) -> f64 {
        let t = (self.spin_elapsed / SPIN_DURATION).min(1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        self.spin_total_rotation * eased
    }

    fn activate_selected(&mut self) -> Bonus {
        // selected_index is always set by start_spin before we can get here;
        // fall back to the first wedge rather than panicking.
        let bonus = self
            .selected_index
            .map(|i| WEDGES[i])
            .unwrap_or(WEDGES[0]);
        self.active_bonus = Some(bonus);
        self.phase = BonusPhase::Active;
        self.bonus_timer = if bonus == Bonus::Boss { 0.0 } else { BONUS_DURATION };
        bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn countdown_holds_until_expiry_then_spins() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut wb = WorldBonus::new();
        assert_eq!(wb.update(89.9, &mut rng), None);
        assert_eq!(wb.phase, BonusPhase::Countdown);
        assert_eq!(wb.update(0.2, &mut rng), Some(BonusEvent::SpinStart));
        assert_eq!(wb.phase, BonusPhase::Spinning);
        assert!(wb.is_pausing());
        assert!(wb.selected_index.is_some());
    }

    #[test]
    fn full_cycle_reaches_active_with_committed_result() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut wb = WorldBonus::new();
        wb.update(90.0, &mut rng);
        let committed = wb.selected_index.expect("result chosen at spin start");

        // 3.5 s of spinning in exact binary steps.
        for _ in 0..7 {
            assert_eq!(wb.update(0.5, &mut rng), None);
        }
        assert_eq!(wb.phase, BonusPhase::Reveal);
        assert!(wb.is_pausing());
        // The wheel is frozen at its final angle during reveal.
        assert_eq!(wb.spin_current_angle, wb.spin_total_rotation);

        // 3 s of reveal; the last step fires the activation event.
        let mut event = None;
        for _ in 0..6 {
            event = wb.update(0.5, &mut rng);
        }
        let Some(BonusEvent::Activated(bonus)) = event else {
            panic!("expected activation, got {event:?}");
        };
        assert_eq!(bonus, WEDGES[committed]);
        assert_eq!(wb.phase, BonusPhase::Active);
        assert!(!wb.is_pausing());
    }

    #[test]
    fn boss_reverts_to_countdown_without_effect() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut wb = WorldBonus::new();
        wb.phase = BonusPhase::Active;
        wb.active_bonus = Some(Bonus::Boss);
        assert_eq!(wb.update(1.0 / 30.0, &mut rng), None);
        assert_eq!(wb.phase, BonusPhase::Countdown);
        assert_eq!(wb.countdown_timer, COUNTDOWN_DURATION);
        assert_eq!(wb.active_bonus, None);
    }

    #[test]
    fn timed_bonus_ends_after_duration() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut wb = WorldBonus::new();
        wb.phase = BonusPhase::Active;
        wb.active_bonus = Some(Bonus::Freeze);
        wb.bonus_timer = BONUS_DURATION;
        let mut event = None;
        let mut elapsed = 0.0;
        while event.is_none() && elapsed < 20.0 {
            event = wb.update(0.5, &mut rng);
            elapsed += 0.5;
        }
        assert_eq!(event, Some(BonusEvent::Ended(Bonus::Freeze)));
        assert_eq!(wb.phase, BonusPhase::Countdown);
        assert!(!wb.is_bonus_active());
    }
}
