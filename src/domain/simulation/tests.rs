use super::GameSimulation;
use crate::domain::enemy::{Enemy, EnemyKind, SquareStage, Tier};
use crate::domain::player::InputIntent;
use crate::domain::tuning;
use crate::domain::weapons::{Bomb, EnemyProjectile, Melee, Projectile};
use crate::domain::world_bonus::{Bonus, BonusPhase};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DT: f64 = 1.0 / 30.0;

fn test_sim(seed: u64) -> GameSimulation {
    let mut sim = GameSimulation::with_seed(800.0, 600.0, seed);
    // Keep the arena sterile so assertions see only what each test stages.
    sim.obstacles.clear();
    sim.scenery.clear();
    sim
}

fn shoot_input() -> InputIntent {
    InputIntent {
        shoot: true,
        ..InputIntent::default()
    }
}

#[test]
fn players_join_with_round_robin_colors() {
    let mut sim = test_sim(1);
    let (i0, c0) = sim.add_player(10, "ada");
    let (i1, c1) = sim.add_player(11, "grace");
    assert_eq!((i0, i1), (0, 1));
    assert_eq!(c0, tuning::PLAYER_COLORS[0]);
    assert_eq!(c1, tuning::PLAYER_COLORS[1]);
    assert_eq!(sim.player_count(), 2);

    sim.remove_player(10);
    assert_eq!(sim.player_count(), 1);
    // Colors keep advancing; they are not recycled on leave.
    let (i2, _) = sim.add_player(12, "alan");
    assert_eq!(i2, 2);
}

#[test]
fn shooting_spends_ammo_and_tracks_shots() {
    let mut sim = test_sim(2);
    sim.add_player(1, "p");
    sim.set_player_input(1, shoot_input());
    sim.tick(DT);

    let p = &sim.players[0].player;
    assert_eq!(sim.projectiles.len(), 1);
    assert_eq!(p.acorns, 199);
    assert_eq!(p.shots_fired, 1);
    assert!(p.shoot_cooldown > 0.0);
}

#[test]
fn shooting_with_empty_ammo_is_a_no_op() {
    let mut sim = test_sim(3);
    sim.add_player(1, "p");
    sim.players[0].player.acorns = 0;
    sim.set_player_input(1, shoot_input());
    sim.tick(DT);
    assert!(sim.projectiles.is_empty());
    assert_eq!(sim.players[0].player.shots_fired, 0);

    sim.players[0].player.bombs = 0;
    sim.set_player_input(
        1,
        InputIntent {
            bomb: true,
            ..InputIntent::default()
        },
    );
    sim.tick(DT);
    assert!(sim.bombs.is_empty());
}

#[test]
fn projectile_kill_credits_owner_and_splits_square() {
    let mut sim = test_sim(4);
    sim.add_player(1, "p");
    let mut square = Enemy::square(sim.alloc_enemy_id(), SquareStage::Large, 400.0, 300.0, 0.0, 0.0);
    square.hp = 1.0;
    sim.enemies.push(square);

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let proj = Projectile::new(400.0, 300.0, 0.0, false, 1, &mut rng);
    sim.projectiles.push(proj);

    sim.update_projectiles(DT);

    assert_eq!(sim.players[0].player.shots_hit, 1);
    assert_eq!(sim.players[0].player.score, 50.0);
    // The large square is gone and two mediums took its place.
    assert_eq!(sim.enemies.len(), 2);
    assert!(
        sim.enemies
            .iter()
            .all(|e| matches!(e.kind, EnemyKind::Square(SquareStage::Medium)))
    );
}

#[test]
fn melee_cleaves_whole_without_split() {
    let mut sim = test_sim(5);
    sim.add_player(1, "p");
    let square = Enemy::square(sim.alloc_enemy_id(), SquareStage::Large, 420.0, 300.0, 0.0, 0.0);
    sim.enemies.push(square);
    sim.melees.push(Melee::new(400.0, 300.0, 0.0, false, 1));

    sim.update_melees(DT);

    // Removed outright at full hp, no children.
    assert!(sim.enemies.is_empty());
    assert_eq!(sim.players[0].player.score, 50.0);
    assert_eq!(sim.players[0].player.melee_hit_streak, 1);
}

#[test]
fn melee_chips_elite_shield_instead_of_killing() {
    let mut sim = test_sim(6);
    sim.add_player(1, "p");
    let elite = Enemy::elite(sim.alloc_enemy_id(), 430.0, 300.0, 0.0, 0.0, 1.0);
    sim.enemies.push(elite);
    sim.melees.push(Melee::new(400.0, 300.0, 0.0, false, 1));

    sim.update_melees(DT);

    assert_eq!(sim.enemies.len(), 1);
    assert_eq!(sim.enemies[0].shield(), 30.0);
    assert_eq!(sim.players[0].player.score, 0.0);
}

#[test]
fn bomb_blast_bypasses_elite_shield() {
    let mut sim = test_sim(7);
    sim.add_player(1, "p");
    let mut elite = Enemy::elite(sim.alloc_enemy_id(), 400.0, 300.0, 0.0, 0.0, 1.0);
    elite.hp = 15.0;
    sim.enemies.push(elite);
    sim.bombs.push(Bomb::new(400.0, 300.0, false, 1));

    // First advance expands the blast over the target.
    sim.update_bombs(DT);

    assert!(sim.enemies.is_empty());
    assert_eq!(sim.players[0].player.score, 100.0);
}

#[test]
fn indirect_kill_pays_every_standing_player() {
    let mut sim = test_sim(8);
    sim.add_player(1, "a");
    sim.add_player(2, "b");
    let mut enemy = Enemy::basic(sim.alloc_enemy_id(), Tier::Medium, 100.0, 100.0, 0.0, 1.0, 1.0);
    enemy.hp = -0.5;
    sim.enemies.push(enemy);

    sim.cull_dead_enemies();

    assert!(sim.enemies.is_empty());
    assert_eq!(sim.players[0].player.score, 30.0);
    assert_eq!(sim.players[1].player.score, 30.0);
}

#[test]
fn orphaned_orbital_despawns_without_score() {
    let mut sim = test_sim(9);
    sim.add_player(1, "p");
    let elite = Enemy::elite(sim.alloc_enemy_id(), 200.0, 200.0, 0.0, 0.0, 1.0);
    let orbital = Enemy::orbital(sim.alloc_enemy_id(), &elite, 0.0, 0.0);
    // The parent is never inserted, so the orbital is orphaned.
    sim.enemies.push(orbital);

    sim.update_enemies(DT);

    assert!(sim.enemies.is_empty());
    assert_eq!(sim.players[0].player.score, 0.0);
}

#[test]
fn orbital_volley_fires_eight_radial_shots() {
    let mut sim = test_sim(10);
    let elite = Enemy::elite(sim.alloc_enemy_id(), 300.0, 300.0, 0.0, 0.0, 1.0);
    let mut orbital = Enemy::orbital(sim.alloc_enemy_id(), &elite, 0.0, 0.0);
    if let EnemyKind::Orbital { last_shot, .. } = &mut orbital.kind {
        *last_shot = -10.0;
    }
    sim.enemies.push(elite);
    sim.enemies.push(orbital);
    sim.now = 1.0;

    sim.update_enemies(DT);

    assert_eq!(sim.enemy_projectiles.len(), 8);
}

#[test]
fn enemy_projectile_respects_shield_and_iframes() {
    let mut sim = test_sim(11);
    sim.add_player(1, "p");
    let (px, py) = {
        let p = &mut sim.players[0].player;
        p.shield_timer = 1.0;
        (p.x, p.y)
    };
    sim.enemy_projectiles.push(EnemyProjectile::new(px, py, 0.0));

    sim.update_enemy_projectiles();

    let p = &sim.players[0].player;
    // Absorbed by the shield but still consumed.
    assert_eq!(p.hp, 100.0);
    assert!(sim.enemy_projectiles.is_empty());
}

#[test]
fn contact_kill_awards_no_score_and_respawns_player() {
    let mut sim = test_sim(12);
    sim.add_player(1, "p");
    {
        let p = &mut sim.players[0].player;
        p.hp = 1.0;
        p.x = 100.0;
        p.y = 100.0;
        p.vx = 1.0;
    }
    let enemy = Enemy::basic(sim.alloc_enemy_id(), Tier::Large, 110.0, 100.0, 0.0, 0.0, 1.0);
    sim.enemies.push(enemy);
    sim.now = 10.0;

    sim.check_collisions();

    let p = &sim.players[0].player;
    assert_eq!(p.lives, 2);
    assert_eq!(p.hp, 100.0);
    assert!(p.is_invulnerable(10.0 + 1.0));
    assert_eq!(p.score, 0.0);
}

#[test]
fn world_edges_wrap_players() {
    let mut sim = test_sim(13);
    sim.add_player(1, "p");
    {
        let p = &mut sim.players[0].player;
        p.x = 799.9;
        p.vx = 4.0;
    }
    sim.set_player_input(
        1,
        InputIntent {
            right: true,
            ..InputIntent::default()
        },
    );
    sim.tick(DT);
    assert_eq!(sim.players[0].player.x, 0.0);
}

#[test]
fn roulette_pause_freezes_the_scene() {
    let mut sim = test_sim(14);
    sim.add_player(1, "p");
    let enemy = Enemy::basic(sim.alloc_enemy_id(), Tier::Small, 100.0, 100.0, 0.0, 2.0, 1.0);
    sim.enemies.push(enemy);
    sim.world_bonus.countdown_timer = 0.01;

    sim.tick(DT);
    assert_eq!(sim.world_bonus.phase, BonusPhase::Spinning);
    let frozen_x = sim.enemies[0].x;

    sim.tick(DT);
    assert_eq!(sim.enemies[0].x, frozen_x);
    // The wheel itself still animates.
    assert!(sim.world_bonus.spin_elapsed > 0.0);
}

#[test]
fn fire_bonus_stamps_spawned_enemies_and_burns_them() {
    let mut sim = test_sim(15);
    sim.add_player(1, "p");
    sim.world_bonus.phase = BonusPhase::Active;
    sim.world_bonus.active_bonus = Some(Bonus::Fire);
    sim.world_bonus.bonus_timer = 10.0;
    let enemy = Enemy::basic(sim.alloc_enemy_id(), Tier::Small, 700.0, 500.0, 0.0, 0.0, 1.0);
    sim.enemies.push(enemy);

    sim.tick(DT);

    assert_eq!(sim.enemies[0].fire_dot, tuning::FIRE_DOT_RATE);
    let hp_before = sim.enemies[0].hp;
    sim.tick(DT);
    assert!(sim.enemies[0].hp < hp_before);
}

#[test]
fn freeze_bonus_stamps_and_unstamps_enemies() {
    let mut sim = test_sim(17);
    sim.add_player(1, "p");
    sim.world_bonus.phase = BonusPhase::Active;
    sim.world_bonus.active_bonus = Some(Bonus::Freeze);
    sim.world_bonus.bonus_timer = 10.0;
    let enemy = Enemy::basic(sim.alloc_enemy_id(), Tier::Small, 700.0, 500.0, 0.0, 2.0, 1.0);
    sim.enemies.push(enemy);

    sim.tick(DT);
    assert_eq!(
        sim.enemies[0].speed_multiplier,
        tuning::FREEZE_SPEED_MULTIPLIER
    );

    // An enemy arriving mid-bonus picks up the same stamp on its first tick.
    let late = Enemy::basic(sim.alloc_enemy_id(), Tier::Small, 100.0, 100.0, 0.0, 2.0, 1.0);
    sim.enemies.push(late);
    sim.tick(DT);
    assert_eq!(
        sim.enemies[1].speed_multiplier,
        tuning::FREEZE_SPEED_MULTIPLIER
    );

    // Expiry restores normal movement for everyone at once.
    sim.world_bonus.bonus_timer = 0.01;
    sim.tick(DT);
    assert!(
        sim.enemies
            .iter()
            .all(|e| e.speed_multiplier == 1.0 && !e.frozen)
    );
}

#[test]
fn game_over_emits_single_summary_with_team_total() {
    let mut sim = test_sim(16);
    sim.add_player(1, "a");
    sim.add_player(2, "b");
    for entry in &mut sim.players {
        entry.player.score = 100.4;
        entry.player.shots_fired = 10;
        entry.player.shots_hit = 5;
        entry.player.lives = 0;
        entry.player.alive = false;
    }

    sim.tick(DT);

    assert!(!sim.is_running());
    let summary = sim.game_over().expect("summary recorded");
    assert_eq!(summary.player_scores.len(), 2);
    // 100.4 plus the 50% accuracy bonus, floored.
    assert_eq!(summary.player_scores[0].score, 150);
    assert_eq!(summary.player_scores[0].accuracy, 50);
    assert_eq!(summary.team_score, 300);

    // Further ticks neither re-run the match nor rewrite the summary.
    sim.tick(DT);
    assert_eq!(sim.game_over().unwrap().team_score, 300);
}

#[test]
fn identical_seeds_and_inputs_replay_identically() {
    let run = |seed: u64| {
        let mut sim = GameSimulation::with_seed(800.0, 600.0, seed);
        sim.add_player(1, "p");
        sim.set_player_input(
            1,
            InputIntent {
                right: true,
                shoot: true,
                ..InputIntent::default()
            },
        );
        for _ in 0..300 {
            sim.tick(DT);
        }
        serde_json::to_value(sim.serialize()).expect("snapshot serializes")
    };
    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}

#[test]
fn serialize_does_not_mutate_state() {
    let mut sim = GameSimulation::with_seed(800.0, 600.0, 21);
    sim.add_player(1, "p");
    for _ in 0..50 {
        sim.tick(DT);
    }
    let a = serde_json::to_value(sim.serialize()).expect("snapshot serializes");
    let b = serde_json::to_value(sim.serialize()).expect("snapshot serializes");
    assert_eq!(a, b);
}
