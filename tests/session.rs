use glam::Vec2;

use spud_survivors::renderer::{Background, DrawCmd, RecordingSurface, draw_frame};
use spud_survivors::sim::{
    Bounds, Enemy, EntityId, Game, GameEvent, GamePhase, TickInput, tick,
};
use spud_survivors::{HighScore, Settings, Tuning};

const FRAME: f64 = 1000.0 / 60.0;

fn fresh(seed: u64) -> Game {
    let mut game = Game::new(Tuning::default(), Bounds::default(), seed, HighScore::default());
    game.start(0.0);
    game
}

/// Tick idle frames until simulation time passes `ms`, returns the wall time reached
fn run_until(game: &mut Game, mut wall: f64, ms: f64) -> f64 {
    while game.now <= ms {
        wall += FRAME;
        tick(game, &TickInput::default(), wall);
    }
    wall
}

#[test]
fn first_burst_arrives_after_one_second() {
    for seed in [1, 2, 3, 99] {
        let mut game = fresh(seed);
        let mut wall = 0.0;
        while wall + FRAME <= 1000.0 {
            wall += FRAME;
            tick(&mut game, &TickInput::default(), wall);
        }
        assert!(game.spawner.enemies.is_empty());

        run_until(&mut game, wall, 1000.0);
        assert_eq!(game.spawner.enemies.len(), 3, "seed {}", seed);
        assert_eq!(game.spawner.wave(), 1);
    }
}

#[test]
fn repeated_contact_inside_window_costs_one_life() {
    let mut game = fresh(5);
    let pos = game.player.pos;
    let mut sticky = Enemy::new(EntityId(9_000), pos, &game.tuning);
    sticky.health = 1_000;
    game.spawner.enemies.push(sticky.clone());

    tick(&mut game, &TickInput::default(), FRAME);
    assert_eq!(game.player.lives, 2);

    // Second contact 1 s later, still invulnerable
    sticky.id = EntityId(9_001);
    game.spawner.enemies.push(sticky.clone());
    tick(&mut game, &TickInput::default(), FRAME + 1000.0);
    assert_eq!(game.player.lives, 2);

    // Third contact after the window
    game.spawner.enemies.retain(|e| e.id.0 < 9_000);
    sticky.id = EntityId(9_002);
    sticky.pos = game.player.pos;
    game.spawner.enemies.push(sticky);
    tick(&mut game, &TickInput::default(), FRAME + 2100.0);
    assert_eq!(game.player.lives, 1);

    let hits = game
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::Hit { .. }))
        .count();
    assert_eq!(hits, 2);
}

#[test]
fn unarmed_player_is_overrun_and_sets_a_record() {
    let tuning = Tuning {
        shot_interval_ms: 1.0e9,
        ..Tuning::default()
    };
    let mut game = Game::new(tuning, Bounds::default(), 11, HighScore::new(1));
    game.start(0.0);

    let mut wall = 0.0;
    let mut events = Vec::new();
    while game.phase != GamePhase::GameOver && wall < 120_000.0 {
        wall += FRAME;
        tick(&mut game, &TickInput::default(), wall);
        events.extend(game.drain_events());
    }

    assert_eq!(game.phase, GamePhase::GameOver);
    let score = game.final_score.expect("score frozen at game over");
    assert!(score > 1);
    assert!(events.contains(&GameEvent::GameOver { score }));
    assert!(events.contains(&GameEvent::NewHighScore { score }));
    let hits = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Hit { .. }))
        .count();
    assert_eq!(hits, 3);
    assert_eq!(game.high_score.best, score);
    assert!(game.spawner.enemies.is_empty());

    // Survival time stays frozen
    tick(&mut game, &TickInput::default(), wall + 10_000.0);
    assert_eq!(game.survival_secs(), score);
}

#[test]
fn paused_session_draws_but_does_not_advance() {
    let mut game = fresh(3);
    let wall = run_until(&mut game, 0.0, 1500.0);
    let frozen_at = game.now;
    let positions: Vec<Vec2> = game.spawner.enemies.iter().map(|e| e.pos).collect();

    let pause = TickInput {
        pause: true,
        ..TickInput::default()
    };
    tick(&mut game, &pause, wall + FRAME);
    assert_eq!(game.phase, GamePhase::Paused);

    for i in 2..120 {
        tick(&mut game, &TickInput::default(), wall + i as f64 * FRAME);
    }
    assert_eq!(game.now, frozen_at);
    let still: Vec<Vec2> = game.spawner.enemies.iter().map(|e| e.pos).collect();
    assert_eq!(positions, still);

    let mut surface = RecordingSurface::with_sprites();
    assert!(draw_frame(
        Some(&mut surface),
        &game,
        &Settings::default(),
        &Background::new(3)
    ));
    let enemy_sprites = surface.count(|c| {
        matches!(
            c,
            DrawCmd::Sprite {
                sprite: spud_survivors::renderer::Sprite::Enemy,
                ..
            }
        )
    });
    assert_eq!(enemy_sprites, game.spawner.enemies.len());
    assert!(surface.balanced());
}

#[test]
fn snapshot_reflects_level_up_menu() {
    let mut game = fresh(8);
    game.upgrades.add_experience(100);
    let snap = game.snapshot();
    assert!(snap.upgrading);
    assert_eq!(snap.level, 2);
    assert_eq!(snap.upgrade_menu.len(), 4);
    assert_eq!(snap.upgrade_menu[0].title, "Forward Shot");

    let json = serde_json::to_value(&snap).expect("snapshot serializes");
    assert_eq!(json["lives"], 3);
    assert_eq!(json["phase"], "Playing");
}
