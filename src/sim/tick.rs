//! Per-frame simulation tick
//!
//! One call per rendered frame. Fixed order: player, spawner, weapons, kill rewards,
//! player-enemy collisions, pickups, then the level-up check.

use glam::Vec2;
use rand::Rng;

use super::collision::circles_overlap;
use super::state::{Game, GameEvent, GamePhase};
use super::upgrade::UpgradeKind;
use super::weapon::Kill;

/// Normalized input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent, each axis in [-1, 1]
    pub movement: Vec2,
    /// Dash trigger
    pub dash: bool,
    /// Pause toggle
    pub pause: bool,
    /// Level-up menu choice
    pub upgrade: Option<UpgradeKind>,
}

impl TickInput {
    /// Build movement from four directional buttons
    pub fn from_buttons(up: bool, down: bool, left: bool, right: bool) -> Self {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Self {
            movement: Vec2::new(axis(left, right), axis(up, down)),
            ..Default::default()
        }
    }
}

/// Advance the session by one frame at wall-clock `wall` ms
pub fn tick(game: &mut Game, input: &TickInput, wall: f64) {
    if input.pause && !game.is_upgrading() {
        game.toggle_pause(wall);
    }

    if let Some(kind) = input.upgrade {
        select_upgrade(game, kind, wall);
    }

    // Nothing advances while paused, upgrading or outside a session
    if game.phase != GamePhase::Playing || game.is_upgrading() {
        return;
    }

    let now = game.clock.now(wall);
    game.now = now;

    game.player
        .update(input.movement, input.dash, now, &game.bounds);

    if let Some(wave) = game
        .spawner
        .update(now, &game.bounds, Some(game.player.pos), &mut game.rng)
    {
        game.events.push(GameEvent::WaveAdvanced { wave });
    }

    let kills = game.weapons.update(
        now,
        game.player.pos,
        &mut game.spawner.enemies,
        &game.bounds,
        &mut game.rng,
    );
    for kill in kills {
        reward_kill(game, kill);
    }

    resolve_player_collisions(game, now);
    if game.phase == GamePhase::GameOver {
        return;
    }

    let collected = game
        .health_items
        .collect(game.player.pos, game.player.radius());
    for _ in 0..collected {
        game.player.heal();
        game.events.push(GameEvent::Pickup);
    }
    game.health_items.update();

    if game.is_upgrading() {
        game.clock.pause(wall);
        log::info!("Level-up menu open, simulation held");
    }
}

/// Apply a menu choice; releases the clock once the menu closes
pub fn select_upgrade(game: &mut Game, kind: UpgradeKind, wall: f64) {
    if !matches!(game.phase, GamePhase::Playing | GamePhase::Paused) {
        log::debug!("Ignoring upgrade choice outside a running session");
        return;
    }
    if !game.is_upgrading() {
        log::debug!("Ignoring upgrade choice outside the level-up menu");
        return;
    }
    match game.upgrades.select(kind, &mut game.weapons) {
        Ok(()) => {
            if !game.is_upgrading() && game.phase == GamePhase::Playing {
                game.clock.resume(wall);
            }
        }
        Err(err) => log::warn!("Upgrade rejected: {}", err),
    }
}

fn reward_kill(game: &mut Game, kill: Kill) {
    let gained = game.upgrades.add_experience(kill.exp_value);
    if gained > 0 {
        game.events.push(GameEvent::LevelUp {
            level: game.upgrades.level(),
        });
    }

    if game.rng.random::<f32>() < game.health_items.drop_chance {
        game.health_items.spawn(kill.pos, &game.bounds);
    }
}

/// Player-enemy contact: one life per hit outside the invulnerability window
fn resolve_player_collisions(game: &mut Game, now: f64) {
    if game.player.is_invulnerable(now) {
        return;
    }

    let player_pos = game.player.pos;
    let player_radius = game.player.radius();
    let hit = game.spawner.enemies.iter().find(|enemy| {
        enemy.is_alive() && circles_overlap(player_pos, player_radius, enemy.pos, enemy.radius())
    });
    let Some(enemy_id) = hit.map(|enemy| enemy.id) else {
        return;
    };

    if game.player.take_damage(now) {
        game.spawner.remove(enemy_id);
        log::info!("Player hit, {} lives left", game.player.lives);
        game.events.push(GameEvent::Hit {
            lives_left: game.player.lives,
        });
        if game.player.is_dead() {
            game_over(game);
        }
    }
}

/// Freeze the score, record a high score and tear down the session's transient state
fn game_over(game: &mut Game) {
    let score = (game.elapsed_ms() / 1000.0).floor() as u64;
    game.final_score = Some(score);
    game.phase = GamePhase::GameOver;
    log::info!("Game over after {} s", score);

    game.events.push(GameEvent::GameOver { score });
    if game.high_score.record(score) {
        log::info!("New high score: {}", score);
        game.events.push(GameEvent::NewHighScore { score });
    }

    game.upgrades.close_menu();
    game.spawner.enemies.clear();
    game.weapons.projectiles.clear();
    game.weapons.explosions.clear();
    game.health_items.items.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::HighScore;
    use crate::sim::enemy::Enemy;
    use crate::sim::state::{Bounds, EntityId};
    use crate::tuning::Tuning;

    fn game() -> Game {
        let mut game = Game::new(Tuning::default(), Bounds::default(), 1234, HighScore::default());
        game.start(0.0);
        game
    }

    fn enemy_on_player(game: &mut Game, id: u32) {
        let mut enemy = Enemy::new(EntityId(id), game.player.pos, &game.tuning);
        // Survives stray shots from the auto-fire
        enemy.health = 100;
        game.spawner.enemies.push(enemy);
    }

    #[test]
    fn buttons_map_to_axes() {
        let input = TickInput::from_buttons(true, false, false, true);
        assert_eq!(input.movement, Vec2::new(1.0, -1.0));
        let input = TickInput::from_buttons(true, true, true, true);
        assert_eq!(input.movement, Vec2::ZERO);
    }

    #[test]
    fn start_screen_does_nothing() {
        let mut game = Game::new(Tuning::default(), Bounds::default(), 1, HighScore::default());
        tick(&mut game, &TickInput::default(), 5_000.0);
        assert_eq!(game.now, 0.0);
        assert!(game.spawner.enemies.is_empty());
    }

    #[test]
    fn pause_input_toggles() {
        let mut game = game();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut game, &pause, 100.0);
        assert_eq!(game.phase, GamePhase::Paused);
        tick(&mut game, &TickInput::default(), 900.0);
        assert_eq!(game.now, 0.0);
        tick(&mut game, &pause, 10_100.0);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.now, 100.0);
    }

    #[test]
    fn collision_costs_life_and_removes_enemy() {
        let mut game = game();
        enemy_on_player(&mut game, 500);
        tick(&mut game, &TickInput::default(), 16.0);
        assert_eq!(game.player.lives, 2);
        assert!(game.spawner.enemies.iter().all(|e| e.id != EntityId(500)));
        assert!(game.drain_events().contains(&GameEvent::Hit { lives_left: 2 }));
    }

    #[test]
    fn invulnerability_window_spares_second_hit() {
        let mut game = game();
        enemy_on_player(&mut game, 500);
        tick(&mut game, &TickInput::default(), 16.0);

        enemy_on_player(&mut game, 501);
        tick(&mut game, &TickInput::default(), 1_000.0);
        assert_eq!(game.player.lives, 2);
        // Untouched during the window
        assert!(game.spawner.enemies.iter().any(|e| e.id == EntityId(501)));

        game.spawner.enemies.clear();
        enemy_on_player(&mut game, 502);
        tick(&mut game, &TickInput::default(), 2_100.0);
        assert_eq!(game.player.lives, 1);
    }

    #[test]
    fn last_life_ends_session() {
        let mut game = game();
        game.player.lives = 1;
        game.high_score.best = 3;
        enemy_on_player(&mut game, 900);
        tick(&mut game, &TickInput::default(), 4_200.0);

        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(game.final_score, Some(4));
        assert_eq!(game.high_score.best, 4);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::GameOver { score: 4 }));
        assert!(events.contains(&GameEvent::NewHighScore { score: 4 }));
        assert!(game.spawner.enemies.is_empty());

        // Frozen
        tick(&mut game, &TickInput::default(), 60_000.0);
        assert_eq!(game.survival_secs(), 4);
    }

    #[test]
    fn level_up_holds_the_clock_until_choice() {
        let mut game = game();
        game.upgrades.add_experience(90);
        game.spawner
            .enemies
            .push(Enemy::new(EntityId(77), Vec2::new(200.0, 300.0), &game.tuning));
        // A projectile parked on the enemy
        game.weapons.projectiles.push(crate::sim::Projectile::new(
            EntityId(1),
            Vec2::new(195.0, 300.0),
            0.0,
            1.0,
            8.0,
        ));

        tick(&mut game, &TickInput::default(), 100.0);
        assert!(game.is_upgrading());
        assert!(game.clock.is_paused());
        assert!(game.drain_events().contains(&GameEvent::LevelUp { level: 2 }));

        // Frozen while the menu is open, pause input ignored
        tick(&mut game, &TickInput { pause: true, ..Default::default() }, 5_000.0);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.now, 100.0);

        let choose = TickInput {
            upgrade: Some(UpgradeKind::FrontShot),
            ..Default::default()
        };
        tick(&mut game, &choose, 9_100.0);
        assert!(!game.is_upgrading());
        assert_eq!(game.weapons.front_projectiles, 2);
        assert_eq!(game.now, 100.0);

        tick(&mut game, &TickInput::default(), 9_116.0);
        assert_eq!(game.now, 116.0);
    }

    #[test]
    fn level_up_on_the_fatal_tick_leaves_no_menu() {
        let mut game = game();
        game.upgrades.add_experience(90);
        game.player.lives = 1;
        game.spawner
            .enemies
            .push(Enemy::new(EntityId(77), Vec2::new(200.0, 300.0), &game.tuning));
        game.weapons.projectiles.push(crate::sim::Projectile::new(
            EntityId(1),
            Vec2::new(195.0, 300.0),
            0.0,
            1.0,
            8.0,
        ));
        enemy_on_player(&mut game, 900);

        tick(&mut game, &TickInput::default(), 100.0);
        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(game.upgrades.level(), 2);
        assert!(!game.is_upgrading());
        let snap = game.snapshot();
        assert!(!snap.upgrading);
        assert!(snap.upgrade_menu.is_empty());

        // Choices after the session ended change nothing
        let choose = TickInput {
            upgrade: Some(UpgradeKind::FrontShot),
            ..Default::default()
        };
        tick(&mut game, &choose, 200.0);
        assert_eq!(game.weapons.front_projectiles, 1);
        assert_eq!(game.upgrades.level_of(UpgradeKind::FrontShot), 0);
    }

    #[test]
    fn pickup_restores_life() {
        let mut game = game();
        game.player.lives = 2;
        let pos = game.player.pos;
        game.health_items.spawn(pos, &game.bounds);
        tick(&mut game, &TickInput::default(), 16.0);
        assert_eq!(game.player.lives, 3);
        assert!(game.health_items.items.is_empty());
        assert!(game.drain_events().contains(&GameEvent::Pickup));
    }
}
