//! Per-frame draw pass
//!
//! Back to front: background, health items, enemies, player, projectiles, explosions.
//! Reads the game state only; never mutates it.

use glam::Vec2;

use super::{Background, PathSeg, Rgba, Sprite, Surface, rgb};
use crate::is_finite_pos;
use crate::settings::Settings;
use crate::sim::{Enemy, Explosion, FIRE_COLORS, Game, GamePhase, HealthItem, Player, Projectile};

const PLAYER_FALLBACK: Rgba = rgb(0x00, 0xff, 0x00);
const ENEMY_FALLBACK: Rgba = rgb(0xff, 0x00, 0x00);
const ENEMY_OUTLINE: Rgba = rgb(0xff, 0xff, 0xff);
const SHOT: Rgba = rgb(0x00, 0xff, 0xff);
const PIERCING_SHOT: Rgba = rgb(0xff, 0xff, 0x00);
const EXPLOSIVE_TAIL: Rgba = rgb(0xff, 0x44, 0x00);
const GLOW_INNER: Rgba = [1.0, 200.0 / 255.0, 0.0, 0.2];
const GLOW_OUTER: Rgba = [1.0, 100.0 / 255.0, 0.0, 0.0];
const HEART: Rgba = rgb(0xff, 0x33, 0x66);

/// Blink period while invulnerable, ms
const BLINK_MS: f64 = 100.0;
const TAIL_LENGTH: f32 = 10.0;

/// Heart outline, 20 wide, resting on the origin
const HEART_PATH: [PathSeg; 3] = [
    PathSeg::MoveTo(Vec2::ZERO),
    PathSeg::CubicTo(
        Vec2::new(-10.0, -8.0),
        Vec2::new(-10.0, -16.0),
        Vec2::new(0.0, -16.0),
    ),
    PathSeg::CubicTo(
        Vec2::new(10.0, -16.0),
        Vec2::new(10.0, -8.0),
        Vec2::ZERO,
    ),
];

/// Draw one frame. Returns false (and draws nothing) without a surface.
pub fn draw_frame<S: Surface>(
    surface: Option<&mut S>,
    game: &Game,
    settings: &Settings,
    background: &Background,
) -> bool {
    let Some(surface) = surface else {
        log::warn!("No drawing surface, skipping frame");
        return false;
    };

    let (width, height) = (game.bounds.width, game.bounds.height);
    surface.clear(width, height);
    if settings.quality.textured_background() {
        surface.fill_background(background, width, height);
    } else {
        surface.fill_rect(Vec2::ZERO, Vec2::new(width, height), background.base_color());
    }

    if game.phase == GamePhase::Start {
        return true;
    }

    // Pickups sit on the ground, under everything that moves
    for item in &game.health_items.items {
        draw_health_item(surface, item);
    }

    for enemy in &game.spawner.enemies {
        if !is_finite_pos(enemy.pos) {
            log::warn!("Skipping enemy {:?} with non-finite position", enemy.id);
            continue;
        }
        draw_enemy(surface, enemy);
    }

    if is_finite_pos(game.player.pos) {
        draw_player(surface, &game.player, game.now, settings.blink());
    } else {
        log::warn!("Skipping player with non-finite position");
    }

    for projectile in &game.weapons.projectiles {
        if is_finite_pos(projectile.pos) {
            draw_projectile(surface, projectile);
        }
    }

    let max_particles = settings.max_particles();
    for explosion in &game.weapons.explosions {
        draw_explosion(surface, explosion, max_particles);
    }

    true
}

fn draw_enemy<S: Surface>(surface: &mut S, enemy: &Enemy) {
    surface.save();
    surface.translate(enemy.pos);
    if enemy.facing_left {
        surface.scale(-1.0, 1.0);
    }
    if surface.sprite_ready(Sprite::Enemy) {
        surface.draw_sprite(Sprite::Enemy, Vec2::splat(enemy.size));
    } else {
        surface.fill_circle(Vec2::ZERO, enemy.radius(), ENEMY_FALLBACK);
        surface.stroke_circle(Vec2::ZERO, enemy.radius(), 2.0, ENEMY_OUTLINE);
    }
    surface.restore();
}

fn draw_player<S: Surface>(surface: &mut S, player: &Player, now: f64, blink: bool) {
    surface.save();
    surface.translate(player.pos);
    if blink && player.is_invulnerable(now) && (now / BLINK_MS).floor() as u64 % 2 == 0 {
        surface.set_alpha(0.5);
    }
    if player.facing_left {
        surface.scale(-1.0, 1.0);
    }
    let size = Vec2::splat(player.size);
    if surface.sprite_ready(Sprite::Player) {
        surface.draw_sprite(Sprite::Player, size);
    } else {
        log::debug!("Player sprite not loaded, drawing fallback");
        surface.fill_rect(-size / 2.0, size, PLAYER_FALLBACK);
    }
    surface.restore();
}

fn draw_projectile<S: Surface>(surface: &mut S, projectile: &Projectile) {
    let body = if projectile.piercing > 1 {
        PIERCING_SHOT
    } else {
        SHOT
    };
    let tail = if projectile.explodes() {
        EXPLOSIVE_TAIL
    } else {
        SHOT
    };

    surface.save();
    surface.translate(projectile.pos);
    surface.rotate(projectile.angle);
    surface.fill_circle(Vec2::ZERO, projectile.size / 2.0, body);
    surface.stroke_line(Vec2::new(-TAIL_LENGTH, 0.0), Vec2::ZERO, 2.0, tail);
    surface.restore();
}

fn draw_explosion<S: Surface>(surface: &mut S, explosion: &Explosion, max_particles: usize) {
    surface.save();
    if explosion.glow_ticks > 0 {
        surface.set_alpha(explosion.glow_alpha());
        surface.fill_radial(explosion.pos, explosion.radius, GLOW_INNER, GLOW_OUTER);
    }
    for particle in explosion.particles.iter().take(max_particles) {
        let color = FIRE_COLORS[particle.color as usize % FIRE_COLORS.len()];
        surface.set_alpha(particle.alpha);
        surface.fill_circle(particle.pos, particle.size, color);
    }
    surface.restore();
}

fn draw_health_item<S: Surface>(surface: &mut S, item: &HealthItem) {
    surface.save();
    surface.translate(item.pos);
    surface.scale(item.pulse_scale, item.pulse_scale);
    surface.fill_path(&HEART_PATH, HEART);
    surface.restore();
}
