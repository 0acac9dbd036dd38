//! Circle overlap and proximity queries
//!
//! Every entity in the game is treated as a circle whose radius is half its size.

use glam::Vec2;

use super::enemy::Enemy;

/// True when two circles overlap (touching edges do not count)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

/// True when `point` lies within `radius` of `center` (inclusive)
#[inline]
pub fn within_radius(center: Vec2, point: Vec2, radius: f32) -> bool {
    center.distance(point) <= radius
}

/// Index of the nearest living enemy by squared distance
pub fn nearest_enemy(origin: Vec2, enemies: &[Enemy]) -> Option<usize> {
    let mut nearest = None;
    let mut nearest_dist = f32::INFINITY;

    for (i, enemy) in enemies.iter().enumerate() {
        if !enemy.is_alive() {
            continue;
        }
        let dist = origin.distance_squared(enemy.pos);
        if dist < nearest_dist {
            nearest_dist = dist;
            nearest = Some(i);
        }
    }

    nearest
}
