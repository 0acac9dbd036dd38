//! Auto-targeting weapon, projectiles and explosion effects

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{circles_overlap, nearest_enemy, within_radius};
use super::enemy::Enemy;
use super::state::{Bounds, EntityId};
use crate::consts::{DESPAWN_MARGIN, MAX_PARTICLES_PER_EXPLOSION};
use crate::error::SimError;
use crate::tuning::Tuning;
use crate::{bearing, heading, is_finite_pos};

/// An enemy transitioned from alive to dead this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub id: EntityId,
    pub pos: Vec2,
    pub exp_value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    /// Fixed at creation, no homing
    pub vel: Vec2,
    pub angle: f32,
    pub size: f32,
    /// Distinct enemies this projectile may hit directly
    pub piercing: u32,
    /// Enemies hit directly, in order
    pub hits: Vec<EntityId>,
    /// Enemies damaged by this projectile's explosions
    pub splashed: Vec<EntityId>,
    pub explosion_level: u32,
}

impl Projectile {
    pub fn new(id: EntityId, origin: Vec2, angle: f32, speed: f32, size: f32) -> Self {
        Self {
            id,
            pos: origin,
            vel: heading(angle) * speed,
            angle,
            size,
            piercing: 1,
            hits: Vec::new(),
            splashed: Vec::new(),
            explosion_level: 0,
        }
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
    }

    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    pub fn can_hit(&self) -> bool {
        self.hit_count() < self.piercing as usize
    }

    /// Already damaged `id`, directly or by splash
    pub fn has_touched(&self, id: EntityId) -> bool {
        self.hits.contains(&id) || self.splashed.contains(&id)
    }

    pub fn explodes(&self) -> bool {
        self.explosion_level > 0
    }

    pub fn is_spent(&self) -> bool {
        !self.can_hit()
    }
}

/// Explosion splash radius. Evaluated once per detonation from the level the projectile
/// carried when it was fired.
pub fn explosion_radius(base: f32, level: u32, factor: f32) -> f32 {
    base * (1.0 + level as f32 * factor)
}

/// Visual-only spark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub alpha: f32,
    pub decay: f32,
    /// Index into the fire palette
    pub color: u8,
}

impl Particle {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.alpha -= self.decay;
        self.size *= 0.97;
    }

    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Fire palette for explosion particles
pub const FIRE_COLORS: [[f32; 4]; 4] = [
    [1.0, 0.267, 0.0, 1.0],
    [1.0, 0.533, 0.0, 1.0],
    [1.0, 0.667, 0.0, 1.0],
    [1.0, 0.8, 0.0, 1.0],
];

/// Detonation visual: a fading glow ring and a particle burst
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub glow_ticks: u32,
    pub glow_duration: u32,
    pub particles: Vec<Particle>,
}

impl Explosion {
    pub fn new(
        pos: Vec2,
        radius: f32,
        glow_duration: u32,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        if !radius.is_finite() || radius <= 0.0 || !is_finite_pos(pos) {
            return Err(SimError::InvalidExplosion { radius });
        }

        let count = ((radius * 1.5) as usize).min(MAX_PARTICLES_PER_EXPLOSION);
        let particles = (0..count)
            .map(|_| Particle {
                pos,
                vel: Vec2::new(
                    (rng.random::<f32>() - 0.5) * 8.0,
                    (rng.random::<f32>() - 0.5) * 8.0,
                ),
                size: rng.random::<f32>() * 4.0 + 2.0,
                alpha: 1.0,
                decay: 0.02 + rng.random::<f32>() * 0.03,
                color: rng.random_range(0..FIRE_COLORS.len() as u8),
            })
            .collect();

        Ok(Self {
            pos,
            radius,
            glow_ticks: glow_duration,
            glow_duration,
            particles,
        })
    }

    pub fn update(&mut self) {
        self.glow_ticks = self.glow_ticks.saturating_sub(1);
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn is_active(&self) -> bool {
        self.glow_ticks > 0 || !self.particles.is_empty()
    }

    /// Glow opacity, 1 at detonation fading to 0
    pub fn glow_alpha(&self) -> f32 {
        if self.glow_duration == 0 {
            0.0
        } else {
            self.glow_ticks as f32 / self.glow_duration as f32
        }
    }
}

/// Projectile lifecycle, auto-fire and hit resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponSystem {
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub last_shot: f64,
    pub shot_interval: f64,
    pub damage: i32,
    pub front_projectiles: u32,
    pub back_projectiles: u32,
    pub piercing: u32,
    pub explosion_level: u32,
    next_id: u32,
    tuning: Tuning,
}

impl WeaponSystem {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            projectiles: Vec::new(),
            explosions: Vec::new(),
            last_shot: 0.0,
            shot_interval: tuning.shot_interval_ms,
            damage: tuning.damage,
            front_projectiles: 1,
            back_projectiles: 0,
            piercing: 1,
            explosion_level: 0,
            next_id: 1,
            tuning: tuning.clone(),
        }
    }

    /// Current splash radius for newly fired projectiles
    pub fn current_explosion_radius(&self) -> f32 {
        explosion_radius(
            self.tuning.explosion_base_radius,
            self.explosion_level,
            self.tuning.explosion_factor,
        )
    }

    /// Advance one tick
    ///
    /// Moves projectiles, resolves hits against `enemies`, prunes spent projectiles, then
    /// fires a volley if the cooldown has passed. Returns every kill made this tick, once each.
    pub fn update(
        &mut self,
        now: f64,
        player_pos: Vec2,
        enemies: &mut [Enemy],
        bounds: &Bounds,
        rng: &mut impl Rng,
    ) -> Vec<Kill> {
        let mut kills = Vec::new();
        let mut detonations = Vec::new();

        for projectile in &mut self.projectiles {
            if !is_finite_pos(projectile.pos) {
                log::warn!("Skipping projectile {:?} with invalid position", projectile.id);
                continue;
            }
            projectile.update();
            resolve_hits(projectile, enemies, self.damage, &self.tuning, &mut kills, &mut detonations);
        }

        for (pos, radius) in detonations {
            match Explosion::new(pos, radius, self.tuning.explosion_duration_ticks, rng) {
                Ok(explosion) => self.explosions.push(explosion),
                Err(err) => log::warn!("Dropped explosion: {}", err),
            }
        }

        self.projectiles.retain(|p| {
            !p.is_spent()
                && is_finite_pos(p.pos)
                && bounds.contains_with_margin(p.pos, DESPAWN_MARGIN)
        });

        if now - self.last_shot >= self.shot_interval {
            if let Some(target) = nearest_enemy(player_pos, enemies) {
                self.shoot(player_pos, enemies[target].pos);
                self.last_shot = now;
            }
        }

        for explosion in &mut self.explosions {
            explosion.update();
        }
        self.explosions.retain(Explosion::is_active);

        kills
    }

    /// Fire a volley: a front fan toward `target` and an optional mirrored back fan
    pub fn shoot(&mut self, origin: Vec2, target: Vec2) {
        let base = bearing(origin, target);
        self.fire_fan(origin, base, self.front_projectiles);
        if self.back_projectiles > 0 {
            self.fire_fan(origin, base + std::f32::consts::PI, self.back_projectiles);
        }
    }

    fn fire_fan(&mut self, origin: Vec2, center: f32, count: u32) {
        for i in 0..count {
            let offset = i as f32 - (count as f32 - 1.0) / 2.0;
            let angle = center + offset * self.tuning.spread;
            let id = EntityId(self.next_id);
            self.next_id += 1;

            let mut projectile = Projectile::new(
                id,
                origin,
                angle,
                self.tuning.projectile_speed,
                self.tuning.projectile_size,
            );
            projectile.piercing = self.piercing;
            projectile.explosion_level = self.explosion_level;
            self.projectiles.push(projectile);
        }
    }
}

/// Apply `damage`, recording a kill only on the alive-to-dead transition
fn apply_damage(enemy: &mut Enemy, damage: i32, kills: &mut Vec<Kill>) {
    let was_alive = enemy.is_alive();
    enemy.health -= damage;
    if was_alive && !enemy.is_alive() {
        kills.push(Kill {
            id: enemy.id,
            pos: enemy.pos,
            exp_value: enemy.exp_value,
        });
    }
}

fn resolve_hits(
    projectile: &mut Projectile,
    enemies: &mut [Enemy],
    damage: i32,
    tuning: &Tuning,
    kills: &mut Vec<Kill>,
    detonations: &mut Vec<(Vec2, f32)>,
) {
    for i in 0..enemies.len() {
        if !projectile.can_hit() {
            break;
        }
        let enemy = &enemies[i];
        if !enemy.is_alive() || !is_finite_pos(enemy.pos) || projectile.has_touched(enemy.id) {
            continue;
        }
        if !circles_overlap(projectile.pos, projectile.size / 2.0, enemy.pos, enemy.radius()) {
            continue;
        }

        projectile.hits.push(enemy.id);
        apply_damage(&mut enemies[i], damage, kills);

        if !projectile.explodes() {
            continue;
        }
        let radius = explosion_radius(
            tuning.explosion_base_radius,
            projectile.explosion_level,
            tuning.explosion_factor,
        );
        detonations.push((projectile.pos, radius));
        if !radius.is_finite() || radius <= 0.0 {
            continue;
        }

        let primary = enemies[i].id;
        for other in enemies.iter_mut() {
            if other.id == primary || !other.is_alive() || projectile.has_touched(other.id) {
                continue;
            }
            if within_radius(projectile.pos, other.pos, radius) {
                projectile.splashed.push(other.id);
                apply_damage(other, damage, kills);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn enemy(id: u32, x: f32, y: f32) -> Enemy {
        Enemy::new(EntityId(id), Vec2::new(x, y), &Tuning::default())
    }

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    #[test]
    fn fires_at_nearest_after_cooldown() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        let mut enemies = vec![enemy(1, 700.0, 300.0), enemy(2, 100.0, 300.0)];
        let player = Vec2::new(300.0, 300.0);

        weapons.update(499.0, player, &mut enemies, &bounds(), &mut rng());
        assert!(weapons.projectiles.is_empty());

        weapons.update(500.0, player, &mut enemies, &bounds(), &mut rng());
        assert_eq!(weapons.projectiles.len(), 1);
        let p = &weapons.projectiles[0];
        // Nearest is the enemy to the left
        assert!(p.vel.x < 0.0);
        assert!((p.vel.length() - 8.0).abs() < 1e-4);
        assert_eq!(weapons.last_shot, 500.0);
    }

    #[test]
    fn holds_fire_without_targets() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        weapons.update(5_000.0, Vec2::ZERO, &mut [], &bounds(), &mut rng());
        assert!(weapons.projectiles.is_empty());
        assert_eq!(weapons.last_shot, 0.0);
    }

    #[test]
    fn volley_fans_front_and_back() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        weapons.front_projectiles = 3;
        weapons.back_projectiles = 2;
        weapons.shoot(Vec2::ZERO, Vec2::new(10.0, 0.0));

        let angles: Vec<f32> = weapons.projectiles.iter().map(|p| p.angle).collect();
        assert_eq!(angles.len(), 5);
        assert!((angles[0] + 0.1).abs() < 1e-5);
        assert!(angles[1].abs() < 1e-5);
        assert!((angles[2] - 0.1).abs() < 1e-5);
        let pi = std::f32::consts::PI;
        assert!((angles[3] - (pi - 0.05)).abs() < 1e-5);
        assert!((angles[4] - (pi + 0.05)).abs() < 1e-5);
    }

    #[test]
    fn hit_kills_and_spends_projectile() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        let mut enemies = vec![enemy(5, 110.0, 100.0)];
        weapons
            .projectiles
            .push(Projectile::new(EntityId(99), Vec2::new(100.0, 100.0), 0.0, 8.0, 8.0));

        let kills = weapons.update(10.0, Vec2::new(400.0, 400.0), &mut enemies, &bounds(), &mut rng());
        assert_eq!(kills.len(), 1);
        assert_eq!(kills[0].id, EntityId(5));
        assert_eq!(kills[0].exp_value, 10);
        assert!(weapons.projectiles.is_empty());
    }

    #[test]
    fn piercing_hits_each_enemy_once() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        let mut enemies = vec![enemy(1, 110.0, 100.0), enemy(2, 112.0, 100.0)];
        for e in &mut enemies {
            e.health = 5;
        }
        let mut p = Projectile::new(EntityId(1), Vec2::new(100.0, 100.0), 0.0, 1.0, 8.0);
        p.piercing = 3;
        weapons.projectiles.push(p);

        for t in 0..5 {
            weapons.update(t as f64, Vec2::new(700.0, 500.0), &mut enemies, &bounds(), &mut rng());
        }
        assert_eq!(enemies[0].health, 4);
        assert_eq!(enemies[1].health, 4);
        let p = &weapons.projectiles[0];
        assert_eq!(p.hits, vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn splash_reaches_only_inside_radius() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        weapons.explosion_level = 1;
        // radius = 50 * 1.4 = 70
        assert!((weapons.current_explosion_radius() - 70.0).abs() < 1e-4);

        let mut enemies = vec![
            enemy(1, 108.0, 100.0),
            enemy(2, 108.0, 160.0),
            enemy(3, 108.0, 190.0),
        ];
        let mut p = Projectile::new(EntityId(1), Vec2::new(100.0, 100.0), 0.0, 8.0, 8.0);
        p.explosion_level = 1;
        weapons.projectiles.push(p);

        let kills = weapons.update(1.0, Vec2::new(700.0, 500.0), &mut enemies, &bounds(), &mut rng());
        let ids: Vec<_> = kills.iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![EntityId(1), EntityId(2)]);
        assert!(enemies[2].is_alive());
        assert_eq!(weapons.explosions.len(), 1);
    }

    #[test]
    fn splashed_enemy_is_not_hit_again() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        let mut enemies = vec![enemy(1, 108.0, 100.0), enemy(2, 140.0, 100.0)];
        for e in &mut enemies {
            e.health = 10;
        }
        let mut p = Projectile::new(EntityId(1), Vec2::new(100.0, 100.0), 0.0, 8.0, 8.0);
        p.explosion_level = 1;
        p.piercing = 3;
        weapons.projectiles.push(p);

        for t in 0..6 {
            weapons.update(t as f64, Vec2::new(700.0, 500.0), &mut enemies, &bounds(), &mut rng());
        }
        assert_eq!(enemies[0].health, 9);
        assert_eq!(enemies[1].health, 9);
        let p = &weapons.projectiles[0];
        assert_eq!(p.hits, vec![EntityId(1)]);
        assert_eq!(p.splashed, vec![EntityId(2)]);
    }

    #[test]
    fn kill_reported_once_across_projectiles() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        let mut enemies = vec![enemy(1, 108.0, 100.0)];
        for id in 0..3 {
            weapons
                .projectiles
                .push(Projectile::new(EntityId(id), Vec2::new(100.0, 100.0), 0.0, 8.0, 8.0));
        }
        let kills = weapons.update(1.0, Vec2::new(700.0, 500.0), &mut enemies, &bounds(), &mut rng());
        assert_eq!(kills.len(), 1);
        // Dead enemies are not valid targets
        assert_eq!(weapons.projectiles.len(), 2);
    }

    #[test]
    fn invalid_explosion_is_rejected() {
        let mut r = rng();
        assert!(matches!(
            Explosion::new(Vec2::ZERO, f32::NAN, 20, &mut r),
            Err(SimError::InvalidExplosion { .. })
        ));
        assert!(Explosion::new(Vec2::ZERO, 0.0, 20, &mut r).is_err());
        assert!(Explosion::new(Vec2::ZERO, -5.0, 20, &mut r).is_err());
    }

    #[test]
    fn degenerate_radius_drops_the_explosion_but_not_the_hit() {
        let tuning = Tuning {
            explosion_factor: -10.0,
            ..Tuning::default()
        };
        let mut weapons = WeaponSystem::new(&tuning);
        weapons.explosion_level = 1;
        assert!(weapons.current_explosion_radius() <= 0.0);

        let mut enemies = vec![enemy(1, 108.0, 100.0), enemy(2, 108.0, 130.0)];
        let mut p = Projectile::new(EntityId(1), Vec2::new(100.0, 100.0), 0.0, 8.0, 8.0);
        p.explosion_level = 1;
        weapons.projectiles.push(p);

        let player = Vec2::new(300.0, 300.0);
        let kills = weapons.update(1_000.0, player, &mut enemies, &bounds(), &mut rng());
        assert_eq!(kills.len(), 1);
        assert_eq!(kills[0].id, EntityId(1));
        assert!(enemies[1].is_alive());
        assert!(weapons.explosions.is_empty());

        // The spent projectile is gone and the volley at the survivor still went out
        assert_eq!(weapons.projectiles.len(), 1);
        assert!(weapons.projectiles[0].splashed.is_empty());
        assert_eq!(weapons.last_shot, 1_000.0);
    }

    #[test]
    fn explosion_fades_out() {
        let mut explosion = Explosion::new(Vec2::ZERO, 50.0, 20, &mut rng()).unwrap();
        assert_eq!(explosion.particles.len(), 75);
        for _ in 0..20 {
            explosion.update();
        }
        assert_eq!(explosion.glow_ticks, 0);
        for _ in 0..60 {
            explosion.update();
        }
        assert!(!explosion.is_active());
    }

    #[test]
    fn strays_leave_the_field() {
        let mut weapons = WeaponSystem::new(&Tuning::default());
        weapons
            .projectiles
            .push(Projectile::new(EntityId(1), Vec2::new(895.0, 300.0), 0.0, 8.0, 8.0));
        weapons.update(1.0, Vec2::ZERO, &mut [], &bounds(), &mut rng());
        assert!(weapons.projectiles.is_empty());
    }
}
