//! Homing enemies and the wave spawner

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Bounds, EntityId};
use crate::consts::{DESPAWN_MARGIN, SPAWN_OFFSET};
use crate::tuning::Tuning;
use crate::{bearing, heading, is_finite_pos};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    /// Movement per tick
    pub speed: f32,
    pub size: f32,
    pub health: i32,
    /// Sprite flip only, not used for hit detection
    pub facing_left: bool,
    pub exp_value: u32,
}

impl Enemy {
    pub fn new(id: EntityId, pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            id,
            pos,
            speed: tuning.enemy_speed,
            size: tuning.enemy_size,
            health: tuning.enemy_health,
            facing_left: true,
            exp_value: tuning.enemy_exp_value,
        }
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Step straight toward `target`
    ///
    /// Lands exactly on the target when within one step, so the distance strictly shrinks on
    /// every call until it reaches zero.
    pub fn update(&mut self, target: Vec2) {
        let dist = self.pos.distance(target);
        if dist <= self.speed {
            self.pos = target;
        } else if dist > 0.0 {
            self.pos += heading(bearing(self.pos, target)) * self.speed;
        }
        self.facing_left = target.x < self.pos.x;
    }
}

/// Owns the enemy population, spawn timing and difficulty curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawner {
    pub enemies: Vec<Enemy>,
    pub spawn_interval: f64,
    pub last_spawn: f64,
    pub max_enemies: usize,
    /// Enemies per regular spawn tick
    pub burst_size: usize,
    pub last_difficulty_increase: f64,
    wave: u32,
    next_id: u32,
    tuning: Tuning,
}

impl EnemySpawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            enemies: Vec::new(),
            spawn_interval: tuning.spawn_interval_ms,
            last_spawn: 0.0,
            max_enemies: tuning.max_enemies,
            burst_size: tuning.spawn_burst,
            last_difficulty_increase: 0.0,
            wave: 1,
            next_id: 1,
            tuning: tuning.clone(),
        }
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Advance one tick
    ///
    /// Escalates difficulty on its cadence, spawns a burst when the interval has passed, moves
    /// every enemy toward `target` and prunes the dead and the strays. Returns the new wave
    /// number if one began this tick.
    pub fn update(
        &mut self,
        now: f64,
        bounds: &Bounds,
        target: Option<Vec2>,
        rng: &mut impl Rng,
    ) -> Option<u32> {
        let mut new_wave = None;
        if now - self.last_difficulty_increase >= self.tuning.difficulty_interval_ms {
            self.last_difficulty_increase = now;
            self.increase_difficulty(bounds, rng);
            new_wave = Some(self.wave);
        }

        if now - self.last_spawn > self.spawn_interval && self.enemies.len() < self.max_enemies {
            let count = self.burst_size.min(self.max_enemies - self.enemies.len());
            for _ in 0..count {
                self.spawn(bounds, rng);
            }
            self.last_spawn = now;
        }

        if let Some(target) = target {
            for enemy in &mut self.enemies {
                enemy.update(target);
            }
        }

        let before = self.enemies.len();
        self.enemies.retain(|enemy| {
            if !is_finite_pos(enemy.pos) {
                log::warn!("Dropping enemy {:?} with invalid position", enemy.id);
                return false;
            }
            enemy.is_alive() && bounds.contains_with_margin(enemy.pos, DESPAWN_MARGIN)
        });
        if before != self.enemies.len() {
            log::debug!(
                "Removed {} enemies, {} remaining",
                before - self.enemies.len(),
                self.enemies.len()
            );
        }

        new_wave
    }

    /// Advance the wave: tighter interval, bigger cap, bigger bursts, plus an arrival burst
    pub fn increase_difficulty(&mut self, bounds: &Bounds, rng: &mut impl Rng) {
        let t = &self.tuning;
        self.wave += 1;
        self.spawn_interval =
            (self.spawn_interval - t.spawn_interval_step_ms).max(t.spawn_interval_floor_ms);
        let cap = t.max_enemies_base + self.wave as usize * t.max_enemies_per_wave;
        self.max_enemies = self.max_enemies.max(cap).min(t.max_enemies_ceiling);
        self.burst_size = (self.burst_size + 1).min(t.spawn_burst_ceiling);

        let wave_burst = (self.wave as usize * t.wave_burst_per_wave).min(t.wave_burst_ceiling);
        for _ in 0..wave_burst {
            if !self.spawn(bounds, rng) {
                break;
            }
        }

        log::info!(
            "Wave {}: interval {:.0} ms, cap {}, burst {}",
            self.wave,
            self.spawn_interval,
            self.max_enemies,
            self.burst_size
        );
    }

    /// Spawn one enemy just outside a random edge. Refused at the population cap.
    pub fn spawn(&mut self, bounds: &Bounds, rng: &mut impl Rng) -> bool {
        if self.enemies.len() >= self.max_enemies {
            return false;
        }

        let pos = match rng.random_range(0..4) {
            0 => Vec2::new(rng.random::<f32>() * bounds.width, -SPAWN_OFFSET),
            1 => Vec2::new(
                bounds.width + SPAWN_OFFSET,
                rng.random::<f32>() * bounds.height,
            ),
            2 => Vec2::new(
                rng.random::<f32>() * bounds.width,
                bounds.height + SPAWN_OFFSET,
            ),
            _ => Vec2::new(-SPAWN_OFFSET, rng.random::<f32>() * bounds.height),
        };

        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.enemies.push(Enemy::new(id, pos, &self.tuning));
        log::debug!("Spawned enemy {:?} at {:?}", id, pos);
        true
    }

    /// Remove one enemy by identity
    pub fn remove(&mut self, id: EntityId) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn enemy_homes_in() {
        let mut enemy = Enemy::new(EntityId(1), Vec2::new(0.0, 0.0), &Tuning::default());
        enemy.update(Vec2::new(10.0, 0.0));
        assert!((enemy.pos - Vec2::new(2.0, 0.0)).length() < 1e-5);
        assert!(!enemy.facing_left);

        enemy.update(Vec2::new(-10.0, 0.0));
        assert!(enemy.facing_left);
    }

    #[test]
    fn enemy_snaps_when_close() {
        let mut enemy = Enemy::new(EntityId(1), Vec2::new(0.0, 0.0), &Tuning::default());
        enemy.update(Vec2::new(1.5, 0.0));
        assert_eq!(enemy.pos, Vec2::new(1.5, 0.0));
        enemy.update(Vec2::new(1.5, 0.0));
        assert_eq!(enemy.pos, Vec2::new(1.5, 0.0));
    }

    #[test]
    fn spawns_outside_edges() {
        let mut spawner = EnemySpawner::new(&Tuning::default());
        let bounds = Bounds::default();
        let mut rng = rng();
        for _ in 0..40 {
            spawner.spawn(&bounds, &mut rng);
        }
        for enemy in &spawner.enemies {
            let p = enemy.pos;
            let on_edge = p.y == -20.0 || p.y == 620.0 || p.x == -20.0 || p.x == 820.0;
            assert!(on_edge, "{:?} is not on a spawn edge", p);
        }
    }

    #[test]
    fn burst_waits_for_interval() {
        let mut spawner = EnemySpawner::new(&Tuning::default());
        let bounds = Bounds::default();
        let mut rng = rng();

        spawner.update(1_000.0, &bounds, None, &mut rng);
        assert!(spawner.enemies.is_empty());

        spawner.update(1_001.0, &bounds, None, &mut rng);
        assert_eq!(spawner.enemies.len(), 3);

        spawner.update(1_500.0, &bounds, None, &mut rng);
        assert_eq!(spawner.enemies.len(), 3);
    }

    #[test]
    fn ids_are_unique() {
        let mut spawner = EnemySpawner::new(&Tuning::default());
        let mut rng = rng();
        for _ in 0..10 {
            spawner.spawn(&Bounds::default(), &mut rng);
        }
        let mut ids: Vec<_> = spawner.enemies.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn no_target_means_no_motion() {
        let mut spawner = EnemySpawner::new(&Tuning::default());
        let bounds = Bounds::default();
        let mut rng = rng();
        spawner.update(1_001.0, &bounds, None, &mut rng);
        let before: Vec<_> = spawner.enemies.iter().map(|e| e.pos).collect();
        spawner.update(1_020.0, &bounds, None, &mut rng);
        let after: Vec<_> = spawner.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn prunes_dead_and_strays() {
        let mut spawner = EnemySpawner::new(&Tuning::default());
        let bounds = Bounds::default();
        let t = Tuning::default();
        spawner.enemies.push(Enemy::new(EntityId(100), Vec2::new(100.0, 100.0), &t));
        spawner.enemies.push(Enemy::new(EntityId(101), Vec2::new(-150.0, 100.0), &t));
        spawner.enemies.push(Enemy::new(EntityId(102), Vec2::new(f32::NAN, 0.0), &t));
        spawner.enemies.push(Enemy::new(EntityId(103), Vec2::new(200.0, 200.0), &t));
        spawner.enemies[3].health = 0;

        spawner.update(10.0, &bounds, None, &mut rng());
        let ids: Vec<_> = spawner.enemies.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EntityId(100)]);
    }

    #[test]
    fn difficulty_escalates_and_clamps() {
        let mut spawner = EnemySpawner::new(&Tuning::default());
        let bounds = Bounds::default();
        let mut rng = rng();

        spawner.update(30_000.0, &bounds, None, &mut rng);
        assert_eq!(spawner.wave(), 2);
        assert_eq!(spawner.spawn_interval, 970.0);
        assert_eq!(spawner.max_enemies, 85);
        assert_eq!(spawner.burst_size, 4);

        for _ in 0..60 {
            spawner.enemies.clear();
            spawner.increase_difficulty(&bounds, &mut rng);
        }
        assert_eq!(spawner.spawn_interval, 150.0);
        assert_eq!(spawner.max_enemies, 100);
        assert_eq!(spawner.burst_size, 8);
    }

    #[test]
    fn wave_burst_respects_cap() {
        let mut spawner = EnemySpawner::new(&Tuning::default());
        let bounds = Bounds::default();
        let mut rng = rng();
        spawner.max_enemies = 5;
        spawner.burst_size = 3;
        for _ in 0..4 {
            spawner.spawn(&bounds, &mut rng);
        }
        // Cap rises to 85 at wave 2, wave burst adds 4
        spawner.increase_difficulty(&bounds, &mut rng);
        assert_eq!(spawner.enemies.len(), 8);
        assert!(spawner.enemies.len() <= spawner.max_enemies);
    }
}
