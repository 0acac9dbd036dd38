//! Data-driven game balance
//!
//! Every gameplay number lives here. Missing JSON keys fall back to the defaults, so a tuning
//! file only needs the values it overrides.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Movement per tick
    pub player_speed: f32,
    pub player_size: f32,
    pub max_lives: u8,
    pub invulnerable_ms: f64,
    pub dash_speed_multiplier: f32,
    pub dash_duration_ms: f64,
    pub dash_cooldown_ms: f64,

    // === Enemies ===
    pub enemy_speed: f32,
    pub enemy_size: f32,
    pub enemy_health: i32,
    pub enemy_exp_value: u32,

    // === Spawner ===
    pub spawn_interval_ms: f64,
    pub spawn_interval_floor_ms: f64,
    pub spawn_interval_step_ms: f64,
    pub max_enemies: usize,
    pub max_enemies_base: usize,
    pub max_enemies_per_wave: usize,
    pub max_enemies_ceiling: usize,
    pub spawn_burst: usize,
    pub spawn_burst_ceiling: usize,
    /// Enemies added per wave number when a wave begins
    pub wave_burst_per_wave: usize,
    pub wave_burst_ceiling: usize,
    pub difficulty_interval_ms: f64,

    // === Weapons ===
    pub shot_interval_ms: f64,
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub damage: i32,
    /// Angular gap between shots of one fan (radians)
    pub spread: f32,
    pub explosion_base_radius: f32,
    pub explosion_factor: f32,
    /// Glow ring lifetime in ticks
    pub explosion_duration_ticks: u32,

    // === Pickups ===
    pub health_drop_chance: f32,
    pub max_health_items: usize,
    pub health_item_size: f32,
    pub health_item_padding: f32,

    // === Leveling ===
    pub exp_to_first_level: u32,
    pub exp_growth: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            player_size: 48.0,
            max_lives: 3,
            invulnerable_ms: 2000.0,
            dash_speed_multiplier: 2.5,
            dash_duration_ms: 200.0,
            dash_cooldown_ms: 1500.0,

            enemy_speed: 2.0,
            enemy_size: 48.0,
            enemy_health: 1,
            enemy_exp_value: 10,

            spawn_interval_ms: 1000.0,
            spawn_interval_floor_ms: 150.0,
            spawn_interval_step_ms: 30.0,
            max_enemies: 40,
            max_enemies_base: 75,
            max_enemies_per_wave: 5,
            max_enemies_ceiling: 100,
            spawn_burst: 3,
            spawn_burst_ceiling: 8,
            wave_burst_per_wave: 2,
            wave_burst_ceiling: 10,
            difficulty_interval_ms: 30_000.0,

            shot_interval_ms: 500.0,
            projectile_speed: 8.0,
            projectile_size: 8.0,
            damage: 1,
            spread: 0.1,
            explosion_base_radius: 50.0,
            explosion_factor: 0.4,
            explosion_duration_ticks: 20,

            health_drop_chance: 0.1,
            max_health_items: 2,
            health_item_size: 20.0,
            health_item_padding: 30.0,

            exp_to_first_level: 100,
            exp_growth: 1.5,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or break the simulation
    pub fn validate(&self) -> Result<(), SimError> {
        fn positive(field: &'static str, v: f64) -> Result<(), SimError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SimError::InvalidTuning {
                    field,
                    reason: "must be finite and positive",
                })
            }
        }

        fn non_negative(field: &'static str, v: f64) -> Result<(), SimError> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(SimError::InvalidTuning {
                    field,
                    reason: "must be finite and not negative",
                })
            }
        }

        positive("player_speed", self.player_speed as f64)?;
        positive("enemy_speed", self.enemy_speed as f64)?;
        positive("player_size", self.player_size as f64)?;
        positive("enemy_size", self.enemy_size as f64)?;
        positive("projectile_speed", self.projectile_speed as f64)?;
        positive("projectile_size", self.projectile_size as f64)?;
        positive("spawn_interval_ms", self.spawn_interval_ms)?;
        positive("spawn_interval_floor_ms", self.spawn_interval_floor_ms)?;
        positive("shot_interval_ms", self.shot_interval_ms)?;
        positive("difficulty_interval_ms", self.difficulty_interval_ms)?;
        positive("explosion_base_radius", self.explosion_base_radius as f64)?;
        non_negative("spawn_interval_step_ms", self.spawn_interval_step_ms)?;
        non_negative("explosion_factor", self.explosion_factor as f64)?;
        non_negative("spread", self.spread as f64)?;
        non_negative("invulnerable_ms", self.invulnerable_ms)?;
        non_negative("dash_duration_ms", self.dash_duration_ms)?;
        non_negative("dash_cooldown_ms", self.dash_cooldown_ms)?;

        if !(self.dash_speed_multiplier.is_finite() && self.dash_speed_multiplier >= 1.0) {
            return Err(SimError::InvalidTuning {
                field: "dash_speed_multiplier",
                reason: "must be finite and at least 1",
            });
        }
        if self.max_enemies_base > self.max_enemies_ceiling {
            return Err(SimError::InvalidTuning {
                field: "max_enemies_base",
                reason: "must not exceed max_enemies_ceiling",
            });
        }

        if self.max_lives == 0 {
            return Err(SimError::InvalidTuning {
                field: "max_lives",
                reason: "must be at least 1",
            });
        }
        if self.enemy_health <= 0 || self.damage <= 0 {
            return Err(SimError::InvalidTuning {
                field: "enemy_health",
                reason: "health and damage must be positive",
            });
        }
        if self.max_enemies > self.max_enemies_ceiling {
            return Err(SimError::InvalidTuning {
                field: "max_enemies",
                reason: "must not exceed max_enemies_ceiling",
            });
        }
        if self.spawn_burst == 0 || self.spawn_burst > self.spawn_burst_ceiling {
            return Err(SimError::InvalidTuning {
                field: "spawn_burst",
                reason: "must be between 1 and spawn_burst_ceiling",
            });
        }
        if self.exp_to_first_level == 0 || !(self.exp_growth >= 1.0) {
            return Err(SimError::InvalidTuning {
                field: "exp_growth",
                reason: "threshold must be positive and non-shrinking",
            });
        }
        if !(0.0..=1.0).contains(&self.health_drop_chance) {
            return Err(SimError::InvalidTuning {
                field: "health_drop_chance",
                reason: "must be a probability",
            });
        }
        Ok(())
    }
}
