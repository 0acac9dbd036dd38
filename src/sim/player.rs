//! The player character

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Bounds;
use crate::tuning::Tuning;

/// Short speed burst followed by a cooldown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashState {
    pub active: bool,
    pub started_at: f64,
    pub duration: f64,
    /// Simulation ms before which another dash is refused
    pub cooldown_until: f64,
    pub cooldown: f64,
    pub speed_multiplier: f32,
}

impl DashState {
    fn new(tuning: &Tuning) -> Self {
        Self {
            active: false,
            started_at: 0.0,
            duration: tuning.dash_duration_ms,
            cooldown_until: 0.0,
            cooldown: tuning.dash_cooldown_ms,
            speed_multiplier: tuning.dash_speed_multiplier,
        }
    }

    /// Try to begin a dash. Returns true if one started.
    pub fn trigger(&mut self, now: f64) -> bool {
        if self.active || now < self.cooldown_until {
            return false;
        }
        self.active = true;
        self.started_at = now;
        self.cooldown_until = now + self.duration + self.cooldown;
        true
    }

    /// End the dash once its duration has elapsed
    pub fn update(&mut self, now: f64) {
        if self.active && now - self.started_at > self.duration {
            self.active = false;
        }
    }

    pub fn multiplier(&self) -> f32 {
        if self.active { self.speed_multiplier } else { 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Movement per tick
    pub speed: f32,
    pub size: f32,
    pub facing_left: bool,
    pub lives: u8,
    pub max_lives: u8,
    pub invulnerable: bool,
    pub last_hit_time: f64,
    pub invulnerable_ms: f64,
    pub dash: DashState,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos,
            speed: tuning.player_speed,
            size: tuning.player_size,
            facing_left: false,
            lives: tuning.max_lives,
            max_lives: tuning.max_lives,
            invulnerable: false,
            last_hit_time: 0.0,
            invulnerable_ms: tuning.invulnerable_ms,
            dash: DashState::new(tuning),
        }
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Apply one tick of movement input and expire timed states
    ///
    /// `movement` components are clamped to [-1, 1] per axis, so keyboard input moves `speed`
    /// on each pressed axis.
    pub fn update(&mut self, movement: Vec2, dash: bool, now: f64, bounds: &Bounds) {
        if self.invulnerable && now - self.last_hit_time > self.invulnerable_ms {
            self.invulnerable = false;
        }

        if dash && self.dash.trigger(now) {
            log::debug!("Dash at {:.0} ms", now);
        }
        self.dash.update(now);

        let dir = Vec2::new(
            finite_or_zero(movement.x).clamp(-1.0, 1.0),
            finite_or_zero(movement.y).clamp(-1.0, 1.0),
        );
        if dir.x < 0.0 {
            self.facing_left = true;
        } else if dir.x > 0.0 {
            self.facing_left = false;
        }

        let step = dir * self.speed * self.dash.multiplier();
        self.pos = bounds.clamp_inside(self.pos + step, self.radius());
    }

    pub fn is_invulnerable(&self, now: f64) -> bool {
        self.invulnerable && now - self.last_hit_time <= self.invulnerable_ms
    }

    /// Lose a life unless inside the invulnerability window. Returns true if damage landed.
    pub fn take_damage(&mut self, now: f64) -> bool {
        if self.is_invulnerable(now) {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.invulnerable = true;
        self.last_hit_time = now;
        true
    }

    /// Restore one life up to the maximum. Returns true if a life was added.
    pub fn heal(&mut self) -> bool {
        if self.lives < self.max_lives {
            self.lives += 1;
            true
        } else {
            false
        }
    }

    pub fn is_dead(&self) -> bool {
        self.lives == 0
    }
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
