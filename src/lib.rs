//! Spud Survivors - A top-down survival arcade game
//!
//! Core modules:
//! - `sim`: Real-time simulation (player, spawner, weapons, upgrades, session)
//! - `renderer`: Abstract 2D drawing surface and the per-frame draw pass
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences
//! - `highscores`: Persisted best survival time

pub mod error;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use highscores::HighScore;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default canvas dimensions (4:3)
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;

    /// Nominal frame duration in ms, used by headless runs
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Enemies and projectiles beyond this distance outside the canvas are culled
    pub const DESPAWN_MARGIN: f32 = 100.0;
    /// Enemies spawn this far outside the canvas edge
    pub const SPAWN_OFFSET: f32 = 20.0;

    /// Upgrade level cap shared by every upgrade kind
    pub const MAX_UPGRADE_LEVEL: u8 = 5;

    /// Particle cap for a single explosion burst
    pub const MAX_PARTICLES_PER_EXPLOSION: usize = 120;

    /// LocalStorage keys
    pub const HIGH_SCORE_KEY: &str = "highScore";
    pub const SETTINGS_KEY: &str = "spud_survivors_settings";
}

/// Bearing from `from` to `to` in radians
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// True if both components are finite
#[inline]
pub fn is_finite_pos(pos: Vec2) -> bool {
    pos.x.is_finite() && pos.y.is_finite()
}
