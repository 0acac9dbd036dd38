//! Session state and core simulation types
//!
//! `Game` is the sole owner of every simulated object. Other systems borrow what they need
//! for the duration of a call.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::EnemySpawner;
use super::health::HealthItemManager;
use super::player::Player;
use super::upgrade::{UpgradeOption, UpgradeState, UpgradeSystem};
use super::weapon::WeaponSystem;
use crate::highscores::HighScore;
use crate::tuning::Tuning;

/// Opaque, stable identity assigned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Visible playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True if `pos` is inside the playfield grown by `margin` on every side (exclusive)
    pub fn contains_with_margin(&self, pos: Vec2, margin: f32) -> bool {
        pos.x > -margin
            && pos.x < self.width + margin
            && pos.y > -margin
            && pos.y < self.height + margin
    }

    /// Clamp `pos` to the playfield shrunk by `inset` on every side
    pub fn clamp_inside(&self, pos: Vec2, inset: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(inset, (self.width - inset).max(inset)),
            pos.y.clamp(inset, (self.height - inset).max(inset)),
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_WIDTH, crate::consts::DEFAULT_HEIGHT)
    }
}

/// Wall-clock to simulation-time conversion
///
/// Simulation time is `wall - start - total_paused`. Time spent paused never reaches the
/// simulation, so every interval timer sees the same logical elapsed time regardless of how
/// long the player sat in a menu.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    start: f64,
    total_paused: f64,
    pause_started: Option<f64>,
}

impl SimClock {
    pub fn new(start: f64) -> Self {
        Self {
            start,
            total_paused: 0.0,
            pause_started: None,
        }
    }

    /// Simulation ms for a wall-clock timestamp. While paused, frozen at the pause point.
    pub fn now(&self, wall: f64) -> f64 {
        let wall = self.pause_started.unwrap_or(wall);
        wall - self.start - self.total_paused
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started.is_some()
    }

    /// Begin a pause span. Nested pauses are ignored.
    pub fn pause(&mut self, wall: f64) {
        if self.pause_started.is_none() {
            self.pause_started = Some(wall);
        }
    }

    /// Close the current pause span
    pub fn resume(&mut self, wall: f64) {
        if let Some(started) = self.pause_started.take() {
            self.total_paused += (wall - started).max(0.0);
        }
    }

    pub fn total_paused(&self) -> f64 {
        self.total_paused
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no session running
    Start,
    /// Active gameplay (may be interrupted by the upgrade menu)
    Playing,
    /// Paused by the player
    Paused,
    /// Lives exhausted
    GameOver,
}

/// Discrete events for the audio/UI collaborators, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player lost a life
    Hit { lives_left: u8 },
    /// Player reached a new level (once per experience grant)
    LevelUp { level: u32 },
    /// Health item collected
    Pickup,
    /// Difficulty wave advanced
    WaveAdvanced { wave: u32 },
    /// Session ended with this survival time in seconds
    GameOver { score: u64 },
    /// Final score beat the stored best
    NewHighScore { score: u64 },
}

/// Read-only view polled by the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub upgrading: bool,
    pub lives: u8,
    pub max_lives: u8,
    pub level: u32,
    pub experience: u32,
    pub exp_to_next_level: u32,
    pub unspent_upgrades: u32,
    pub survival_secs: u64,
    pub wave: u32,
    pub enemy_count: usize,
    pub high_score: u64,
    pub upgrade_menu: Vec<UpgradeOption>,
}

/// One play session and everything it owns
#[derive(Debug, Clone)]
pub struct Game {
    pub tuning: Tuning,
    pub bounds: Bounds,
    pub phase: GamePhase,
    pub clock: SimClock,
    /// Simulation ms of the most recent tick
    pub now: f64,
    pub player: Player,
    pub spawner: EnemySpawner,
    pub weapons: WeaponSystem,
    pub upgrades: UpgradeSystem,
    pub health_items: HealthItemManager,
    pub high_score: HighScore,
    /// Survival seconds frozen at game over
    pub final_score: Option<u64>,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
}

impl Game {
    /// Create a session on the title screen
    pub fn new(tuning: Tuning, bounds: Bounds, seed: u64, high_score: HighScore) -> Self {
        Self {
            player: Player::new(bounds.center(), &tuning),
            spawner: EnemySpawner::new(&tuning),
            weapons: WeaponSystem::new(&tuning),
            upgrades: UpgradeSystem::new(&tuning),
            health_items: HealthItemManager::new(&tuning),
            tuning,
            bounds,
            phase: GamePhase::Start,
            clock: SimClock::default(),
            now: 0.0,
            high_score,
            final_score: None,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Begin a fresh session at `wall` ms, discarding any previous one
    pub fn start(&mut self, wall: f64) {
        log::info!("Starting new session");
        self.player = Player::new(self.bounds.center(), &self.tuning);
        self.spawner = EnemySpawner::new(&self.tuning);
        self.weapons = WeaponSystem::new(&self.tuning);
        self.upgrades = UpgradeSystem::new(&self.tuning);
        self.health_items = HealthItemManager::new(&self.tuning);
        self.clock = SimClock::new(wall);
        self.now = 0.0;
        self.final_score = None;
        self.events.clear();
        self.phase = GamePhase::Playing;
    }

    /// Pause from `Playing`; ignored in other phases
    pub fn pause(&mut self, wall: f64) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            self.clock.pause(wall);
            log::info!("Paused at {:.0} ms", self.now);
        }
    }

    /// Resume from `Paused`. The clock stays frozen if the upgrade menu is still open.
    pub fn resume(&mut self, wall: f64) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            if !self.is_upgrading() {
                self.clock.resume(wall);
            }
            log::info!("Resumed, {:.0} ms paused in total", self.clock.total_paused());
        }
    }

    pub fn toggle_pause(&mut self, wall: f64) {
        match self.phase {
            GamePhase::Playing => self.pause(wall),
            GamePhase::Paused => self.resume(wall),
            _ => {}
        }
    }

    /// True while the level-up menu holds the simulation
    pub fn is_upgrading(&self) -> bool {
        self.upgrades.state() == UpgradeState::LevelingUp
    }

    /// Canvas resized: adopt new bounds and recenter the player
    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Bounds::new(width, height);
        self.player.pos = self.bounds.center();
    }

    /// Simulation ms since the session started
    pub fn elapsed_ms(&self) -> f64 {
        self.now.max(0.0)
    }

    /// Whole seconds survived (frozen after game over)
    pub fn survival_secs(&self) -> u64 {
        self.final_score
            .unwrap_or_else(|| (self.elapsed_ms() / 1000.0).floor() as u64)
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            upgrading: self.is_upgrading(),
            lives: self.player.lives,
            max_lives: self.player.max_lives,
            level: self.upgrades.level(),
            experience: self.upgrades.experience(),
            exp_to_next_level: self.upgrades.exp_to_next_level(),
            unspent_upgrades: self.upgrades.unspent(),
            survival_secs: self.survival_secs(),
            wave: self.spawner.wave(),
            enemy_count: self.spawner.enemies.len(),
            high_score: self.high_score.best,
            upgrade_menu: if self.is_upgrading() {
                self.upgrades.menu(&self.weapons)
            } else {
                Vec::new()
            },
        }
    }
}
