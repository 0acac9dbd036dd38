//! Experience, leveling and the upgrade menu
//!
//! ```text
//! Accumulating --(experience >= threshold)--> LevelingUp --(last point spent)--> Accumulating
//! ```
//!
//! While `LevelingUp` the session holds its clock, so no simulation time passes.

use serde::{Deserialize, Serialize};

use super::weapon::WeaponSystem;
use crate::consts::MAX_UPGRADE_LEVEL;
use crate::error::SimError;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    FrontShot,
    BackShot,
    Piercing,
    Explosion,
}

impl UpgradeKind {
    /// Menu order
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::FrontShot,
        UpgradeKind::BackShot,
        UpgradeKind::Piercing,
        UpgradeKind::Explosion,
    ];

    fn index(self) -> usize {
        match self {
            UpgradeKind::FrontShot => 0,
            UpgradeKind::BackShot => 1,
            UpgradeKind::Piercing => 2,
            UpgradeKind::Explosion => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            UpgradeKind::FrontShot => "Forward Shot",
            UpgradeKind::BackShot => "Backward Shot",
            UpgradeKind::Piercing => "Piercing Shot",
            UpgradeKind::Explosion => "Explosive Shot",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            UpgradeKind::FrontShot => "Add one more forward projectile",
            UpgradeKind::BackShot => "Add one more backward projectile",
            UpgradeKind::Piercing => "Projectiles pierce through one more enemy",
            UpgradeKind::Explosion => "Projectiles explode on impact, bigger blast per level",
        }
    }

    /// Maximum level for this kind
    pub fn cap(self) -> u8 {
        MAX_UPGRADE_LEVEL
    }

    /// Apply one level of this upgrade to the weapon
    pub fn apply(self, weapons: &mut WeaponSystem) {
        match self {
            UpgradeKind::FrontShot => weapons.front_projectiles += 1,
            UpgradeKind::BackShot => weapons.back_projectiles += 1,
            UpgradeKind::Piercing => weapons.piercing += 1,
            UpgradeKind::Explosion => weapons.explosion_level += 1,
        }
    }

    /// Human-readable current stat for the menu
    pub fn current_effect(self, weapons: &WeaponSystem) -> String {
        match self {
            UpgradeKind::FrontShot => format!("Current: {} projectiles", weapons.front_projectiles),
            UpgradeKind::BackShot => format!("Current: {} projectiles", weapons.back_projectiles),
            UpgradeKind::Piercing => format!("Current: Pierce {} enemies", weapons.piercing),
            UpgradeKind::Explosion if weapons.explosion_level == 0 => {
                "Current: no explosion".to_string()
            }
            UpgradeKind::Explosion => format!(
                "Current: {:.0} AOE radius",
                weapons.current_explosion_radius()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeState {
    Accumulating,
    LevelingUp,
}

/// One entry of the level-up menu
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeOption {
    pub kind: UpgradeKind,
    pub title: &'static str,
    pub description: &'static str,
    pub current_effect: String,
    pub level: u8,
    pub max_level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeSystem {
    experience: u32,
    level: u32,
    exp_to_next_level: u32,
    unspent: u32,
    levels: [u8; 4],
    growth: f32,
    state: UpgradeState,
}

impl UpgradeSystem {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            experience: 0,
            level: 1,
            exp_to_next_level: tuning.exp_to_first_level,
            unspent: 0,
            levels: [0; 4],
            growth: tuning.exp_growth,
            state: UpgradeState::Accumulating,
        }
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn exp_to_next_level(&self) -> u32 {
        self.exp_to_next_level
    }

    pub fn unspent(&self) -> u32 {
        self.unspent
    }

    pub fn state(&self) -> UpgradeState {
        self.state
    }

    pub fn level_of(&self, kind: UpgradeKind) -> u8 {
        self.levels[kind.index()]
    }

    /// Kinds still below their cap
    pub fn available(&self) -> impl Iterator<Item = UpgradeKind> + '_ {
        UpgradeKind::ALL
            .into_iter()
            .filter(|kind| self.level_of(*kind) < kind.cap())
    }

    /// Grant experience, level up as many times as it covers. Returns the levels gained.
    ///
    /// The menu opens at most once per grant, and only if something can still be upgraded.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);

        let mut gained = 0;
        while self.experience >= self.exp_to_next_level {
            self.experience -= self.exp_to_next_level;
            self.exp_to_next_level =
                ((self.exp_to_next_level as f32 * self.growth).floor() as u32).max(1);
            self.level += 1;
            self.unspent += 1;
            gained += 1;
        }

        if gained > 0 {
            log::info!(
                "Level {} reached ({} unspent upgrades, next at {} XP)",
                self.level,
                self.unspent,
                self.exp_to_next_level
            );
            if self.available().next().is_some() {
                self.state = UpgradeState::LevelingUp;
            }
        }
        gained
    }

    /// Leave the level-up menu without spending. Unspent points stay banked.
    pub fn close_menu(&mut self) {
        if self.state == UpgradeState::LevelingUp {
            log::debug!("Level-up menu closed with {} unspent", self.unspent);
        }
        self.state = UpgradeState::Accumulating;
    }

    /// Menu entries for every kind still below its cap
    pub fn menu(&self, weapons: &WeaponSystem) -> Vec<UpgradeOption> {
        self.available()
            .map(|kind| UpgradeOption {
                kind,
                title: kind.title(),
                description: kind.description(),
                current_effect: kind.current_effect(weapons),
                level: self.level_of(kind),
                max_level: kind.cap(),
            })
            .collect()
    }

    /// Spend one point on `kind` and apply it to `weapons`
    ///
    /// Stays in `LevelingUp` while points remain and something is still selectable.
    pub fn select(&mut self, kind: UpgradeKind, weapons: &mut WeaponSystem) -> Result<(), SimError> {
        if self.state != UpgradeState::LevelingUp {
            return Err(SimError::NotLevelingUp);
        }
        if self.unspent == 0 {
            return Err(SimError::NoUpgradePoints);
        }
        if self.level_of(kind) >= kind.cap() {
            return Err(SimError::UpgradeMaxed { kind });
        }

        self.levels[kind.index()] += 1;
        self.unspent -= 1;
        kind.apply(weapons);
        log::info!("Upgraded {} to level {}", kind.title(), self.level_of(kind));

        if self.unspent == 0 || self.available().next().is_none() {
            self.state = UpgradeState::Accumulating;
        }
        Ok(())
    }
}
