//! Real-time simulation module
//!
//! All gameplay logic lives here:
//! - One logical tick per rendered frame, motion in units per tick
//! - Timers compare absolute simulation time, never count down
//! - Per-entity bookkeeping keyed by stable `EntityId`, never by index
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod health;
pub mod player;
pub mod state;
pub mod tick;
pub mod upgrade;
pub mod weapon;

pub use enemy::{Enemy, EnemySpawner};
pub use health::{HealthItem, HealthItemManager};
pub use player::{DashState, Player};
pub use state::{Bounds, EntityId, Game, GameEvent, GamePhase, SimClock, Snapshot};
pub use tick::{TickInput, tick};
pub use upgrade::{UpgradeKind, UpgradeOption, UpgradeState, UpgradeSystem};
pub use weapon::{Explosion, FIRE_COLORS, Kill, Particle, Projectile, WeaponSystem};
