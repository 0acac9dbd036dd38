//! Simulation error types
//!
//! Nothing here is fatal to a running session. Callers inside the frame loop log the error and
//! carry on with the rest of the tick.

use std::fmt;

use crate::sim::UpgradeKind;

#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Explosion radius was non-finite or not positive
    InvalidExplosion { radius: f32 },

    /// A tuning value is outside its usable range
    InvalidTuning {
        field: &'static str,
        reason: &'static str,
    },

    /// Tuning JSON could not be parsed
    TuningParse(String),

    /// Upgrade selected while the menu is closed
    NotLevelingUp,

    /// Upgrade selected with no unspent points
    NoUpgradePoints,

    /// Upgrade kind is already at its cap
    UpgradeMaxed { kind: UpgradeKind },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidExplosion { radius } => {
                write!(f, "invalid explosion radius {}", radius)
            }
            SimError::InvalidTuning { field, reason } => {
                write!(f, "invalid tuning value '{}': {}", field, reason)
            }
            SimError::TuningParse(msg) => write!(f, "failed to parse tuning: {}", msg),
            SimError::NotLevelingUp => write!(f, "no level-up in progress"),
            SimError::NoUpgradePoints => write!(f, "no unspent upgrade points"),
            SimError::UpgradeMaxed { kind } => {
                write!(f, "{} is already at its maximum level", kind.title())
            }
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::TuningParse(err.to_string())
    }
}
