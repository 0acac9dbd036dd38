//! Best survival time
//!
//! A single scalar persisted to LocalStorage under a fixed key.

use serde::{Deserialize, Serialize};

use crate::consts::HIGH_SCORE_KEY;

/// Best survival time in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Keep `score` if it beats the current best. Returns true on a new record.
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Parse a stored value; anything unreadable counts as no record
    pub fn parse(stored: &str) -> Self {
        match stored.trim().parse::<u64>() {
            Ok(best) => Self { best },
            Err(_) => {
                log::warn!("Ignoring unreadable high score {:?}", stored);
                Self::default()
            }
        }
    }

    /// Load the high score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(value)) = storage.get_item(HIGH_SCORE_KEY) {
                let score = Self::parse(&value);
                log::info!("Loaded high score {}", score.best);
                return score;
            }
        }

        log::info!("No high score found, starting fresh");
        Self::default()
    }

    /// Save the high score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(HIGH_SCORE_KEY, &self.best.to_string());
            log::info!("High score saved ({})", self.best);
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No persistent storage for '{}' on native", HIGH_SCORE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
