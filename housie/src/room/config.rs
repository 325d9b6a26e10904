//! Room configuration models.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{
    SessionSettings,
    constants::{DEFAULT_AUTO_DRAW_INTERVAL, DEFAULT_CAPACITY, DEFAULT_COUNTDOWN},
};

/// Largest room a single host can run.
pub const MAX_CAPACITY: usize = 100;

/// Room configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Room name shown to players
    pub name: String,

    /// Maximum number of tickets dealt (default: 20)
    pub capacity: usize,

    /// Seconds between the first join and the automatic start (default: 60)
    pub countdown_secs: u64,

    /// Seconds between automatic draws (default: 5)
    pub auto_draw_secs: u64,

    /// Whether automatic calling switches on when the game starts
    pub auto_draw_on_start: bool,

    /// Fixed RNG seed for reproducible games
    pub seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: "Housie Party".to_string(),
            capacity: DEFAULT_CAPACITY,
            countdown_secs: DEFAULT_COUNTDOWN.as_secs(),
            auto_draw_secs: DEFAULT_AUTO_DRAW_INTERVAL.as_secs(),
            auto_draw_on_start: true,
            seed: None,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Room name must not be empty".to_string());
        }

        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(format!("Capacity must be between 1 and {MAX_CAPACITY}"));
        }

        if self.auto_draw_secs == 0 {
            return Err("Auto draw interval must be at least one second".to_string());
        }

        Ok(())
    }

    /// Session settings derived from this configuration
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            capacity: self.capacity,
            countdown: Duration::from_secs(self.countdown_secs),
            auto_draw_interval: Duration::from_secs(self.auto_draw_secs),
            auto_draw_on_start: self.auto_draw_on_start,
        }
    }

    /// RNG for the room's session, seeded when a seed is configured
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
