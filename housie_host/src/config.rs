//! Host configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use housie::RoomConfig;
use std::time::Duration;

/// Complete host configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Room the host runs
    pub room: RoomConfig,
    /// Number of simulated players joining the room
    pub players: usize,
    /// Delay between simulated joins
    pub join_interval: Duration,
    /// Whether available prizes are claimed on the player's behalf
    pub auto_claim: bool,
}

impl HostConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `players_override` - Optional player count override (from CLI args)
    /// * `seed_override` - Optional RNG seed override (from CLI args)
    /// * `name_override` - Optional room name override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<HostConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_env(
        players_override: Option<usize>,
        seed_override: Option<u64>,
        name_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = RoomConfig::default();

        let name = name_override
            .or_else(|| std::env::var("HOUSIE_ROOM_NAME").ok())
            .unwrap_or(defaults.name);

        let seed = match seed_override {
            Some(seed) => Some(seed),
            None => parse_optional_env("HOUSIE_SEED")?,
        };

        let room = RoomConfig {
            name,
            capacity: parse_env_or("HOUSIE_CAPACITY", defaults.capacity),
            countdown_secs: parse_env_or("HOUSIE_COUNTDOWN_SECS", defaults.countdown_secs),
            auto_draw_secs: parse_env_or("HOUSIE_AUTO_DRAW_SECS", defaults.auto_draw_secs),
            auto_draw_on_start: parse_env_or(
                "HOUSIE_AUTO_DRAW_ON_START",
                defaults.auto_draw_on_start,
            ),
            seed,
        };

        let players = players_override.unwrap_or_else(|| parse_env_or("HOUSIE_PLAYERS", 5));

        Ok(HostConfig {
            room,
            players,
            join_interval: Duration::from_millis(parse_env_or("HOUSIE_JOIN_INTERVAL_MS", 500)),
            auto_claim: parse_env_or("HOUSIE_AUTO_CLAIM", true),
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.room.validate().map_err(|reason| ConfigError::Invalid {
            var: "room".to_string(),
            reason,
        })?;

        if self.players == 0 {
            return Err(ConfigError::Invalid {
                var: "HOUSIE_PLAYERS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.players > self.room.capacity {
            return Err(ConfigError::Invalid {
                var: "HOUSIE_PLAYERS".to_string(),
                reason: format!("Cannot exceed room capacity ({})", self.room.capacity),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Could not parse {var}={value}")]
    Unparsable { var: String, value: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Helper for variables where "unset" and "set to garbage" must differ
fn parse_optional_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Unparsable {
                var: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
