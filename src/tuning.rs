//! Game balance tuning
//!
//! Loaded from a JSON file; any field left out keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(String),
}

/// Balance values read at run start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Run start ===
    pub starting_lives: u32,
    pub starting_max_lives: u32,
    pub starting_ammo: u32,

    // === Speed ===
    /// World scroll speed at level 1 (pixels per tick)
    pub base_game_speed: f32,
    /// Cap for the per-level speed ramp
    pub max_game_speed: f32,

    // === Spawning ===
    /// Spawn interval at level 1 (ticks)
    pub base_spawn_timer: f32,
    /// Lower bound for the spawn interval (ticks)
    pub min_spawn_timer: f32,
    /// Horizontal clearance required between spawns (pixels)
    pub min_spawn_distance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            starting_max_lives: 3,
            starting_ammo: 20,

            base_game_speed: 3.0,
            max_game_speed: 6.0,

            base_spawn_timer: 120.0,
            min_spawn_timer: 40.0,
            min_spawn_distance: 100.0,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TuningError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.starting_lives == 0 {
            return Err(TuningError::Invalid("starting_lives must be at least 1".into()));
        }
        if self.starting_max_lives < self.starting_lives {
            return Err(TuningError::Invalid(
                "starting_max_lives must not be below starting_lives".into(),
            ));
        }
        if !(self.base_game_speed > 0.0) || self.max_game_speed < self.base_game_speed {
            return Err(TuningError::Invalid(
                "game speed must be positive and below its cap".into(),
            ));
        }
        if !(self.min_spawn_timer > 0.0) || self.base_spawn_timer < self.min_spawn_timer {
            return Err(TuningError::Invalid(
                "spawn timers must be positive with base >= min".into(),
            ));
        }
        if self.min_spawn_distance < 0.0 {
            return Err(TuningError::Invalid("min_spawn_distance must be >= 0".into()));
        }
        Ok(())
    }
}
