//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Combat encounter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Organisms are dropped at random in `[-arena_radius, arena_radius]` on each axis
    pub arena_radius: i32,
    /// Rounds after which a still-running encounter is ruled a timeout
    pub round_cap: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            arena_radius: 10,
            round_cap: 1000,
        }
    }
}

/// Population-level parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Imbalance reported when one role has no survivors after combat
    pub imbalance_sentinel: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            imbalance_sentinel: 9999.0,
        }
    }
}

/// Top-level run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Size of generation zero
    pub initial_size: usize,
    /// Number of generations in the epoch
    pub target_iterations: usize,
    /// Random seed for reproducibility; `None` seeds from entropy
    pub seed: Option<u64>,
    pub combat: CombatConfig,
    pub population: PopulationConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_size: 20,
            target_iterations: 3,
            seed: None,
            combat: CombatConfig::default(),
            population: PopulationConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_size == 0 {
            return Err(Error::Validation("initial_size must be positive".to_string()));
        }
        if self.target_iterations == 0 {
            return Err(Error::Validation(
                "target_iterations must be positive".to_string(),
            ));
        }
        if self.combat.arena_radius < 0 {
            return Err(Error::Validation(format!(
                "arena_radius must not be negative, got {}",
                self.combat.arena_radius
            )));
        }
        if self.combat.round_cap == 0 {
            return Err(Error::Validation("round_cap must be positive".to_string()));
        }
        Ok(())
    }
}
