//! Read-only summaries of simulated generations and epochs.

use crate::attributes::Stats;
use crate::types::{EpochId, GenerationId};
use serde::{Deserialize, Serialize};

/// Mean derived stats of one role's living population
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfile {
    pub speed: i32,
    pub willpower: i32,
    pub perception: i32,
    pub stealth: i32,
    pub fortitude: i32,
    pub power: i32,
    pub virility: i32,
    pub hunger: i32,
}

impl RoleProfile {
    /// Truncated mean of each stat. `None` for an empty population.
    pub fn from_stats<'a>(stats: impl IntoIterator<Item = &'a Stats>) -> Option<Self> {
        let mut sum = RoleProfile::default();
        let mut n = 0;

        for s in stats {
            sum.speed += s.speed;
            sum.willpower += s.willpower;
            sum.perception += s.perception;
            sum.stealth += s.stealth;
            sum.fortitude += s.fortitude;
            sum.power += s.power;
            sum.virility += s.virility;
            sum.hunger += s.hunger;
            n += 1;
        }

        if n == 0 {
            return None;
        }

        Some(RoleProfile {
            speed: sum.speed / n,
            willpower: sum.willpower / n,
            perception: sum.perception / n,
            stealth: sum.stealth / n,
            fortitude: sum.fortitude / n,
            power: sum.power / n,
            virility: sum.virility / n,
            hunger: sum.hunger / n,
        })
    }
}

/// Counters of one generation, before and after its trial cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub id: GenerationId,
    pub simulation_has_run: bool,

    pub initial_predator_count: usize,
    pub initial_prey_count: usize,
    pub nonviable_predator_count: usize,
    pub nonviable_prey_count: usize,

    pub post_combat_predator_count: usize,
    pub post_combat_prey_count: usize,
    /// Percentage by which the larger role exceeds the smaller after combat
    pub post_combat_population_imbalance: f64,

    pub predator_hunger_death_count: usize,
    pub prey_hunger_death_count: usize,

    pub final_predator_count: usize,
    pub final_prey_count: usize,

    /// Only present once simulated and while both roles have members
    pub predator_profile: Option<RoleProfile>,
    pub prey_profile: Option<RoleProfile>,
}

impl GenerationReport {
    pub fn initial_total_count(&self) -> usize {
        self.initial_predator_count + self.initial_prey_count
    }

    pub fn nonviable_count(&self) -> usize {
        self.nonviable_predator_count + self.nonviable_prey_count
    }

    pub fn post_combat_total_count(&self) -> usize {
        self.post_combat_predator_count + self.post_combat_prey_count
    }

    pub fn hunger_death_count(&self) -> usize {
        self.predator_hunger_death_count + self.prey_hunger_death_count
    }

    pub fn final_total_count(&self) -> usize {
        self.final_predator_count + self.final_prey_count
    }

    /// True when the trial cycle left either role empty
    pub fn collapsed(&self) -> bool {
        self.simulation_has_run && (self.final_predator_count == 0 || self.final_prey_count == 0)
    }
}

/// Outcome of an epoch: one report per generation, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    pub id: EpochId,
    pub initial_size: usize,
    pub target_iterations: usize,
    pub population_collapse: bool,
    pub generations: Vec<GenerationReport>,
}

impl EpochReport {
    pub fn last(&self) -> Option<&GenerationReport> {
        self.generations.last()
    }
}
