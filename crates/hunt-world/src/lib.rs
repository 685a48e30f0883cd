//! Predator/prey hunt simulation.
//!
//! Organisms fight in pairwise encounters, survivors that never fought face
//! starvation, and whoever is left breeds the next generation.

pub mod combat;
pub mod context;
pub mod epoch;
pub mod generation;
pub mod organism;

pub use combat::{CombatEngine, Encounter, EncounterOutcome};
pub use context::SimulationContext;
pub use epoch::Epoch;
pub use generation::{population_imbalance, Generation, TrialPairings};
pub use organism::{Heading, Organism, TurnOutcome};
