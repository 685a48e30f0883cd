//! Pairwise combat encounters.

use crate::organism::{Organism, TurnOutcome};
use hunt_core::{CombatConfig, OrganismId, Position};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// How an encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterOutcome {
    PreyKilled,
    PredatorKilled,
    /// Round cap reached: the prey got away and the predator starves
    Timeout,
}

/// Summary of one resolved encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encounter {
    pub predator: OrganismId,
    pub prey: OrganismId,
    pub rounds: u32,
    pub outcome: EncounterOutcome,
}

impl Encounter {
    pub fn survivor(&self) -> OrganismId {
        match self.outcome {
            EncounterOutcome::PreyKilled => self.predator,
            EncounterOutcome::PredatorKilled | EncounterOutcome::Timeout => self.prey,
        }
    }
}

/// Runs encounters between one predator and one prey at a time
#[derive(Debug, Clone)]
pub struct CombatEngine {
    config: CombatConfig,
}

impl CombatEngine {
    pub fn new(config: CombatConfig) -> Self {
        Self { config }
    }

    fn drop_point(&self, rng: &mut ChaCha8Rng) -> Position {
        let r = self.config.arena_radius;
        let x = rng.gen_range(-r..=r);
        let y = rng.gen_range(-r..=r);
        Position::new(x, y)
    }

    /// Fight until one side dies or the round cap is hit. Exactly one of the
    /// two is alive afterwards, and the survivor's fortitude is restored.
    pub fn resolve(
        &self,
        predator: &mut Organism,
        prey: &mut Organism,
        rng: &mut ChaCha8Rng,
    ) -> Encounter {
        let mut predator_location = self.drop_point(rng);
        let mut prey_location = self.drop_point(rng);
        let mut rounds = 0;

        let outcome = loop {
            rounds += 1;

            if let Some(victor) =
                take_turns(predator, prey, &mut predator_location, prey_location, rng)
            {
                break kill_outcome(predator, victor);
            }

            if let Some(victor) =
                take_turns(prey, predator, &mut prey_location, predator_location, rng)
            {
                break kill_outcome(predator, victor);
            }

            if rounds >= self.config.round_cap {
                predator.kill();
                break EncounterOutcome::Timeout;
            }
        };

        match outcome {
            EncounterOutcome::PreyKilled => predator.reset_fort(),
            EncounterOutcome::PredatorKilled | EncounterOutcome::Timeout => prey.reset_fort(),
        }

        let encounter = Encounter {
            predator: predator.id(),
            prey: prey.id(),
            rounds,
            outcome,
        };
        debug!(
            predator = %encounter.predator,
            prey = %encounter.prey,
            rounds,
            outcome = ?outcome,
            "encounter resolved"
        );
        encounter
    }
}

/// Spend all of `actor`'s turns for this round. Stops at the first kill.
fn take_turns(
    actor: &mut Organism,
    target: &mut Organism,
    actor_location: &mut Position,
    target_location: Position,
    rng: &mut ChaCha8Rng,
) -> Option<OrganismId> {
    for _ in 0..actor.turns_per_round() {
        match actor.take_combat_turn(target, *actor_location, target_location, rng) {
            TurnOutcome::Moved(to) => *actor_location = to,
            TurnOutcome::Killed { victor } => return Some(victor),
        }
    }
    None
}

fn kill_outcome(predator: &Organism, victor: OrganismId) -> EncounterOutcome {
    if victor == predator.id() {
        EncounterOutcome::PreyKilled
    } else {
        EncounterOutcome::PredatorKilled
    }
}
