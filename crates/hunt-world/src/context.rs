//! Per-run simulation state: random source, identity counters and configuration.

use hunt_core::{EpochId, GenerationId, OrganismId, Role, SimulationConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Owns everything that is shared across one simulation run.
///
/// Every organism, generation and epoch of a run is built through the same
/// context, so identities are unique and monotonic within the run while two
/// runs never share a sequence.
#[derive(Debug)]
pub struct SimulationContext {
    config: SimulationConfig,
    rng: ChaCha8Rng,
    next_organism: u64,
    next_generation: u64,
    next_epoch: u64,
    seeded_predators: u64,
    seeded_prey: u64,
}

impl SimulationContext {
    /// Seed from `config.seed`, or from entropy when no seed is configured.
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            config,
            rng,
            next_organism: 0,
            next_generation: 0,
            next_epoch: 0,
            seeded_predators: 0,
            seeded_prey: 0,
        }
    }

    /// Default configuration with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(SimulationConfig {
            seed: Some(seed),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub(crate) fn next_organism_id(&mut self) -> OrganismId {
        let id = OrganismId(self.next_organism);
        self.next_organism += 1;
        id
    }

    pub(crate) fn next_generation_id(&mut self) -> GenerationId {
        let id = GenerationId(self.next_generation);
        self.next_generation += 1;
        id
    }

    pub(crate) fn next_epoch_id(&mut self) -> EpochId {
        let id = EpochId(self.next_epoch);
        self.next_epoch += 1;
        id
    }

    pub(crate) fn record_seeded(&mut self, role: Role) {
        match role {
            Role::Predator => self.seeded_predators += 1,
            Role::Prey => self.seeded_prey += 1,
        }
    }

    /// Number of organisms issued so far
    pub fn organisms_created(&self) -> u64 {
        self.next_organism
    }

    /// Generation-zero organisms rolled as predators, viable or not
    pub fn seeded_predators(&self) -> u64 {
        self.seeded_predators
    }

    /// Generation-zero organisms rolled as prey, viable or not
    pub fn seeded_prey(&self) -> u64 {
        self.seeded_prey
    }
}
