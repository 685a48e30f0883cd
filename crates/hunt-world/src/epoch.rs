//! An epoch: generations linked by reproduction.

use crate::context::SimulationContext;
use crate::generation::Generation;
use hunt_core::{EpochId, EpochReport, Error, Result};
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct Epoch {
    id: EpochId,
    initial_size: usize,
    target_iterations: usize,
    generations: Vec<Generation>,
    population_collapse: bool,
    simulation_has_run: bool,
}

impl Epoch {
    pub fn new(ctx: &mut SimulationContext, initial_size: usize, target_iterations: usize) -> Self {
        Self {
            id: ctx.next_epoch_id(),
            initial_size,
            target_iterations,
            generations: Vec::new(),
            population_collapse: false,
            simulation_has_run: false,
        }
    }

    /// Sized from the context's configuration
    pub fn from_config(ctx: &mut SimulationContext) -> Self {
        let initial_size = ctx.config().initial_size;
        let target_iterations = ctx.config().target_iterations;
        Self::new(ctx, initial_size, target_iterations)
    }

    pub fn id(&self) -> EpochId {
        self.id
    }

    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    pub fn population_collapse(&self) -> bool {
        self.population_collapse
    }

    /// Seed generation zero, then simulate and breed until the target count
    /// is reached, simulating the newest generation last. Stops early when a
    /// bred generation is missing either role.
    #[instrument(skip(self, ctx), fields(epoch = %self.id, initial_size = self.initial_size, target = self.target_iterations))]
    pub fn simulate(&mut self, ctx: &mut SimulationContext) -> Result<EpochReport> {
        if self.simulation_has_run {
            return Err(Error::InvalidState(format!(
                "{} has already been simulated",
                self.id
            )));
        }

        self.generations.push(Generation::seeded(ctx, self.initial_size));

        while self.generations.len() < self.target_iterations {
            let current = self.generations.len() - 1;
            self.generations[current].simulate_generation(ctx)?;

            let next = self.generations[current].reproduce(ctx);
            let collapsed = next.is_collapsed();
            self.generations.push(next);

            if collapsed {
                self.population_collapse = true;
                self.simulation_has_run = true;
                warn!(
                    event = "population_collapse",
                    epoch = %self.id,
                    generations = self.generations.len(),
                    "population collapsed, terminating epoch"
                );
                return Ok(self.report());
            }
        }

        let newest = self.generations.len() - 1;
        self.generations[newest].simulate_generation(ctx)?;
        self.simulation_has_run = true;

        info!(
            event = "epoch_complete",
            epoch = %self.id,
            generations = self.generations.len(),
            "epoch simulated"
        );
        Ok(self.report())
    }

    pub fn report(&self) -> EpochReport {
        EpochReport {
            id: self.id,
            initial_size: self.initial_size,
            target_iterations: self.target_iterations,
            population_collapse: self.population_collapse,
            generations: self.generations.iter().map(Generation::report).collect(),
        }
    }
}
