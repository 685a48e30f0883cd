//! A generation: one cohort of predators and prey going through combat,
//! starvation and reproduction.

use crate::combat::{CombatEngine, Encounter};
use crate::context::SimulationContext;
use crate::organism::Organism;
use hunt_core::{
    Error, GenerationId, GenerationReport, OrganismId, Result, Role, RoleProfile,
};
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Combat matchups for one generation plus the organisms left without one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialPairings {
    /// `(predator, prey)` pairs
    pub pairings: Vec<(OrganismId, OrganismId)>,
    pub leftovers: Vec<OrganismId>,
    pub leftover_role: Role,
}

/// Percentage by which the larger population exceeds the smaller, or
/// `sentinel` when either is empty.
pub fn population_imbalance(predators: usize, prey: usize, sentinel: f64) -> f64 {
    let (small, large) = if predators <= prey {
        (predators, prey)
    } else {
        (prey, predators)
    };

    if small == 0 {
        return sentinel;
    }

    (large as f64 / small as f64) * 100.0 - 100.0
}

#[derive(Debug)]
pub struct Generation {
    id: GenerationId,
    predators: Vec<Organism>,
    prey: Vec<Organism>,

    initial_predator_count: usize,
    initial_prey_count: usize,
    nonviable_predator_count: usize,
    nonviable_prey_count: usize,

    simulation_has_run: bool,
    post_combat_predator_count: usize,
    post_combat_prey_count: usize,
    post_combat_population_imbalance: f64,
    predator_hunger_death_count: usize,
    prey_hunger_death_count: usize,
    final_predator_count: usize,
    final_prey_count: usize,
}

impl Generation {
    /// Generation zero: `n` freshly rolled organisms, minus the nonviable ones.
    pub fn seeded(ctx: &mut SimulationContext, n: usize) -> Self {
        let id = ctx.next_generation_id();
        let organisms: Vec<Organism> = (0..n).map(|_| Organism::seeded(ctx)).collect();
        Self::assemble(id, organisms)
    }

    /// Build a generation from already constructed organisms. Nonviable ones
    /// are counted and dropped.
    pub fn from_organisms(
        ctx: &mut SimulationContext,
        organisms: impl IntoIterator<Item = Organism>,
    ) -> Self {
        let id = ctx.next_generation_id();
        Self::assemble(id, organisms)
    }

    /// Breed the next generation from the survivors of the previous one.
    ///
    /// Each ancestor seeks `virility / 12` distinct mates among the other
    /// ancestors of its role. If there are not enough of them it breeds with
    /// nobody. Every pairing yields one offspring of the ancestor's role.
    pub fn from_ancestors<'a>(
        ctx: &mut SimulationContext,
        ancestors: impl IntoIterator<Item = &'a Organism>,
    ) -> Self {
        let id = ctx.next_generation_id();
        let ancestors: Vec<&Organism> = ancestors.into_iter().collect();
        let mut offspring = Vec::new();
        let mut unmatched = 0;

        for (index, &ancestor) in ancestors.iter().enumerate() {
            let wanted = ancestor.mate_count();
            if wanted == 0 {
                continue;
            }

            let pool: Vec<&Organism> = ancestors
                .iter()
                .enumerate()
                .filter(|&(other, m)| other != index && m.role() == ancestor.role())
                .map(|(_, &m)| m)
                .collect();

            if wanted > pool.len() {
                unmatched += 1;
                continue;
            }

            let picks = rand::seq::index::sample(ctx.rng(), pool.len(), wanted);
            for pick in picks.iter() {
                offspring.push(Organism::bred(ctx, ancestor, pool[pick]));
            }
        }

        let generation = Self::assemble(id, offspring);
        info!(
            event = "reproduction",
            generation = %id,
            ancestors = ancestors.len(),
            unmatched_ancestors = unmatched,
            predators = generation.initial_predator_count,
            prey = generation.initial_prey_count,
            nonviable = generation.nonviable_predator_count + generation.nonviable_prey_count,
            "next generation bred"
        );
        generation
    }

    fn assemble(id: GenerationId, organisms: impl IntoIterator<Item = Organism>) -> Self {
        let mut predators = Vec::new();
        let mut prey = Vec::new();
        let mut nonviable_predator_count = 0;
        let mut nonviable_prey_count = 0;

        for organism in organisms {
            match (organism.is_viable(), organism.role()) {
                (true, Role::Predator) => predators.push(organism),
                (true, Role::Prey) => prey.push(organism),
                (false, Role::Predator) => nonviable_predator_count += 1,
                (false, Role::Prey) => nonviable_prey_count += 1,
            }
        }

        Self {
            id,
            initial_predator_count: predators.len(),
            initial_prey_count: prey.len(),
            predators,
            prey,
            nonviable_predator_count,
            nonviable_prey_count,
            simulation_has_run: false,
            post_combat_predator_count: 0,
            post_combat_prey_count: 0,
            post_combat_population_imbalance: 0.0,
            predator_hunger_death_count: 0,
            prey_hunger_death_count: 0,
            final_predator_count: 0,
            final_prey_count: 0,
        }
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    pub fn predators(&self) -> &[Organism] {
        &self.predators
    }

    pub fn prey(&self) -> &[Organism] {
        &self.prey
    }

    pub fn living(&self, role: Role) -> &[Organism] {
        match role {
            Role::Predator => &self.predators,
            Role::Prey => &self.prey,
        }
    }

    pub fn simulation_has_run(&self) -> bool {
        self.simulation_has_run
    }

    pub fn post_combat_population_imbalance(&self) -> f64 {
        self.post_combat_population_imbalance
    }

    /// Either role has no living members
    pub fn is_collapsed(&self) -> bool {
        self.predators.is_empty() || self.prey.is_empty()
    }

    /// Match every member of the smaller role with a random member of the
    /// larger one. On a tie predators stay in order and prey are shuffled.
    pub fn generate_trial_pairings(&self, ctx: &mut SimulationContext) -> TrialPairings {
        let predator_ids: Vec<OrganismId> = self.predators.iter().map(Organism::id).collect();
        let prey_ids: Vec<OrganismId> = self.prey.iter().map(Organism::id).collect();

        let (fixed, mut shuffled, leftover_role) = if predator_ids.len() > prey_ids.len() {
            (prey_ids, predator_ids, Role::Predator)
        } else {
            (predator_ids, prey_ids, Role::Prey)
        };

        shuffled.shuffle(ctx.rng());
        let leftovers = shuffled.split_off(fixed.len());

        let pairings = match leftover_role {
            Role::Predator => shuffled.into_iter().zip(fixed).collect(),
            Role::Prey => fixed.into_iter().zip(shuffled).collect(),
        };

        TrialPairings {
            pairings,
            leftovers,
            leftover_role,
        }
    }

    /// Fight out every pairing, drop the dead, and record the post-combat
    /// counts and imbalance. Leftovers take no part and survive.
    pub fn run_combat_trials(
        &mut self,
        ctx: &mut SimulationContext,
        pairings: &TrialPairings,
    ) -> Result<Vec<Encounter>> {
        let engine = CombatEngine::new(ctx.config().combat.clone());
        let sentinel = ctx.config().population.imbalance_sentinel;

        let predator_index = index_by_id(&self.predators);
        let prey_index = index_by_id(&self.prey);

        let mut encounters = Vec::with_capacity(pairings.pairings.len());
        for &(predator_id, prey_id) in &pairings.pairings {
            let (Some(&p), Some(&q)) = (predator_index.get(&predator_id), prey_index.get(&prey_id))
            else {
                return Err(Error::InvalidState(format!(
                    "pairing ({predator_id}, {prey_id}) does not match the living population of {}",
                    self.id
                )));
            };

            let predator = &mut self.predators[p];
            let prey = &mut self.prey[q];
            if !predator.is_alive() || !prey.is_alive() {
                return Err(Error::InvalidState(format!(
                    "organism paired twice in {}: ({predator_id}, {prey_id})",
                    self.id
                )));
            }

            encounters.push(engine.resolve(predator, prey, ctx.rng()));
        }

        self.predators.retain(Organism::is_alive);
        self.prey.retain(Organism::is_alive);
        self.post_combat_predator_count = self.predators.len();
        self.post_combat_prey_count = self.prey.len();
        self.post_combat_population_imbalance =
            population_imbalance(self.predators.len(), self.prey.len(), sentinel);

        Ok(encounters)
    }

    /// Leftovers whose tolerance `100 - hunger` is below the post-combat
    /// imbalance starve. Returns the number of deaths.
    pub fn run_hunger_trials(&mut self, leftovers: &[OrganismId], leftover_role: Role) -> usize {
        let imbalance = self.post_combat_population_imbalance;
        let leftovers: HashSet<OrganismId> = leftovers.iter().copied().collect();

        let population = match leftover_role {
            Role::Predator => &mut self.predators,
            Role::Prey => &mut self.prey,
        };

        let before = population.len();
        population.retain_mut(|organism| {
            if !leftovers.contains(&organism.id()) {
                return true;
            }
            let tolerance = 100 - organism.hunger();
            if f64::from(tolerance) < imbalance {
                organism.kill();
                debug!(
                    organism = %organism.id(),
                    role = %leftover_role,
                    hunger = organism.hunger(),
                    imbalance,
                    "starved"
                );
                false
            } else {
                true
            }
        });
        let deaths = before - population.len();

        match leftover_role {
            Role::Predator => self.predator_hunger_death_count += deaths,
            Role::Prey => self.prey_hunger_death_count += deaths,
        }
        deaths
    }

    /// Pairing, combat and starvation, in that order. A generation can only
    /// be simulated once.
    #[instrument(skip(self, ctx), fields(generation = %self.id))]
    pub fn simulate_generation(&mut self, ctx: &mut SimulationContext) -> Result<GenerationReport> {
        if self.simulation_has_run {
            return Err(Error::InvalidState(format!(
                "{} has already been simulated",
                self.id
            )));
        }

        let pairings = self.generate_trial_pairings(ctx);
        let encounters = self.run_combat_trials(ctx, &pairings)?;
        let starved = self.run_hunger_trials(&pairings.leftovers, pairings.leftover_role);

        self.final_predator_count = self.predators.len();
        self.final_prey_count = self.prey.len();
        self.simulation_has_run = true;

        info!(
            event = "generation_simulated",
            generation = %self.id,
            initial_predators = self.initial_predator_count,
            initial_prey = self.initial_prey_count,
            encounters = encounters.len(),
            leftovers = pairings.leftovers.len(),
            leftover_role = %pairings.leftover_role,
            imbalance = self.post_combat_population_imbalance,
            starved,
            final_predators = self.final_predator_count,
            final_prey = self.final_prey_count,
            "generation trials complete"
        );

        Ok(self.report())
    }

    /// The next generation, bred from everyone still alive here.
    pub fn reproduce(&self, ctx: &mut SimulationContext) -> Generation {
        Generation::from_ancestors(ctx, self.predators.iter().chain(self.prey.iter()))
    }

    pub fn report(&self) -> GenerationReport {
        let profiles = self.simulation_has_run && !self.is_collapsed();
        let profile = |organisms: &[Organism]| {
            if profiles {
                RoleProfile::from_stats(organisms.iter().map(Organism::stats))
            } else {
                None
            }
        };

        GenerationReport {
            id: self.id,
            simulation_has_run: self.simulation_has_run,
            initial_predator_count: self.initial_predator_count,
            initial_prey_count: self.initial_prey_count,
            nonviable_predator_count: self.nonviable_predator_count,
            nonviable_prey_count: self.nonviable_prey_count,
            post_combat_predator_count: self.post_combat_predator_count,
            post_combat_prey_count: self.post_combat_prey_count,
            post_combat_population_imbalance: self.post_combat_population_imbalance,
            predator_hunger_death_count: self.predator_hunger_death_count,
            prey_hunger_death_count: self.prey_hunger_death_count,
            final_predator_count: self.final_predator_count,
            final_prey_count: self.final_prey_count,
            predator_profile: profile(self.predators.as_slice()),
            prey_profile: profile(self.prey.as_slice()),
        }
    }
}

fn index_by_id(organisms: &[Organism]) -> HashMap<OrganismId, usize> {
    organisms
        .iter()
        .enumerate()
        .map(|(i, o)| (o.id(), i))
        .collect()
}
