//! Organism state and per-turn combat behavior.

use crate::context::SimulationContext;
use hunt_core::attributes::{base_fortitude, scaled, MAX_SEED_GENE};
use hunt_core::{derive_stats, Genes, OrganismId, Position, Role, Stats};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Where an organism is trying to go on its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Wander,
    Approach(Position),
    Retreat(Position),
}

impl Heading {
    /// Predators close in on what they sense, prey run from it.
    fn on_sensing(role: Role, target: Position) -> Heading {
        match role {
            Role::Predator => Heading::Approach(target),
            Role::Prey => Heading::Retreat(target),
        }
    }
}

/// Result of one combat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The acting organism is now at this position
    Moved(Position),
    /// A clash ended in a kill; `victor` is whichever side survived
    Killed { victor: OrganismId },
}

fn d20(rng: &mut ChaCha8Rng) -> i32 {
    rng.gen_range(1..=20)
}

fn d5(rng: &mut ChaCha8Rng) -> i32 {
    rng.gen_range(1..=5)
}

/// An organism in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    id: OrganismId,
    role: Role,
    genes: Genes,
    stats: Stats,
    viable: bool,
    alive: bool,
}

impl Organism {
    /// Generation-zero organism: every gene uniform in `[0, 100]`, role a coin flip.
    pub fn seeded(ctx: &mut SimulationContext) -> Self {
        let rng = ctx.rng();
        let genes = Genes::from_fn(|_| rng.gen_range(0..=MAX_SEED_GENE));
        let role = if rng.gen_range(0..2) == 1 {
            Role::Predator
        } else {
            Role::Prey
        };

        ctx.record_seeded(role);
        Self::with_genes(ctx, role, genes)
    }

    /// Offspring of `parent` and `mate`. Each gene is drawn from the range
    /// spanned by the parents' *derived* values; the role follows `parent`.
    pub fn bred(ctx: &mut SimulationContext, parent: &Organism, mate: &Organism) -> Self {
        let rng = ctx.rng();
        let genes = Genes::from_fn(|attribute| {
            let a = parent.stats.get(attribute);
            let b = mate.stats.get(attribute);
            rng.gen_range(a.min(b)..=a.max(b))
        });

        Self::with_genes(ctx, parent.role, genes)
    }

    pub fn with_genes(ctx: &mut SimulationContext, role: Role, genes: Genes) -> Self {
        let stats = derive_stats(&genes);
        let viable = stats.is_viable();

        Self {
            id: ctx.next_organism_id(),
            role,
            genes,
            stats,
            viable,
            alive: viable,
        }
    }

    pub fn id(&self) -> OrganismId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn genes(&self) -> &Genes {
        &self.genes
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn is_viable(&self) -> bool {
        self.viable
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Current fortitude, lowered by damage during an encounter
    pub fn fortitude(&self) -> i32 {
        self.stats.fortitude
    }

    pub fn hunger(&self) -> i32 {
        self.stats.hunger
    }

    /// How many same-role partners this organism seeks when breeding
    pub fn mate_count(&self) -> usize {
        usize::try_from(self.stats.virility / 12).unwrap_or(0)
    }

    /// Turns taken per combat round
    pub fn turns_per_round(&self) -> u32 {
        u32::try_from(scaled(self.stats.speed, 0.15)).unwrap_or(0) + 1
    }

    /// Heal back to the undamaged fortitude implied by the genes.
    pub fn reset_fort(&mut self) {
        self.stats.fortitude = base_fortitude(&self.genes);
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }

    /// Move one step. Each axis moves independently, so closing diagonally is
    /// as fast as closing straight.
    pub fn step(&self, location: Position, heading: Heading, rng: &mut ChaCha8Rng) -> Position {
        match heading {
            Heading::Wander => {
                let dx = rng.gen_range(-1..=1);
                let dy = rng.gen_range(-1..=1);
                location.add(dx, dy)
            }
            Heading::Approach(target) => location.add(
                (target.x - location.x).signum(),
                (target.y - location.y).signum(),
            ),
            Heading::Retreat(target) => {
                let dx = match (location.x - target.x).signum() {
                    0 => rng.gen_range(-1..=1),
                    away => away,
                };
                let dy = match (location.y - target.y).signum() {
                    0 => rng.gen_range(-1..=1),
                    away => away,
                };
                location.add(dx, dy)
            }
        }
    }

    /// Perception check against `other`'s stealth; out of range is a miss.
    /// Ties go to the one hiding.
    pub fn sense_other(
        &self,
        other: &Organism,
        self_location: Position,
        other_location: Position,
        rng: &mut ChaCha8Rng,
    ) -> bool {
        let range = f64::from(self.stats.perception) * 0.5;
        if self_location.distance(&other_location) > range {
            return false;
        }

        self.stats.perception + d20(rng) > other.stats.stealth + d20(rng)
    }

    /// One ply of an encounter with `other`.
    pub fn take_combat_turn(
        &mut self,
        other: &mut Organism,
        self_location: Position,
        other_location: Position,
        rng: &mut ChaCha8Rng,
    ) -> TurnOutcome {
        if self_location == other_location {
            return self.clash(other, self_location, rng);
        }

        let heading = if self.sense_other(other, self_location, other_location, rng) {
            Heading::on_sensing(self.role, other_location)
        } else {
            Heading::Wander
        };

        TurnOutcome::Moved(self.step(self_location, heading, rng))
    }

    fn clash(&mut self, other: &mut Organism, location: Position, rng: &mut ChaCha8Rng) -> TurnOutcome {
        debug_assert_ne!(self.role, other.role, "clash between organisms of the same role");

        if self.escapes(other, rng) {
            return TurnOutcome::Moved(self.displace(location, rng));
        }

        let critical_allowed = self.role == Role::Predator;
        let (predator, prey) = match self.role {
            Role::Predator => (&mut *self, &mut *other),
            Role::Prey => (&mut *other, &mut *self),
        };

        match exchange_blows(predator, prey, critical_allowed, rng) {
            Some(victor) => TurnOutcome::Killed { victor },
            None => TurnOutcome::Moved(location),
        }
    }

    /// Willpower contest at a clash. A predator is forced off only by a
    /// strictly higher prey roll; a prey gets away only with a strictly
    /// higher roll of its own.
    fn escapes(&self, other: &Organism, rng: &mut ChaCha8Rng) -> bool {
        let own = self.stats.willpower + d20(rng);
        let theirs = other.stats.willpower + d20(rng);
        match self.role {
            Role::Predator => own < theirs,
            Role::Prey => own > theirs,
        }
    }

    fn displace(&self, location: Position, rng: &mut ChaCha8Rng) -> Position {
        let statistic = match self.role {
            Role::Predator => self.stats.fortitude,
            Role::Prey => self.stats.speed,
        };
        let reach = scaled(statistic, 0.1).max(0);

        let dx = 1 + rng.gen_range(0..=reach);
        let dy = 1 + rng.gen_range(0..=reach);
        location.add(dx, dy)
    }
}

/// Predator strikes, then the prey strikes back if it is still standing.
/// Returns the survivor's id when a blow is lethal.
fn exchange_blows(
    predator: &mut Organism,
    prey: &mut Organism,
    critical_allowed: bool,
    rng: &mut ChaCha8Rng,
) -> Option<OrganismId> {
    let mut damage = d5(rng) + scaled(predator.stats.power, 0.05);
    if critical_allowed && rng.gen_range(0..20) == 0 {
        damage *= 2;
    }

    prey.stats.fortitude -= damage;
    if prey.stats.fortitude <= 0 {
        prey.kill();
        trace!(predator = %predator.id, prey = %prey.id, damage, "prey killed");
        return Some(predator.id);
    }

    let revenge = d5(rng) + scaled(prey.stats.power, 0.05);
    predator.stats.fortitude -= revenge;
    if predator.stats.fortitude <= 0 {
        predator.kill();
        trace!(predator = %predator.id, prey = %prey.id, damage = revenge, "predator killed");
        return Some(prey.id);
    }

    None
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Organism {} ({})", self.id, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organism(ctx: &mut SimulationContext, role: Role, genes: Genes) -> Organism {
        Organism::with_genes(ctx, role, genes)
    }

    /// Willpower far beyond any d20 swing
    fn brute() -> Genes {
        Genes {
            willpower: 100,
            power: 100,
            ..Genes::uniform(50)
        }
    }

    #[test]
    fn test_seeded_organism() {
        let mut ctx = SimulationContext::seeded(42);
        for _ in 0..50 {
            let org = Organism::seeded(&mut ctx);
            let g = org.genes();
            for value in [g.speed, g.willpower, g.perception, g.stealth, g.fortitude, g.power, g.virility] {
                assert!((0..=100).contains(&value));
            }
            assert_eq!(org.is_viable(), org.stats().is_viable());
            assert_eq!(org.is_alive(), org.is_viable());
        }
        assert_eq!(ctx.seeded_predators() + ctx.seeded_prey(), 50);
        assert_eq!(ctx.organisms_created(), 50);
    }

    #[test]
    fn test_nonviable_is_never_alive() {
        let mut ctx = SimulationContext::seeded(0);
        let genes = Genes {
            stealth: 30,
            ..Genes::uniform(0)
        };
        let org = organism(&mut ctx, Role::Prey, genes);
        assert!(!org.is_viable());
        assert!(!org.is_alive());
    }

    #[test]
    fn test_bred_genes_within_parent_ranges() {
        let mut ctx = SimulationContext::seeded(3);
        let parent = organism(&mut ctx, Role::Prey, Genes::uniform(20));
        let mate = organism(&mut ctx, Role::Predator, Genes::uniform(80));

        for _ in 0..20 {
            let child = Organism::bred(&mut ctx, &parent, &mate);
            assert_eq!(child.role(), Role::Prey);
            for attribute in hunt_core::Attribute::all() {
                let a = parent.stats().get(attribute);
                let b = mate.stats().get(attribute);
                let gene = child.genes().get(attribute);
                assert!(gene >= a.min(b) && gene <= a.max(b));
            }
        }
    }

    #[test]
    fn test_bred_from_identical_parents_copies_derived_values() {
        let mut ctx = SimulationContext::seeded(3);
        let parent = organism(&mut ctx, Role::Predator, Genes::uniform(50));
        let mate = organism(&mut ctx, Role::Predator, Genes::uniform(50));
        let child = Organism::bred(&mut ctx, &parent, &mate);
        assert_eq!(child.genes().willpower, parent.stats().willpower);
        assert_eq!(child.genes().speed, parent.stats().speed);
    }

    #[test]
    fn test_mate_count_and_turns() {
        let mut ctx = SimulationContext::seeded(0);
        let genes = Genes {
            virility: 36,
            ..Genes::uniform(0)
        };
        assert_eq!(organism(&mut ctx, Role::Prey, genes).mate_count(), 3);

        let genes = Genes {
            virility: 11,
            ..Genes::uniform(0)
        };
        let org = organism(&mut ctx, Role::Prey, genes);
        assert_eq!(org.mate_count(), 0);
        assert_eq!(org.turns_per_round(), 1);

        // speed 105 -> 15 + 1
        let fast = organism(&mut ctx, Role::Prey, Genes::uniform(100));
        assert_eq!(fast.turns_per_round(), 16);
    }

    #[test]
    fn test_step_approach() {
        let mut ctx = SimulationContext::seeded(0);
        let org = organism(&mut ctx, Role::Predator, Genes::uniform(10));
        let rng = ctx.rng();

        let from = Position::new(0, 0);
        assert_eq!(org.step(from, Heading::Approach(Position::new(5, -3)), rng), Position::new(1, -1));
        assert_eq!(org.step(from, Heading::Approach(Position::new(0, 4)), rng), Position::new(0, 1));
        assert_eq!(org.step(from, Heading::Approach(from), rng), from);
    }

    #[test]
    fn test_step_retreat() {
        let mut ctx = SimulationContext::seeded(0);
        let org = organism(&mut ctx, Role::Prey, Genes::uniform(10));
        let rng = ctx.rng();

        let from = Position::new(2, 2);
        assert_eq!(org.step(from, Heading::Retreat(Position::new(5, 0)), rng), Position::new(1, 3));

        // Aligned on x: that axis panics, the other still widens the gap
        for _ in 0..20 {
            let next = org.step(from, Heading::Retreat(Position::new(2, 5)), rng);
            assert!((1..=3).contains(&next.x));
            assert_eq!(next.y, 1);
        }
    }

    #[test]
    fn test_step_wander_stays_adjacent() {
        let mut ctx = SimulationContext::seeded(9);
        let org = organism(&mut ctx, Role::Prey, Genes::uniform(10));
        let rng = ctx.rng();
        let from = Position::new(-4, 7);
        for _ in 0..50 {
            let next = org.step(from, Heading::Wander, rng);
            assert!((next.x - from.x).abs() <= 1);
            assert!((next.y - from.y).abs() <= 1);
        }
    }

    #[test]
    fn test_sense_out_of_range() {
        let mut ctx = SimulationContext::seeded(0);
        // perception 110 -> range 55
        let hunter = organism(&mut ctx, Role::Predator, Genes::uniform(100));
        let target = organism(&mut ctx, Role::Prey, Genes::uniform(0));
        let rng = ctx.rng();
        for _ in 0..20 {
            assert!(!hunter.sense_other(&target, Position::new(0, 0), Position::new(56, 0), rng));
            assert!(hunter.sense_other(&target, Position::new(0, 0), Position::new(30, 40), rng));
        }
    }

    #[test]
    fn test_blind_organism_never_senses_at_distance() {
        let mut ctx = SimulationContext::seeded(0);
        let blind = organism(&mut ctx, Role::Predator, Genes::uniform(0));
        let target = organism(&mut ctx, Role::Prey, Genes::uniform(0));
        let rng = ctx.rng();
        assert!(!blind.sense_other(&target, Position::new(0, 0), Position::new(1, 0), rng));
    }

    #[test]
    fn test_reset_fort_is_idempotent() {
        let mut ctx = SimulationContext::seeded(0);
        let mut org = organism(&mut ctx, Role::Prey, Genes::uniform(60));
        let undamaged = org.fortitude();

        org.stats.fortitude -= 40;
        org.reset_fort();
        assert_eq!(org.fortitude(), undamaged);
        org.reset_fort();
        assert_eq!(org.fortitude(), undamaged);
    }

    #[test]
    fn test_overpowering_predator_kills_on_its_turn() {
        let mut ctx = SimulationContext::seeded(5);
        let mut predator = organism(&mut ctx, Role::Predator, brute());
        let mut prey = organism(&mut ctx, Role::Prey, Genes::uniform(0));
        let here = Position::new(1, 1);

        let outcome = predator.take_combat_turn(&mut prey, here, here, ctx.rng());
        assert_eq!(outcome, TurnOutcome::Killed { victor: predator.id() });
        assert!(!prey.is_alive());
        assert!(predator.is_alive());
    }

    #[test]
    fn test_prey_turn_still_takes_the_first_blow() {
        let mut ctx = SimulationContext::seeded(5);
        let mut predator = organism(&mut ctx, Role::Predator, brute());
        let mut prey = organism(&mut ctx, Role::Prey, Genes::uniform(0));
        let here = Position::new(0, 0);

        let outcome = prey.take_combat_turn(&mut predator, here, here, ctx.rng());
        assert_eq!(outcome, TurnOutcome::Killed { victor: predator.id() });
        assert!(!prey.is_alive());
    }

    #[test]
    fn test_clash_resolves_to_exactly_one_survivor() {
        let mut ctx = SimulationContext::seeded(11);
        let mut predator = organism(&mut ctx, Role::Predator, Genes::uniform(40));
        let mut prey = organism(&mut ctx, Role::Prey, Genes::uniform(45));
        let here = Position::new(0, 0);

        let mut victor = None;
        for turn in 0..10_000 {
            let outcome = if turn % 2 == 0 {
                predator.take_combat_turn(&mut prey, here, here, ctx.rng())
            } else {
                prey.take_combat_turn(&mut predator, here, here, ctx.rng())
            };
            if let TurnOutcome::Killed { victor: id } = outcome {
                victor = Some(id);
                break;
            }
        }

        let victor = victor.expect("clash never resolved");
        assert!(predator.is_alive() != prey.is_alive());
        let survivor = if predator.is_alive() { &predator } else { &prey };
        assert_eq!(survivor.id(), victor);
    }

    #[test]
    fn test_escape_moves_diagonally_outward() {
        let mut ctx = SimulationContext::seeded(1);
        // Prey willpower dwarfs the predator's: every prey turn at a clash escapes
        let mut prey = organism(&mut ctx, Role::Prey, brute());
        let mut predator = organism(&mut ctx, Role::Predator, Genes::uniform(0));
        let here = Position::new(0, 0);

        // speed 50 - 7 + 15 = 58 -> reach 5
        for _ in 0..20 {
            match prey.take_combat_turn(&mut predator, here, here, ctx.rng()) {
                TurnOutcome::Moved(to) => {
                    assert!((1..=6).contains(&to.x));
                    assert!((1..=6).contains(&to.y));
                }
                TurnOutcome::Killed { .. } => panic!("escape expected"),
            }
        }
        assert!(predator.is_alive() && prey.is_alive());
    }

    #[test]
    fn test_display() {
        let mut ctx = SimulationContext::seeded(0);
        let org = organism(&mut ctx, Role::Predator, Genes::uniform(1));
        assert_eq!(org.to_string(), "Organism 0 (predator)");
    }
}
