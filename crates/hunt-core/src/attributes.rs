//! Attribute model: raw genes and the combat stats derived from them.
//!
//! Every modifier is a fraction of a *raw* gene, truncated toward zero before
//! it is added or subtracted. Hunger is the only stat computed from the
//! derived values.

use serde::{Deserialize, Serialize};

/// Largest raw gene value rolled for a generation-zero organism
pub const MAX_SEED_GENE: i32 = 100;

/// The seven heritable genes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Speed,
    Willpower,
    Perception,
    Stealth,
    Fortitude,
    Power,
    Virility,
}

impl Attribute {
    /// All genes, in the order they are rolled
    pub fn all() -> [Attribute; 7] {
        [
            Attribute::Speed,
            Attribute::Willpower,
            Attribute::Perception,
            Attribute::Stealth,
            Attribute::Fortitude,
            Attribute::Power,
            Attribute::Virility,
        ]
    }
}

/// Raw genetic values. Never change after an organism is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genes {
    pub speed: i32,
    pub willpower: i32,
    pub perception: i32,
    pub stealth: i32,
    pub fortitude: i32,
    pub power: i32,
    pub virility: i32,
}

impl Genes {
    /// Build genes by asking `roll` for each attribute in rolling order.
    pub fn from_fn(mut roll: impl FnMut(Attribute) -> i32) -> Self {
        Self {
            speed: roll(Attribute::Speed),
            willpower: roll(Attribute::Willpower),
            perception: roll(Attribute::Perception),
            stealth: roll(Attribute::Stealth),
            fortitude: roll(Attribute::Fortitude),
            power: roll(Attribute::Power),
            virility: roll(Attribute::Virility),
        }
    }

    pub fn uniform(value: i32) -> Self {
        Self::from_fn(|_| value)
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Speed => self.speed,
            Attribute::Willpower => self.willpower,
            Attribute::Perception => self.perception,
            Attribute::Stealth => self.stealth,
            Attribute::Fortitude => self.fortitude,
            Attribute::Power => self.power,
            Attribute::Virility => self.virility,
        }
    }
}

/// Combat-relevant stats derived from [`Genes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub speed: i32,
    pub willpower: i32,
    pub perception: i32,
    pub stealth: i32,
    pub fortitude: i32,
    pub power: i32,
    pub virility: i32,
    pub hunger: i32,
}

impl Stats {
    /// Derived value of a heritable attribute. Hunger is not heritable.
    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Speed => self.speed,
            Attribute::Willpower => self.willpower,
            Attribute::Perception => self.perception,
            Attribute::Stealth => self.stealth,
            Attribute::Fortitude => self.fortitude,
            Attribute::Power => self.power,
            Attribute::Virility => self.virility,
        }
    }

    /// An organism is viable iff none of its seven attribute stats is negative.
    pub fn is_viable(&self) -> bool {
        Attribute::all().iter().all(|&a| self.get(a) >= 0)
    }
}

/// `trunc(value * factor)`, matching the float-then-truncate rounding of the model.
#[inline]
pub fn scaled(value: i32, factor: f64) -> i32 {
    (f64::from(value) * factor) as i32
}

/// Undamaged fortitude for the given genes
pub fn base_fortitude(genes: &Genes) -> i32 {
    genes.fortitude - scaled(genes.stealth, 0.2) + scaled(genes.power, 0.1)
}

/// Derive the full stat block from raw genes.
pub fn derive_stats(genes: &Genes) -> Stats {
    let bulk = (genes.fortitude + genes.power) / 2;

    let speed = genes.speed - scaled(bulk, 0.1) + scaled(genes.willpower, 0.15);
    let willpower = genes.willpower + scaled(genes.power, 0.2);
    let perception = genes.perception + scaled(genes.willpower, 0.1);
    let stealth =
        genes.stealth - scaled(genes.fortitude, 0.2) + scaled(genes.perception, 0.35);
    let fortitude = base_fortitude(genes);
    let power = genes.power + scaled(genes.speed, 0.1) + scaled(genes.power, 0.2);
    let virility = genes.virility + scaled(genes.fortitude, 0.15);

    // Sum of the seven stats over six, as in the model.
    let hunger = (speed + willpower + perception + stealth + fortitude + power + virility) / 6;

    Stats {
        speed,
        willpower,
        perception,
        stealth,
        fortitude,
        power,
        virility,
        hunger,
    }
}
