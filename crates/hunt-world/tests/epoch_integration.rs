//! End-to-end epoch runs.

use hunt_core::{EpochReport, SimulationConfig};
use hunt_world::{Epoch, SimulationContext};

fn run(seed: u64, initial_size: usize, target_iterations: usize) -> EpochReport {
    let mut ctx = SimulationContext::seeded(seed);
    let mut epoch = Epoch::new(&mut ctx, initial_size, target_iterations);
    epoch.simulate(&mut ctx).unwrap()
}

/// Per generation: initial, nonviable, post-combat, starved and final
/// counts, each as (predators, prey).
type Counts = [(usize, usize); 5];

fn counts(report: &EpochReport) -> Vec<Counts> {
    report
        .generations
        .iter()
        .map(|g| {
            [
                (g.initial_predator_count, g.initial_prey_count),
                (g.nonviable_predator_count, g.nonviable_prey_count),
                (g.post_combat_predator_count, g.post_combat_prey_count),
                (g.predator_hunger_death_count, g.prey_hunger_death_count),
                (g.final_predator_count, g.final_prey_count),
            ]
        })
        .collect()
}

#[test]
fn test_seeded_epoch_golden_counts() {
    let report = run(73, 20, 3);
    assert!(!report.population_collapse);
    assert_eq!(report.generations.len(), 3);
    assert!(report.generations.iter().all(|g| g.simulation_has_run));

    assert_eq!(
        counts(&report),
        vec![
            [(11, 7), (1, 1), (5, 6), (0, 0), (5, 6)],
            [(6, 9), (0, 0), (4, 5), (0, 0), (4, 5)],
            [(3, 13), (0, 0), (1, 12), (0, 10), (1, 2)],
        ]
    );

    let imbalances: Vec<f64> = report
        .generations
        .iter()
        .map(|g| g.post_combat_population_imbalance)
        .collect();
    for (actual, expected) in imbalances.iter().zip([20.0, 25.0, 1100.0]) {
        assert!((actual - expected).abs() < 1e-9, "imbalance {actual} != {expected}");
    }

    let hunger: Vec<(i32, i32)> = report
        .generations
        .iter()
        .map(|g| {
            (
                g.predator_profile.as_ref().unwrap().hunger,
                g.prey_profile.as_ref().unwrap().hunger,
            )
        })
        .collect();
    assert_eq!(hunger, vec![(69, 63), (83, 63), (95, 77)]);

    let survivors = report.last().unwrap().prey_profile.as_ref().unwrap();
    assert_eq!(survivors.speed, 41);
    assert_eq!(survivors.willpower, 100);
    assert_eq!(survivors.stealth, 75);
}

#[test]
fn test_same_seed_reproduces_population_counts() {
    let first = run(73, 20, 3);
    let second = run(73, 20, 3);
    assert_eq!(first, second);
    assert_eq!(counts(&first), counts(&second));
}

#[test]
fn test_epoch_shape() {
    for seed in 0..10 {
        let report = run(seed, 20, 3);
        assert!(!report.generations.is_empty());
        assert!(report.generations.len() <= 3);

        let first = &report.generations[0];
        assert_eq!(first.initial_total_count() + first.nonviable_count(), 20);

        if report.population_collapse {
            let last = report.last().unwrap();
            assert!(last.initial_predator_count == 0 || last.initial_prey_count == 0);
        } else {
            assert_eq!(report.generations.len(), 3);
        }

        for generation in report.generations.iter().filter(|g| g.simulation_has_run) {
            let paired = generation
                .initial_predator_count
                .min(generation.initial_prey_count);
            assert_eq!(
                generation.post_combat_total_count(),
                generation.initial_total_count() - paired
            );
            assert_eq!(
                generation.final_total_count(),
                generation.post_combat_total_count() - generation.hunger_death_count()
            );
        }
    }
}

#[test]
fn test_generation_ids_are_sequential_per_run() {
    let report = run(7, 20, 3);
    for (i, generation) in report.generations.iter().enumerate() {
        assert_eq!(generation.id.0, i as u64);
    }
    // A second context starts its own sequence
    let again = run(8, 20, 3);
    assert_eq!(again.generations[0].id.0, 0);
    assert_eq!(again.id.0, 0);
}

#[test]
fn test_report_serializes_to_json() {
    let report = run(11, 20, 2);
    let json = serde_json::to_string_pretty(&report).unwrap();
    let back: EpochReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

#[test]
fn test_epoch_from_configuration() {
    let config = SimulationConfig {
        initial_size: 16,
        target_iterations: 2,
        seed: Some(5),
        ..Default::default()
    };
    config.validate().unwrap();

    let mut ctx = SimulationContext::new(config);
    let mut epoch = Epoch::from_config(&mut ctx);
    let report = epoch.simulate(&mut ctx).unwrap();
    assert_eq!(report.initial_size, 16);
    assert!(report.generations.len() <= 2);
    assert!(ctx.organisms_created() >= 16);
    assert_eq!(ctx.seeded_predators() + ctx.seeded_prey(), 16);
}
