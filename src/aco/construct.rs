//! Probabilistic ant construction.

use super::config::AcoConfig;
use super::pheromone::PheromoneTable;
use crate::models::{Problem, Solution};
use rand::Rng;

/// Constructs one candidate solution, one location at a time.
///
/// Each step picks a uniformly random unfilled location, weights every
/// remaining facility by
///
/// ```text
/// pheromone(loc, fac)^pheromone_weight · (1 / (partial_fitness + 1))^fitness_weight
/// ```
///
/// with the partial fitness evaluated as if the facility were placed
/// there (the `+1` keeps the first placement, whose partial cost is zero,
/// finite), and samples a facility by roulette wheel over the weightings.
///
/// The generator is passed in explicitly: concurrent ants each own an
/// independent one, which keeps construction deterministic for a fixed
/// per-thread seed.
///
/// Postcondition: the returned assignment is a permutation of
/// `0..problem.size()`.
pub fn construct<'p, R: Rng>(
    problem: &'p Problem,
    pheromones: &PheromoneTable,
    config: &AcoConfig,
    rng: &mut R,
) -> Solution<'p> {
    let size = problem.size();
    let mut remaining_locations: Vec<usize> = (0..size).collect();
    let mut remaining_facilities: Vec<usize> = (0..size).collect();

    let mut solution = Solution::new(problem);
    let mut weightings = vec![0.0; size];

    while !remaining_locations.is_empty() {
        let location_index = rng.random_range(0..remaining_locations.len());
        let location = remaining_locations[location_index];

        for (i, &facility) in remaining_facilities.iter().enumerate() {
            solution.set_facility(location, facility);

            let heuristic = 1.0 / (solution.partial_fitness(location) as f64 + 1.0);
            let pheromone = pheromones.get(location, facility);

            weightings[i] = heuristic.powf(config.fitness_weight)
                * pheromone.powf(config.pheromone_weight);
        }

        let candidates = remaining_facilities.len();
        let weighting_sum: f64 = weightings[..candidates].iter().sum();

        // Roulette wheel: one uniform draw scaled by the sum, walked down
        // by running subtraction. Float underrun falls back to the last
        // candidate.
        let mut roll = rng.random::<f64>() * weighting_sum;
        let mut index = candidates - 1;
        for (i, &weighting) in weightings[..candidates].iter().enumerate() {
            roll -= weighting;
            if roll <= 0.0 {
                index = i;
                break;
            }
        }

        solution.set_facility(location, remaining_facilities[index]);

        remaining_locations.swap_remove(location_index);
        remaining_facilities.remove(index);
    }

    solution
}
