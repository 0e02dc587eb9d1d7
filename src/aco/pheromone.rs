//! MAX-MIN pheromone table.

use crate::models::{Problem, Solution};

/// Desirability of placing each facility at each location, flattened
/// row-major by `(location, facility)`.
///
/// Follows the MAX-MIN Ant System: every value is clamped to a
/// `[min, max]` band recomputed from the best known fitness, so no
/// placement ever reaches probability zero or one — the classic guard
/// against stagnation.
///
/// The table starts uniform and is lazily reset to `max` on the first
/// deposit, once bounds exist; the uniform initial table leaves the very
/// first construction round unbiased.
///
/// Ownership: one table per search replica. Many ant threads may read it
/// concurrently; deposits happen strictly between ant batches under the
/// caller's phase separation.
#[derive(Debug, Clone)]
pub struct PheromoneTable {
    size: usize,
    table: Vec<f64>,
    initialised: bool,
    max: f64,
    min: f64,
    evaporation_rate: f64,
    prob_best: f64,
}

impl PheromoneTable {
    /// Creates a uniform table for `problem`.
    ///
    /// `evaporation_rate` is the portion of pheromone carried over in an
    /// update; `prob_best` is the target probability of regenerating the
    /// best known solution from a converged table.
    pub fn new(problem: &Problem, evaporation_rate: f64, prob_best: f64) -> Self {
        Self {
            size: problem.size(),
            table: vec![1.0; problem.size() * problem.size()],
            initialised: false,
            max: 0.0,
            min: 0.0,
            evaporation_rate,
            prob_best,
        }
    }

    /// Pheromone level for placing `facility` at `location`.
    #[inline]
    pub fn get(&self, location: usize, facility: usize) -> f64 {
        self.table[location * self.size + facility]
    }

    /// Current `(max, min)` bounds.
    pub fn bounds(&self) -> (f64, f64) {
        (self.max, self.min)
    }

    /// Recomputes the MAX-MIN bounds from the best known solution.
    ///
    /// `max` is the asymptote the best solution's cells would reach if it
    /// were deposited forever: `1/(1-ρ) · 1/fitness`. `min` is calibrated
    /// so that a fully converged table still regenerates the best solution
    /// with probability `prob_best`, via `p_dec = prob_best^(1/size)`:
    ///
    /// ```text
    /// min = max · (1 - p_dec) / ((size/2 - 1) · p_dec)
    /// ```
    ///
    /// clamped to `max` when the formula exceeds it (tiny instances).
    pub fn update_bounds(&mut self, best: &Solution<'_>) {
        self.max = 1.0 / (1.0 - self.evaporation_rate) * (1.0 / best.fitness() as f64);

        let p_dec = self.prob_best.powf(1.0 / self.size as f64);
        self.min = self.max * (1.0 - p_dec) / ((self.size as f64 / 2.0 - 1.0) * p_dec);

        if self.min > self.max {
            self.min = self.max;
        }
    }

    /// Evaporates the whole table and deposits `1/fitness` onto the cells
    /// `solution` uses, clamping every cell to `[min, max]`.
    pub fn deposit(&mut self, solution: &Solution<'_>) {
        self.deposit_batch(std::slice::from_ref(solution));
    }

    /// Same update rule as [`deposit`](Self::deposit), but the deposit
    /// term sums the `1/fitness` contributions of all provided solutions
    /// under a single evaporation pass — used when depositing a whole
    /// iteration rather than just its best.
    pub fn deposit_batch(&mut self, solutions: &[Solution<'_>]) {
        // First deposit: the table becomes meaningful only once bounds
        // exist, so fill to max now rather than at construction.
        if !self.initialised {
            self.table.fill(self.max);
            self.initialised = true;
        }

        for location in 0..self.size {
            for facility in 0..self.size {
                let cell = &mut self.table[location * self.size + facility];
                let mut value = self.evaporation_rate * *cell;
                for solution in solutions {
                    if solution.facility(location) == Some(facility) {
                        value += 1.0 / solution.fitness() as f64;
                    }
                }
                *cell = value.clamp(self.min, self.max);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_starts_uniform() {
        let problem = fixtures::nug12();
        let table = PheromoneTable::new(&problem, 0.9, 0.05);
        for location in 0..12 {
            for facility in 0..12 {
                assert_eq!(table.get(location, facility), 1.0);
            }
        }
        assert_eq!(table.bounds(), (0.0, 0.0));
    }

    #[test]
    fn test_update_bounds_nug12() {
        let problem = fixtures::nug12();
        let best = fixtures::solution_from(&problem, &fixtures::NUG12_OPTIMAL);
        assert_eq!(best.fitness(), 578);

        let mut table = PheromoneTable::new(&problem, 0.9, 0.05);
        table.update_bounds(&best);

        let (max, min) = table.bounds();
        assert!((max - 0.01730103806).abs() < 1e-8);
        assert!((min - 0.000981207066).abs() < 1e-9);
    }

    #[test]
    fn test_deposit_nug12() {
        let problem = fixtures::nug12();
        let best = fixtures::solution_from(&problem, &fixtures::NUG12_OPTIMAL);

        let mut table = PheromoneTable::new(&problem, 0.9, 0.05);
        table.update_bounds(&best);

        // First deposit fills to max; the deposited cells then sit exactly
        // on the asymptote, so everything lands on max.
        table.deposit(&best);
        for location in 0..12 {
            for facility in 0..12 {
                assert!((table.get(location, facility) - 0.01730103806).abs() < 1e-8);
            }
        }

        // Second deposit: matching cells stay on the asymptote, the rest
        // evaporate one step.
        table.deposit(&best);
        for location in 0..12 {
            for facility in 0..12 {
                let expected = if best.facility(location) == Some(facility) {
                    0.01730103806
                } else {
                    0.01557093425
                };
                assert!((table.get(location, facility) - expected).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_min_clamps_to_max_on_tiny_instance() {
        // size 3 with a small prob_best puts the computed min above max.
        let problem = fixtures::random_symmetric(3, 7);
        let best = fixtures::random_solution(&problem, 7);

        let mut table = PheromoneTable::new(&problem, 0.9, 0.05);
        table.update_bounds(&best);

        let (max, min) = table.bounds();
        assert_eq!(min, max);
    }

    #[test]
    fn test_deposit_batch_sums_contributions() {
        let problem = Problem::parse("3  0 1 2  1 0 1  2 1 0  0 5 2  5 0 3  2 3 0").unwrap();
        let s24 = fixtures::solution_from(&problem, &[0, 1, 2]);
        let s30 = fixtures::solution_from(&problem, &[0, 2, 1]);
        assert_eq!(s24.fitness(), 24);
        assert_eq!(s30.fitness(), 30);

        let mut table = PheromoneTable::new(&problem, 0.5, 0.99);
        table.update_bounds(&s24);
        let (max, min) = table.bounds();
        assert!((max - 1.0 / 12.0).abs() < TOLERANCE);
        assert!(min < max);

        table.deposit_batch(&[s24.clone(), s30.clone()]);

        // Lazy init leaves v0 = max = 1/12; one evaporation pass at
        // ρ = 0.5, then 1/24 per s24 match and 1/30 per s30 match.
        for location in 0..3 {
            for facility in 0..3 {
                let matches_s24 = s24.facility(location) == Some(facility);
                let matches_s30 = s30.facility(location) == Some(facility);
                let mut expected = 0.5 * max;
                if matches_s24 {
                    expected += 1.0 / 24.0;
                }
                if matches_s30 {
                    expected += 1.0 / 30.0;
                }
                let expected = expected.clamp(min, max);
                assert!(
                    (table.get(location, facility) - expected).abs() < TOLERANCE,
                    "cell ({location}, {facility})"
                );
            }
        }

        // Spot-check the interesting cells: the doubly-matched cell clamps
        // to max, an s30-only cell lands on 0.5/12 + 1/30 unclamped.
        assert!((table.get(0, 0) - max).abs() < TOLERANCE);
        assert!((table.get(1, 2) - 0.075).abs() < TOLERANCE);
        assert!((table.get(1, 0) - 1.0 / 24.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_deposits_stay_within_bounds() {
        let problem = fixtures::random_symmetric(8, 3);
        let best = fixtures::random_solution(&problem, 11);

        let mut table = PheromoneTable::new(&problem, 0.6, 0.05);
        table.update_bounds(&best);
        let (max, min) = table.bounds();

        for seed in 0..20 {
            let solution = fixtures::random_solution(&problem, seed);
            table.deposit(&solution);
            for location in 0..8 {
                for facility in 0..8 {
                    let value = table.get(location, facility);
                    assert!(
                        value >= min - TOLERANCE && value <= max + TOLERANCE,
                        "cell ({location}, {facility}) = {value} outside [{min}, {max}]"
                    );
                }
            }
        }
    }
}
