//! Shared test fixtures: the nug12 benchmark instance and random
//! symmetric instances.

use crate::models::{Problem, Solution};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// The nug12 QAP instance (Nugent, Vollmann & Ruml) in problem-source
/// format: size, 12×12 distances, 12×12 flows. Known optimum: 578.
pub const NUG12: &str = "\
12
0 1 2 3 1 2 3 4 2 3 4 5
1 0 1 2 2 1 2 3 3 2 3 4
2 1 0 1 3 2 1 2 4 3 2 3
3 2 1 0 4 3 2 1 5 4 3 2
1 2 3 4 0 1 2 3 1 2 3 4
2 1 2 3 1 0 1 2 2 1 2 3
3 2 1 2 2 1 0 1 3 2 1 2
4 3 2 1 3 2 1 0 4 3 2 1
2 3 4 5 1 2 3 4 0 1 2 3
3 2 3 4 2 1 2 3 1 0 1 2
4 3 2 3 3 2 1 2 2 1 0 1
5 4 3 2 4 3 2 1 3 2 1 0
0 5 2 4 1 0 0 6 2 1 1 1
5 0 3 0 2 2 2 0 4 5 0 0
2 3 0 0 0 0 0 5 5 2 2 2
4 0 0 0 5 2 2 10 0 0 5 5
1 2 0 5 0 10 0 0 0 5 1 1
0 2 0 2 10 0 5 1 1 5 4 0
0 2 0 2 0 5 0 10 5 2 3 3
6 0 5 10 0 1 10 0 0 0 5 0
2 4 5 0 0 1 5 0 0 0 10 10
1 5 2 0 5 5 2 0 0 0 5 0
1 0 2 5 1 4 3 5 10 5 0 2
1 0 2 5 1 0 3 0 10 0 2 0
";

/// An optimal nug12 assignment (facility at each location), fitness 578.
pub const NUG12_OPTIMAL: [usize; 12] = [11, 6, 8, 2, 3, 7, 10, 0, 4, 5, 9, 1];

pub fn nug12() -> Problem {
    Problem::parse(NUG12).expect("nug12 fixture is well-formed")
}

/// Builds a solution from an explicit facility-per-location assignment.
pub fn solution_from<'p>(problem: &'p Problem, assignment: &[usize]) -> Solution<'p> {
    let mut solution = Solution::new(problem);
    for (location, &facility) in assignment.iter().enumerate() {
        solution.set_facility(location, facility);
    }
    solution
}

/// A random symmetric instance with zero diagonals.
pub fn random_symmetric(size: usize, seed: u64) -> Problem {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut distances = vec![0i64; size * size];
    let mut flows = vec![0i64; size * size];
    for i in 0..size {
        for j in (i + 1)..size {
            let d = rng.random_range(1..10);
            let f = rng.random_range(0..10);
            distances[i * size + j] = d;
            distances[j * size + i] = d;
            flows[i * size + j] = f;
            flows[j * size + i] = f;
        }
    }
    Problem::from_matrices(size, distances, flows).expect("matrix lengths match")
}

/// A uniformly random complete assignment.
pub fn random_solution<'p>(problem: &'p Problem, seed: u64) -> Solution<'p> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut facilities: Vec<usize> = (0..problem.size()).collect();
    facilities.shuffle(&mut rng);
    solution_from(problem, &facilities)
}
