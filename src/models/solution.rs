//! Facility-to-location assignment with memoized fitness.

use super::problem::{FormatError, Problem};
use std::cell::Cell;

/// A (possibly partial) assignment of facilities to locations for one
/// [`Problem`].
///
/// The fitness of a complete assignment is
/// `2 · Σ_{i<j} flow(f_i, f_j) · distance(i, j)` — twice the unordered
/// pair sum, counting each pair from both sides. It is computed lazily and
/// memoized; any mutation invalidates the cache.
///
/// A solution is owned by exactly one ant/thread at a time and cloned —
/// never shared — across threads. The problem itself is shared by
/// reference; `clone` deep-copies only the assignment.
///
/// # Examples
///
/// ```
/// use qap_aco::models::{Problem, Solution};
///
/// let problem = Problem::parse("2  0 3 3 0  0 7 7 0").unwrap();
/// let mut solution = Solution::new(&problem);
/// solution.set_facility(0, 1);
/// solution.set_facility(1, 0);
/// assert_eq!(solution.fitness(), 2 * 7 * 3);
/// ```
#[derive(Debug, Clone)]
pub struct Solution<'p> {
    problem: &'p Problem,
    facilities: Vec<Option<usize>>,
    cached_fitness: Cell<Option<i64>>,
}

impl<'p> Solution<'p> {
    /// Creates a solution with every location unassigned.
    pub fn new(problem: &'p Problem) -> Self {
        Self {
            problem,
            facilities: vec![None; problem.size()],
            cached_fitness: Cell::new(None),
        }
    }

    /// Parses a known solution: the size (unused), the recorded fitness,
    /// then one **1-based** facility index per location.
    ///
    /// Returns the solution together with the recorded fitness so callers
    /// can cross-check it against [`Solution::fitness`].
    pub fn parse_known(source: &str, problem: &'p Problem) -> Result<(Self, i64), FormatError> {
        let values = source
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| FormatError::NonNumeric(token.to_string()))
            })
            .collect::<Result<Vec<i64>, FormatError>>()?;

        if values.is_empty() {
            return Err(FormatError::Empty);
        }
        let expected = 2 + problem.size();
        if values.len() != expected {
            return Err(FormatError::WrongCount {
                actual: values.len(),
                expected,
                size: problem.size(),
            });
        }

        let known_fitness = values[1];
        let mut solution = Self::new(problem);
        for (location, &value) in values[2..].iter().enumerate() {
            solution.set_facility(location, (value - 1) as usize);
        }
        Ok((solution, known_fitness))
    }

    /// Number of locations.
    pub fn size(&self) -> usize {
        self.facilities.len()
    }

    /// The problem this solution assigns.
    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    /// Places `facility` at `location`, invalidating the cached fitness.
    ///
    /// Out-of-range indices are a programmer error, not a runtime
    /// condition: checked in debug builds, unreachable by construction in
    /// the search loops.
    pub fn set_facility(&mut self, location: usize, facility: usize) {
        debug_assert!(
            location < self.facilities.len(),
            "location index {location} out of range for problem of size {}",
            self.facilities.len()
        );
        debug_assert!(
            facility < self.facilities.len(),
            "facility index {facility} out of range for problem of size {}",
            self.facilities.len()
        );
        self.facilities[location] = Some(facility);
        self.cached_fitness.set(None);
    }

    /// The facility at `location`, or `None` while unassigned
    /// mid-construction.
    #[inline]
    pub fn facility(&self, location: usize) -> Option<usize> {
        self.facilities[location]
    }

    /// Swaps the facilities at two locations (the 2-opt move).
    pub fn swap_facilities(&mut self, a: usize, b: usize) {
        self.facilities.swap(a, b);
        self.cached_fitness.set(None);
    }

    /// Whether every location has a facility.
    pub fn is_complete(&self) -> bool {
        self.facilities.iter().all(|f| f.is_some())
    }

    /// Total fitness over all assigned pairs, memoized until the next
    /// mutation. O(size²) on a cache miss.
    pub fn fitness(&self) -> i64 {
        if let Some(fitness) = self.cached_fitness.get() {
            return fitness;
        }

        let size = self.facilities.len();
        let mut fitness = 0;
        for b in 0..size {
            let Some(facility_b) = self.facilities[b] else {
                continue;
            };
            for a in (b + 1)..size {
                let Some(facility_a) = self.facilities[a] else {
                    continue;
                };
                fitness += self.problem.flow(facility_a, facility_b) * self.problem.distance(a, b);
            }
        }
        let fitness = fitness * 2;
        self.cached_fitness.set(Some(fitness));
        fitness
    }

    /// One location's contribution to the total:
    /// `2 · Σ_{j≠location, assigned} flow(f_loc, f_j) · distance(location, j)`.
    ///
    /// O(size); this is the unit of work local search manipulates.
    pub fn partial_fitness(&self, location: usize) -> i64 {
        let facility = self.facilities[location]
            .expect("partial fitness requires a facility at the location");

        let mut partial = 0;
        for (other, &assigned) in self.facilities.iter().enumerate() {
            if other == location {
                continue;
            }
            let Some(other_facility) = assigned else {
                continue;
            };
            partial += self.problem.flow(facility, other_facility)
                * self.problem.distance(location, other);
        }
        partial * 2
    }

    /// Partial fitness of every location, for the local-search inner loop.
    pub fn all_partial_fitnesses(&self) -> Vec<i64> {
        (0..self.facilities.len())
            .map(|location| self.partial_fitness(location))
            .collect()
    }
}
