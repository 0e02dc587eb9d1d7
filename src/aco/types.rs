//! Search result types.

use crate::models::Solution;
use std::fmt;

/// Result of an ant colony search run.
///
/// `checkpoints` holds one best-so-far snapshot per requested time
/// division; the last entry is always the overall best, so the sequence is
/// non-increasing in fitness.
///
/// The `Display` rendering carries only the final assignment (1-based) and
/// its fitness.
#[derive(Debug, Clone)]
pub struct AcoResult<'p> {
    /// The best solution found over the whole run.
    pub best: Solution<'p>,

    /// Fitness of the best solution (same as `best.fitness()`).
    pub best_fitness: i64,

    /// Best-so-far snapshot at each time-division boundary.
    pub checkpoints: Vec<Solution<'p>>,

    /// Total colony iterations executed, summed over replicas.
    pub iterations: usize,
}

impl fmt::Display for AcoResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Problem size: {}", self.best.size())?;
        writeln!(f, "Solution fitness: {}", self.best_fitness)?;

        write!(f, "Solution:")?;
        for location in 0..self.best.size() {
            match self.best.facility(location) {
                Some(facility) => write!(f, " {}", facility + 1)?,
                None => write!(f, " ?")?,
            }
        }
        Ok(())
    }
}
