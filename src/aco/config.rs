//! Search configuration and per-topology presets.

use std::time::Duration;

/// Concurrency topology of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One colony, ants built serially.
    Sequential,

    /// Independent colonies, each with its own pheromone table; the best
    /// of all replicas wins at the end.
    Replicated,

    /// One colony whose ant batch is fanned across worker threads reading
    /// a single shared pheromone table.
    Synchronous,

    /// Independent colonies that exchange their best solutions with ring
    /// neighbours at periodic barrier rendezvous.
    Cooperative,
}

/// Configuration for the ant colony search.
///
/// The preset constructors carry per-topology tuning; every field can be
/// overridden afterwards with the `with_*` builders.
///
/// # Examples
///
/// ```
/// use qap_aco::aco::AcoConfig;
/// use std::time::Duration;
///
/// let config = AcoConfig::cooperative(4, 10)
///     .with_time_budget(Duration::from_secs(30))
///     .with_division_count(20)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AcoConfig {
    /// Concurrency topology.
    pub strategy: Strategy,

    /// Ants constructed per colony iteration.
    pub ant_count: usize,

    /// Wall-clock budget per replica.
    pub time_budget: Duration,

    /// Worker threads constructing ants within one colony iteration.
    pub ant_threads: usize,

    /// Independent search replicas.
    pub replicas: usize,

    /// Pheromone-sharing rendezvous between cooperative replicas.
    pub share_count: usize,

    /// Time divisions at which the running best is checkpointed. The
    /// result carries exactly this many snapshots.
    pub division_count: usize,

    /// Exponent on the greedy `1/(partial_fitness + 1)` term during
    /// construction.
    pub fitness_weight: f64,

    /// Exponent on the pheromone term during construction.
    pub pheromone_weight: f64,

    /// Portion of pheromone carried over in a deposit, in (0, 1).
    pub evaporation_rate: f64,

    /// Target probability of regenerating the best solution once the
    /// table has converged; calibrates the MAX-MIN lower bound.
    pub prob_best: f64,

    /// Every n-th iteration deposits the global best instead of the
    /// iteration best.
    pub global_best_deposit_freq: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self::sequential()
    }
}

impl AcoConfig {
    fn base(strategy: Strategy) -> Self {
        Self {
            strategy,
            ant_count: 5,
            time_budget: Duration::from_secs(1),
            ant_threads: 1,
            replicas: 1,
            share_count: 0,
            division_count: 1,
            fitness_weight: 3.0,
            pheromone_weight: 1.0,
            evaporation_rate: 0.5,
            prob_best: 0.1,
            global_best_deposit_freq: 16,
            seed: None,
        }
    }

    /// Single-threaded colony.
    pub fn sequential() -> Self {
        Self::base(Strategy::Sequential)
    }

    /// `replicas` independent colonies, best-of-N at the end.
    pub fn replicated(replicas: usize) -> Self {
        let mut config = Self::base(Strategy::Replicated);
        config.replicas = replicas;
        config.evaporation_rate = 0.6;
        config.prob_best = 0.06;
        config.global_best_deposit_freq = 12;
        config
    }

    /// One colony with `ant_threads` parallel ant builders over a shared
    /// pheromone table.
    pub fn synchronous(ant_threads: usize) -> Self {
        let mut config = Self::base(Strategy::Synchronous);
        config.ant_threads = ant_threads;
        config.evaporation_rate = 0.7;
        config.prob_best = 0.08;
        config.global_best_deposit_freq = 14;
        config
    }

    /// `replicas` colonies sharing bests over a ring at `share_count`
    /// rendezvous spread evenly over the budget.
    pub fn cooperative(replicas: usize, share_count: usize) -> Self {
        let mut config = Self::base(Strategy::Cooperative);
        config.replicas = replicas;
        config.share_count = share_count;
        config.evaporation_rate = 0.3;
        config.prob_best = 0.08;
        config.global_best_deposit_freq = 14;
        config
    }

    pub fn with_ant_count(mut self, n: usize) -> Self {
        self.ant_count = n;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_ant_threads(mut self, n: usize) -> Self {
        self.ant_threads = n;
        self
    }

    pub fn with_replicas(mut self, n: usize) -> Self {
        self.replicas = n;
        self
    }

    pub fn with_share_count(mut self, n: usize) -> Self {
        self.share_count = n;
        self
    }

    pub fn with_division_count(mut self, n: usize) -> Self {
        self.division_count = n;
        self
    }

    pub fn with_fitness_weight(mut self, weight: f64) -> Self {
        self.fitness_weight = weight;
        self
    }

    pub fn with_pheromone_weight(mut self, weight: f64) -> Self {
        self.pheromone_weight = weight;
        self
    }

    pub fn with_evaporation_rate(mut self, rate: f64) -> Self {
        self.evaporation_rate = rate;
        self
    }

    pub fn with_prob_best(mut self, p: f64) -> Self {
        self.prob_best = p;
        self
    }

    pub fn with_global_best_deposit_freq(mut self, freq: usize) -> Self {
        self.global_best_deposit_freq = freq;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.ant_count == 0 {
            return Err("ant_count must be at least 1".into());
        }
        if self.time_budget.is_zero() {
            return Err("time_budget must be nonzero".into());
        }
        if self.ant_threads == 0 {
            return Err("ant_threads must be at least 1".into());
        }
        if self.replicas == 0 {
            return Err("replicas must be at least 1".into());
        }
        if self.division_count == 0 {
            return Err("division_count must be at least 1".into());
        }
        if self.global_best_deposit_freq == 0 {
            return Err("global_best_deposit_freq must be at least 1".into());
        }
        if !(self.evaporation_rate > 0.0 && self.evaporation_rate < 1.0) {
            return Err(format!(
                "evaporation_rate must be in (0, 1), got {}",
                self.evaporation_rate
            ));
        }
        if !(self.prob_best > 0.0 && self.prob_best <= 1.0) {
            return Err(format!(
                "prob_best must be in (0, 1], got {}",
                self.prob_best
            ));
        }
        if !self.fitness_weight.is_finite() || self.fitness_weight < 0.0 {
            return Err(format!(
                "fitness_weight must be finite and non-negative, got {}",
                self.fitness_weight
            ));
        }
        if !self.pheromone_weight.is_finite() || self.pheromone_weight < 0.0 {
            return Err(format!(
                "pheromone_weight must be finite and non-negative, got {}",
                self.pheromone_weight
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let sequential = AcoConfig::sequential();
        assert_eq!(sequential.strategy, Strategy::Sequential);
        assert_eq!(sequential.replicas, 1);
        assert_eq!(sequential.global_best_deposit_freq, 16);
        assert!((sequential.evaporation_rate - 0.5).abs() < 1e-12);

        let replicated = AcoConfig::replicated(4);
        assert_eq!(replicated.strategy, Strategy::Replicated);
        assert_eq!(replicated.replicas, 4);
        assert_eq!(replicated.global_best_deposit_freq, 12);

        let synchronous = AcoConfig::synchronous(4);
        assert_eq!(synchronous.strategy, Strategy::Synchronous);
        assert_eq!(synchronous.ant_threads, 4);
        assert_eq!(synchronous.replicas, 1);
        assert!((synchronous.evaporation_rate - 0.7).abs() < 1e-12);

        let cooperative = AcoConfig::cooperative(4, 10);
        assert_eq!(cooperative.strategy, Strategy::Cooperative);
        assert_eq!(cooperative.replicas, 4);
        assert_eq!(cooperative.share_count, 10);
        assert!((cooperative.evaporation_rate - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_all_presets_share_construction_weights() {
        for config in [
            AcoConfig::sequential(),
            AcoConfig::replicated(4),
            AcoConfig::synchronous(4),
            AcoConfig::cooperative(4, 10),
        ] {
            assert!((config.fitness_weight - 3.0).abs() < 1e-12);
            assert!((config.pheromone_weight - 1.0).abs() < 1e-12);
            assert_eq!(config.ant_count, 5);
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_validate_bad_evaporation() {
        let config = AcoConfig::sequential().with_evaporation_rate(1.0);
        assert!(config.validate().is_err());
        let config = AcoConfig::sequential().with_evaporation_rate(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_counts() {
        assert!(AcoConfig::sequential().with_ant_count(0).validate().is_err());
        assert!(AcoConfig::sequential()
            .with_division_count(0)
            .validate()
            .is_err());
        assert!(AcoConfig::sequential()
            .with_global_best_deposit_freq(0)
            .validate()
            .is_err());
        assert!(AcoConfig::replicated(0).validate().is_err());
    }

    #[test]
    fn test_validate_bad_prob_best() {
        assert!(AcoConfig::sequential().with_prob_best(0.0).validate().is_err());
        assert!(AcoConfig::sequential().with_prob_best(1.5).validate().is_err());
    }
}
