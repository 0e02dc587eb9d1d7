//! Search loop execution across the four concurrency topologies.

use super::config::{AcoConfig, Strategy};
use super::construct::construct;
use super::local_search::local_search;
use super::pheromone::PheromoneTable;
use super::sync::DynamicBarrier;
use super::types::AcoResult;
use crate::models::{Problem, Solution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;
use std::time::Instant;

/// Executes the ant colony search.
///
/// Every topology runs the same per-replica loop: build a batch of ants
/// (serially or across a scoped worker pool), refine each with local
/// search, update the MAX-MIN bounds when the global best improves,
/// deposit the iteration best — or, every `global_best_deposit_freq`-th
/// iteration, the global best — and snapshot the running best whenever a
/// time-division boundary is crossed. Replicas stop when their wall-clock
/// budget expires.
///
/// Ants within one batch only read the replica's pheromone table; the
/// deposit runs strictly after the batch joins, so reader and writer
/// phases never overlap and no locking is needed on the table.
///
/// # Usage
///
/// ```
/// use qap_aco::aco::{AcoConfig, AcoRunner};
/// use qap_aco::models::Problem;
/// use std::time::Duration;
///
/// let problem = Problem::parse("2  0 3 3 0  0 7 7 0").unwrap();
/// let config = AcoConfig::sequential()
///     .with_time_budget(Duration::from_millis(20))
///     .with_seed(42);
/// let result = AcoRunner::run(&problem, &config);
/// assert_eq!(result.best_fitness, 42);
/// ```
pub struct AcoRunner;

impl AcoRunner {
    /// Runs the search selected by `config.strategy`.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`AcoConfig::validate`]
    /// first to get a descriptive error).
    pub fn run<'p>(problem: &'p Problem, config: &AcoConfig) -> AcoResult<'p> {
        config.validate().expect("invalid AcoConfig");

        let base_seed = config.seed.unwrap_or_else(rand::random);

        match config.strategy {
            Strategy::Cooperative => {
                let exchange = RingExchange::new(config);
                run_replicas(problem, config, base_seed, Some(&exchange))
            }
            Strategy::Sequential | Strategy::Replicated | Strategy::Synchronous => {
                run_replicas(problem, config, base_seed, None)
            }
        }
    }
}

/// Shared state for cooperative ring sharing: one best-solution slot per
/// replica, read only between the two barrier phases of a rendezvous.
struct RingExchange<'p> {
    barrier: DynamicBarrier,
    slots: Vec<Mutex<Option<Solution<'p>>>>,
}

impl<'p> RingExchange<'p> {
    fn new(config: &AcoConfig) -> Self {
        Self {
            barrier: DynamicBarrier::new(config.replicas),
            slots: (0..config.replicas).map(|_| Mutex::new(None)).collect(),
        }
    }
}

/// What one replica hands back when its budget expires.
struct ReplicaRun<'p> {
    best: Solution<'p>,
    checkpoints: Vec<Solution<'p>>,
    iterations: usize,
}

fn run_replicas<'p>(
    problem: &'p Problem,
    config: &AcoConfig,
    base_seed: u64,
    exchange: Option<&RingExchange<'p>>,
) -> AcoResult<'p> {
    let start = Instant::now();

    let runs: Vec<ReplicaRun<'p>> = if config.replicas == 1 && exchange.is_none() {
        vec![run_replica(problem, config, base_seed, 0, start, None)]
    } else {
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..config.replicas)
                .map(|replica| {
                    scope.spawn(move || {
                        run_replica(problem, config, base_seed, replica, start, exchange)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("replica thread panicked"))
                .collect()
        })
    };

    merge_runs(runs, config.division_count)
}

/// Best-of-N merge: overall best, element-wise best checkpoints, summed
/// iteration counts.
fn merge_runs<'p>(runs: Vec<ReplicaRun<'p>>, division_count: usize) -> AcoResult<'p> {
    let iterations = runs.iter().map(|run| run.iterations).sum();

    let mut checkpoints: Vec<Solution<'p>> = Vec::with_capacity(division_count);
    for division in 0..division_count {
        let snapshot = runs
            .iter()
            .map(|run| &run.checkpoints[division])
            .min_by_key(|solution| solution.fitness())
            .expect("at least one replica")
            .clone();
        checkpoints.push(snapshot);
    }

    let best = runs
        .into_iter()
        .map(|run| run.best)
        .min_by_key(|solution| solution.fitness())
        .expect("at least one replica");

    AcoResult {
        best_fitness: best.fitness(),
        best,
        checkpoints,
        iterations,
    }
}

fn run_replica<'p>(
    problem: &'p Problem,
    config: &AcoConfig,
    base_seed: u64,
    replica: usize,
    start: Instant,
    exchange: Option<&RingExchange<'p>>,
) -> ReplicaRun<'p> {
    let mut pheromones = PheromoneTable::new(problem, config.evaporation_rate, config.prob_best);
    let mut best: Option<Solution<'p>> = None;
    let mut checkpoints: Vec<Solution<'p>> = Vec::with_capacity(config.division_count);

    let division = config.time_budget / config.division_count as u32;
    let share_interval = config.time_budget / (config.share_count as u32 + 1);

    let mut iteration: usize = 0;
    let mut shares_done: usize = 0;

    loop {
        iteration += 1;

        let batch = run_batch(problem, config, &pheromones, base_seed, replica, iteration);
        let iteration_best = batch
            .into_iter()
            .min_by_key(|solution| solution.fitness())
            .expect("batch is never empty");

        let improved = best
            .as_ref()
            .is_none_or(|current| iteration_best.fitness() < current.fitness());
        if improved {
            pheromones.update_bounds(&iteration_best);
            best = Some(iteration_best.clone());
        }

        if iteration % config.global_best_deposit_freq == 0 {
            pheromones.deposit(best.as_ref().expect("set on first iteration"));
        } else {
            pheromones.deposit(&iteration_best);
        }

        // Record the running best at every interior division boundary
        // crossed; the final division is filled in after the loop.
        while checkpoints.len() + 1 < config.division_count
            && start.elapsed() >= division * (checkpoints.len() as u32 + 1)
        {
            checkpoints.push(best.clone().expect("set on first iteration"));
        }

        // Budget expiry wins over a pending rendezvous: a replica that is
        // out of time exits and deregisters rather than sharing again.
        if start.elapsed() >= config.time_budget {
            break;
        }

        if let Some(exchange) = exchange {
            while shares_done < config.share_count
                && start.elapsed() >= share_interval * (shares_done as u32 + 1)
            {
                share_with_ring(exchange, replica, &mut best, &mut pheromones);
                shares_done += 1;
            }
        }
    }

    // Replicas that still owe rendezvous must deregister, or the
    // remaining replicas would wait forever on this one.
    if let Some(exchange) = exchange {
        exchange.barrier.leave();
    }

    let best = best.expect("at least one iteration ran");
    while checkpoints.len() < config.division_count {
        checkpoints.push(best.clone());
    }

    ReplicaRun {
        best,
        checkpoints,
        iterations: iteration,
    }
}

/// One colony iteration: `ant_count` constructions plus local search,
/// fanned across up to `ant_threads` scoped workers. Each worker owns a
/// generator seeded from (replica, worker, iteration), so runs are
/// deterministic for a fixed seed and thread layout.
fn run_batch<'p>(
    problem: &'p Problem,
    config: &AcoConfig,
    pheromones: &PheromoneTable,
    base_seed: u64,
    replica: usize,
    iteration: usize,
) -> Vec<Solution<'p>> {
    let workers = config.ant_threads.min(config.ant_count);

    if workers <= 1 {
        let mut rng = StdRng::seed_from_u64(derive_seed(base_seed, replica, 0, iteration));
        return (0..config.ant_count)
            .map(|_| local_search(&construct(problem, pheromones, config, &mut rng)))
            .collect();
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let share = config.ant_count / workers
                    + usize::from(worker < config.ant_count % workers);
                scope.spawn(move || {
                    let mut rng =
                        StdRng::seed_from_u64(derive_seed(base_seed, replica, worker, iteration));
                    (0..share)
                        .map(|_| local_search(&construct(problem, pheromones, config, &mut rng)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("ant worker panicked"))
            .collect()
    })
}

/// One cooperative rendezvous: publish the replica's best, wait for all
/// participants, adopt the best of self and both ring neighbours, wait
/// again so nobody resumes while a slot is still being read.
fn share_with_ring<'p>(
    exchange: &RingExchange<'p>,
    replica: usize,
    best: &mut Option<Solution<'p>>,
    pheromones: &mut PheromoneTable,
) {
    if let Some(current) = best.as_ref() {
        *exchange.slots[replica].lock().expect("slot lock poisoned") = Some(current.clone());
    }

    exchange.barrier.wait();

    let replicas = exchange.slots.len();
    let mut adopted = false;
    for neighbour in [(replica + replicas - 1) % replicas, (replica + 1) % replicas] {
        let slot = exchange.slots[neighbour].lock().expect("slot lock poisoned");
        if let Some(candidate) = slot.as_ref() {
            if best
                .as_ref()
                .is_none_or(|current| candidate.fitness() < current.fitness())
            {
                *best = Some(candidate.clone());
                adopted = true;
            }
        }
    }
    if adopted {
        pheromones.update_bounds(best.as_ref().expect("adopted a neighbour's best"));
    }

    exchange.barrier.wait();
}

/// Splitmix-style mix of the base seed with the worker's coordinates, so
/// every (replica, worker, iteration) triple owns an independent stream.
fn derive_seed(base: u64, replica: usize, worker: usize, iteration: usize) -> u64 {
    let mut z = base
        ^ (replica as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (worker as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9)
        ^ (iteration as u64).wrapping_mul(0x94D0_49BB_1331_11EB);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::time::Duration;

    fn assert_valid_result(result: &AcoResult<'_>, division_count: usize) {
        assert!(result.best.is_complete());

        let size = result.best.size();
        let mut seen = vec![false; size];
        for location in 0..size {
            let facility = result.best.facility(location).expect("complete");
            assert!(!seen[facility], "facility {facility} placed twice");
            seen[facility] = true;
        }

        assert_eq!(result.best_fitness, result.best.fitness());
        assert_eq!(result.checkpoints.len(), division_count);
        for window in result.checkpoints.windows(2) {
            assert!(
                window[1].fitness() <= window[0].fitness(),
                "checkpoint fitness must be non-increasing"
            );
        }
        let last = result.checkpoints.last().expect("at least one checkpoint");
        assert_eq!(last.fitness(), result.best_fitness);
        assert!(result.iterations > 0);
    }

    #[test]
    fn test_sequential_search() {
        let problem = fixtures::nug12();
        let config = AcoConfig::sequential()
            .with_time_budget(Duration::from_millis(300))
            .with_division_count(5)
            .with_seed(42);

        let result = AcoRunner::run(&problem, &config);

        assert_valid_result(&result, 5);
        // A third of a second of MMAS on nug12 lands well under a random
        // assignment's typical ~900 fitness.
        assert!(
            result.best_fitness < 700,
            "expected a refined solution, got {}",
            result.best_fitness
        );
    }

    #[test]
    fn test_fixed_seed_runs_agree() {
        // Wall-clock termination makes iteration counts vary between runs,
        // but identical seeds explore identical ant streams, and on an
        // instance this small both runs converge long before the budget.
        let problem = fixtures::random_symmetric(6, 3);
        let config = AcoConfig::sequential()
            .with_time_budget(Duration::from_millis(100))
            .with_seed(7);

        let a = AcoRunner::run(&problem, &config);
        let b = AcoRunner::run(&problem, &config);

        assert_eq!(a.best_fitness, b.best_fitness);
    }

    #[test]
    fn test_replicated_search() {
        let problem = fixtures::nug12();
        let config = AcoConfig::replicated(4)
            .with_time_budget(Duration::from_millis(200))
            .with_division_count(4)
            .with_seed(42);

        let result = AcoRunner::run(&problem, &config);
        assert_valid_result(&result, 4);
    }

    #[test]
    fn test_synchronous_search() {
        let problem = fixtures::nug12();
        let config = AcoConfig::synchronous(4)
            .with_ant_count(8)
            .with_time_budget(Duration::from_millis(200))
            .with_division_count(4)
            .with_seed(42);

        let result = AcoRunner::run(&problem, &config);
        assert_valid_result(&result, 4);
    }

    #[test]
    fn test_cooperative_search() {
        let problem = fixtures::nug12();
        let config = AcoConfig::cooperative(4, 3)
            .with_time_budget(Duration::from_millis(300))
            .with_division_count(4)
            .with_seed(42);

        let result = AcoRunner::run(&problem, &config);
        assert_valid_result(&result, 4);
    }

    #[test]
    fn test_cooperative_terminates_with_many_shares() {
        // More rendezvous than some replicas can reach before their budget
        // expires: the departure path must keep the rest from deadlocking.
        let problem = fixtures::nug12();
        let config = AcoConfig::cooperative(3, 25)
            .with_time_budget(Duration::from_millis(150))
            .with_seed(11);

        let result = AcoRunner::run(&problem, &config);
        assert_valid_result(&result, 1);
    }

    #[test]
    fn test_single_checkpoint_is_the_best() {
        let problem = fixtures::random_symmetric(6, 9);
        let config = AcoConfig::sequential()
            .with_time_budget(Duration::from_millis(50))
            .with_seed(3);

        let result = AcoRunner::run(&problem, &config);
        assert_eq!(result.checkpoints.len(), 1);
        assert_eq!(result.checkpoints[0].fitness(), result.best_fitness);
    }

    #[test]
    fn test_derive_seed_streams_are_distinct() {
        let mut seeds = std::collections::HashSet::new();
        for replica in 0..4 {
            for worker in 0..4 {
                for iteration in 1..50 {
                    seeds.insert(derive_seed(42, replica, worker, iteration));
                }
            }
        }
        assert_eq!(seeds.len(), 4 * 4 * 49);
    }
}
